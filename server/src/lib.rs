pub mod config;
pub mod handler;
pub mod listener;
pub mod shutdown;

pub use config::{Args, ServerConfig};
pub use handler::{ConnectionHandler, HandlerError};
pub use listener::Listener;
pub use shutdown::{ShutdownController, ShutdownHandle};
