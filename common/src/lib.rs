mod logger;
mod protocol;

pub use logger::{FileLogger, LogEntry, Severity};
pub use protocol::{
    decode_message, ClientGreeting, BUFFER_SIZE, DEFAULT_PORT,
    SERVER_GREETING,
};
