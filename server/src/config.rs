use anyhow::{ensure, Result};
use clap::Parser;
use hello_common::{BUFFER_SIZE, DEFAULT_PORT, SERVER_GREETING};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Greeting server")]
pub struct Args {
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(short, long, default_value = "server.log")]
    pub log_file: PathBuf,

    #[arg(short, long, default_value_t = BUFFER_SIZE)]
    pub buffer_size: usize,

    #[arg(long, default_value_t = ServerConfig::DEFAULT_BACKLOG)]
    pub backlog: i32,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub log_file: PathBuf,
    pub buffer_size: usize,
    pub backlog: i32,
    pub response: &'static str,
}

impl ServerConfig {
    pub const DEFAULT_BACKLOG: i32 = 128;

    pub fn from_args(args: &Args) -> Result<Self> {
        ensure!(args.buffer_size > 0, "Buffer size must be positive");
        ensure!(args.backlog > 0, "Backlog must be positive");

        Ok(Self {
            port: args.port,
            log_file: args.log_file.clone(),
            buffer_size: args.buffer_size,
            backlog: args.backlog,
            response: SERVER_GREETING,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_file: PathBuf::from("server.log"),
            buffer_size: BUFFER_SIZE,
            backlog: Self::DEFAULT_BACKLOG,
            response: SERVER_GREETING,
        }
    }
}
