use anyhow::{Context, Result};
use clap::Parser;
use hello_common::DEFAULT_PORT;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "One-shot greeting client")]
pub struct Args {
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub server_addr: String,

    #[arg(short, long, default_value = "client.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_addr: SocketAddr,
    pub log_file: PathBuf,
}

impl ClientConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let server_addr: SocketAddr =
            args.server_addr.parse().with_context(|| {
                format!("Invalid address: {}", args.server_addr)
            })?;

        Ok(Self {
            server_addr,
            log_file: args.log_file.clone(),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: (Ipv4Addr::LOCALHOST, DEFAULT_PORT).into(),
            log_file: PathBuf::from("client.log"),
        }
    }
}
