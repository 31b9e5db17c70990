mod client;
mod config;

use anyhow::Result;
use clap::Parser;
use client::Client;
use config::{Args, ClientConfig};
use hello_common::FileLogger;
use log::error;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = Args::parse();
    let config = ClientConfig::from_args(&args)?;
    let logger = FileLogger::new(&config.log_file);
    let client = Client::new(config, logger);

    match client.run() {
        Ok(reply) => {
            println!("Server reply: {reply}");
            Ok(())
        }
        Err(e) => {
            error!("Client error: {e:#}");
            Err(e)
        }
    }
}
