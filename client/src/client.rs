use anyhow::{Context, Result};
use hello_common::{decode_message, ClientGreeting, FileLogger, BUFFER_SIZE};
use std::io::{Read, Write};
use std::net::TcpStream;

use crate::config::ClientConfig;

pub struct Client {
    config: ClientConfig,
    logger: FileLogger,
}

impl Client {
    pub const fn new(config: ClientConfig, logger: FileLogger) -> Self {
        Self { config, logger }
    }

    /// Connects, sends one greeting and returns the single reply read back.
    /// Each failure is logged before it is returned; there is no retry.
    pub fn run(&self) -> Result<String> {
        self.logger.info("Starting client.");

        let mut stream = TcpStream::connect(self.config.server_addr)
            .map_err(|e| self.failure("Connection to server failed", e))?;
        self.logger.info(format!(
            "Connected to server {} successfully.",
            self.config.server_addr
        ));

        let greeting = ClientGreeting::now();
        stream.write_all(&greeting.to_bytes()).map_err(|e| {
            self.failure("Failed to send message to server", e)
        })?;
        self.logger.info("Message sent to server successfully.");

        let mut buf = [0_u8; BUFFER_SIZE];
        let len = stream.read(&mut buf).map_err(|e| {
            self.failure("Failed to receive reply from server", e)
        })?;
        let reply = decode_message(&buf, len).into_owned();
        self.logger.info("Received reply from server.");

        drop(stream);
        self.logger.info("Connection closed. Client exiting.");

        Ok(reply)
    }

    fn failure(&self, what: &str, err: std::io::Error) -> anyhow::Error {
        self.logger.error(format!("{what}: {err}"));
        anyhow::Error::new(err).context(what.to_string())
    }
}
