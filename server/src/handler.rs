use hello_common::{decode_message, FileLogger};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to read client message: {0}")]
    Read(#[source] io::Error),
    #[error("failed to send message to client: {0}")]
    Write(#[source] io::Error),
}

/// Owns one accepted connection for its whole life: one read, one reply,
/// then the stream is dropped.
pub struct ConnectionHandler {
    stream: TcpStream,
    peer: SocketAddr,
    logger: FileLogger,
    buffer_size: usize,
    response: &'static str,
}

impl ConnectionHandler {
    pub const fn new(
        stream: TcpStream,
        peer: SocketAddr,
        logger: FileLogger,
        buffer_size: usize,
        response: &'static str,
    ) -> Self {
        Self {
            stream,
            peer,
            logger,
            buffer_size,
            response,
        }
    }

    /// Runs the exchange and closes the connection on every path.
    pub fn handle(self) {
        let Self {
            mut stream,
            peer,
            logger,
            buffer_size,
            response,
        } = self;

        if let Err(e) = Self::exchange(
            &mut stream,
            peer,
            &logger,
            buffer_size,
            response,
        ) {
            logger.error(format!("{peer}: {e}"));
        }

        drop(stream);
        logger.info(format!("{peer}: closed the connection"));
    }

    fn exchange(
        stream: &mut TcpStream,
        peer: SocketAddr,
        logger: &FileLogger,
        buffer_size: usize,
        response: &str,
    ) -> Result<(), HandlerError> {
        let mut buf = vec![0_u8; buffer_size];

        let len = stream.read(&mut buf).map_err(HandlerError::Read)?;
        logger.info(format!(
            "{peer}: read message from client: {}",
            decode_message(&buf, len)
        ));

        stream
            .write_all(response.as_bytes())
            .map_err(HandlerError::Write)?;
        logger.info(format!("{peer}: sent message to client"));

        Ok(())
    }
}
