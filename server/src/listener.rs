use anyhow::{Context, Result};
use hello_common::FileLogger;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crate::config::ServerConfig;
use crate::handler::ConnectionHandler;
use crate::shutdown::ShutdownHandle;

pub struct Listener {
    socket: Arc<TcpListener>,
    local_addr: SocketAddr,
    config: ServerConfig,
    logger: FileLogger,
    shutdown: ShutdownHandle,
}

impl Listener {
    /// Creates the listening socket on all IPv4 interfaces and registers it
    /// with `shutdown`. Every failure is logged before it is returned.
    pub fn bind(
        config: ServerConfig,
        logger: FileLogger,
        shutdown: ShutdownHandle,
    ) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));

        let socket =
            Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
                .map_err(|e| {
                    setup_failure(&logger, "Socket creation failed", e)
                })?;
        socket
            .set_reuse_address(true)
            .map_err(|e| setup_failure(&logger, "Socket setup failed", e))?;
        socket
            .bind(&addr.into())
            .map_err(|e| setup_failure(&logger, "Bind failed", e))?;
        socket
            .listen(config.backlog)
            .map_err(|e| setup_failure(&logger, "Listen failed", e))?;

        let socket = Arc::new(TcpListener::from(socket));
        let local_addr = socket
            .local_addr()
            .map_err(|e| setup_failure(&logger, "Socket setup failed", e))?;

        shutdown.attach(socket.clone());
        logger.info(format!("Listening on {local_addr}"));

        Ok(Self {
            socket,
            local_addr,
            config,
            logger,
            shutdown,
        })
    }

    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Accepts until the socket fails. Returns `Ok` only when the failure was
    /// caused by a requested shutdown.
    pub fn run(&self) -> Result<()> {
        loop {
            match self.socket.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(_) if self.shutdown.is_requested() => {
                    self.logger.info("Listener closed, no longer accepting");
                    return Ok(());
                }
                Err(e) => {
                    self.logger
                        .error(format!("Failed to accept connection: {e}"));
                    return Err(e).context("Failed to accept connection");
                }
            }
        }
    }

    /// Hands the stream to a detached handler thread. If the thread cannot
    /// be started the stream is dropped with the closure, closing it.
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        self.logger.info(format!("Accepted connection from {peer}"));

        let handler = ConnectionHandler::new(
            stream,
            peer,
            self.logger.clone(),
            self.config.buffer_size,
            self.config.response,
        );

        let spawned = thread::Builder::new()
            .name(format!("conn-{peer}"))
            .spawn(move || handler.handle());

        if let Err(e) = spawned {
            self.logger
                .error(format!("{peer}: could not start handler thread: {e}"));
        }
    }
}

fn setup_failure(
    logger: &FileLogger,
    what: &str,
    err: io::Error,
) -> anyhow::Error {
    logger.error(format!("{what}: {err}"));
    anyhow::Error::new(err).context(what.to_string())
}
