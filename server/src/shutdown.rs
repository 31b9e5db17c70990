use anyhow::{Context, Result};
use hello_common::FileLogger;
use log::warn;
use parking_lot::Mutex;
use socket2::SockRef;
use std::net::{Shutdown, TcpListener};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Shared {
    requested: AtomicBool,
    listener: Mutex<Option<Arc<TcpListener>>>,
}

/// Shared handle to the listening socket that can close it from any thread.
///
/// Closing marks shutdown as requested before shutting the socket down, so a
/// listener loop woken out of `accept` can tell an expected failure from a
/// real one.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    shared: Arc<Shared>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the listening socket. A socket attached after `close` is
    /// shut down straight away.
    pub fn attach(&self, listener: Arc<TcpListener>) {
        let mut slot = self.shared.listener.lock();
        if self.is_requested() {
            Self::shutdown_socket(&listener);
            return;
        }
        *slot = Some(listener);
    }

    pub fn is_requested(&self) -> bool {
        self.shared.requested.load(Ordering::SeqCst)
    }

    /// Requests shutdown and wakes any pending `accept`. Returns whether a
    /// socket was attached at the time.
    pub fn close(&self) -> bool {
        let mut slot = self.shared.listener.lock();
        self.shared.requested.store(true, Ordering::SeqCst);

        match slot.take() {
            Some(listener) => {
                Self::shutdown_socket(&listener);
                true
            }
            None => false,
        }
    }

    fn shutdown_socket(listener: &TcpListener) {
        if let Err(e) = SockRef::from(listener).shutdown(Shutdown::Both) {
            warn!("Failed to shut down listening socket: {e}");
        }
    }
}

/// Reacts to SIGINT/SIGTERM by closing the listening socket and exiting.
///
/// In-flight connections are neither drained nor interrupted.
pub struct ShutdownController {
    handle: ShutdownHandle,
    logger: FileLogger,
}

impl ShutdownController {
    pub fn new(logger: FileLogger) -> Self {
        Self {
            handle: ShutdownHandle::new(),
            logger,
        }
    }

    pub fn handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Installs the process-wide signal handler. Can succeed only once per
    /// process.
    pub fn install(self) -> Result<()> {
        ctrlc::set_handler(move || {
            self.shutdown();
            process::exit(0);
        })
        .context("Failed to install signal handler")
    }

    /// Everything the signal handler does except terminating the process.
    pub fn shutdown(&self) {
        println!("Shutdown signal received");
        self.logger.info("Shutdown signal received, closing server.");
        self.handle.close();
    }
}
