use hello_common::FileLogger;
use hello_server::{Listener, ServerConfig, ShutdownHandle};
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// A listener running its accept loop on a background thread, logging into a
/// temporary directory.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: ShutdownHandle,
    logger: FileLogger,
    worker: Option<JoinHandle<anyhow::Result<()>>>,
    _dir: TempDir,
}

impl RunningServer {
    pub fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            port: 0,
            log_file: dir.path().join("server.log"),
            ..ServerConfig::default()
        };
        let logger = FileLogger::new(&config.log_file);
        let listener =
            Listener::bind(config, logger.clone(), ShutdownHandle::new())
                .unwrap();

        let port = listener.local_addr().port();
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let shutdown = listener.shutdown_handle();
        let worker = thread::spawn(move || listener.run());

        Self {
            addr,
            shutdown,
            logger,
            worker: Some(worker),
            _dir: dir,
        }
    }

    /// Closes the listener and waits for the accept loop to return.
    pub fn stop(&mut self) {
        self.shutdown.close();
        if let Some(worker) = self.worker.take() {
            worker.join().unwrap().unwrap();
        }
    }

    pub fn log(&self) -> String {
        fs::read_to_string(self.logger.path()).unwrap_or_default()
    }

    /// Polls the log until `count` lines contain `needle`. Handler threads
    /// are detached, so their last entries can land after the client is done.
    pub fn wait_for_log(&self, needle: &str, count: usize) -> String {
        let started = Instant::now();
        loop {
            let log = self.log();
            let seen = log.lines().filter(|line| line.contains(needle)).count();
            if seen >= count {
                return log;
            }
            assert!(
                started.elapsed() < SETTLE_TIMEOUT,
                "log never showed {count} x {needle:?}:\n{log}"
            );
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown.close();
    }
}

pub fn exchange(addr: SocketAddr, message: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(message).unwrap();

    let mut reply = String::new();
    stream.read_to_string(&mut reply).unwrap();
    reply
}
