use anyhow::Result;
use clap::Parser;
use hello_common::FileLogger;
use hello_server::{Args, Listener, ServerConfig, ShutdownController};
use log::error;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = Args::parse();
    let config = ServerConfig::from_args(&args)?;
    let logger = FileLogger::new(&config.log_file);

    logger.info("Server starting.");

    let controller = ShutdownController::new(logger.clone());
    let shutdown = controller.handle();
    controller.install()?;

    let listener = Listener::bind(config, logger, shutdown)?;

    if let Err(e) = listener.run() {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
