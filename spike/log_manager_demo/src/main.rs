use clap::Parser;
use log::*;
use log_manager::{LogManager, LoggerError};

/// Writes one line at each level through a `LogManager`.
#[derive(Parser, Debug)]
struct Conf {
    /// The JSON logger configuration file.
    /// Without it, the logger writes to `<base>/logs/<YYYYMMDD>.log` at the INFO level.
    #[clap(long)]
    config: Option<String>,
}

fn main() -> Result<(), LoggerError> {
    let conf = Conf::parse();

    let logger = LogManager::from_config_file(conf.config.unwrap_or_default())?;
    logger.install()?;

    logger.debug("this is debug");
    logger.info("this is info");
    logger.warning("this is warning");
    logger.error("this is error");
    logger.critical("this is critical");

    info!("Logger [{}] writes to [{}]", logger.name(), logger.log_path().display());

    Ok(())
}
