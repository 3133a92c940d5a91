mod cli;
mod config;
mod logging;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use convertig_logging::{cv_error, cv_info, level_for_verbosity};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::logging::LogDestination;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::from_env_and_file(cli.config.as_deref())?;

    let level = level_for_verbosity(logging::parse_level(config.log_level.as_deref()), cli.verbose);
    logging::initialize(LogDestination::for_file(config.log_file.clone()), level);
    cv_info!("convertig {} starting", env!("CARGO_PKG_VERSION"));

    match cli::run(cli, config).await {
        Ok(true) => Ok(ExitCode::SUCCESS),
        Ok(false) => Ok(ExitCode::FAILURE),
        Err(err) => {
            cv_error!("{:#}", err);
            Err(err)
        }
    }
}
