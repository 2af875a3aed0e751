pub mod aggregator;
pub mod cli;
pub mod core;
pub mod providers;

pub use aggregator::RateAggregator;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Rate {
        currencies: Vec<String>,
        show_sources: bool,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => crate::core::config::AppConfig::load_from_path(path)?,
        None => crate::core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let aggregator = RateAggregator::from_config(&config)?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupted, cancelling pending requests");
                    cancel.cancel();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
            }
        }
    });

    let result = match command {
        AppCommand::Rate {
            currencies,
            show_sources,
        } => cli::rate::run(&aggregator, &currencies, show_sources, &cancel).await,
    };

    interrupt.abort();
    result
}
