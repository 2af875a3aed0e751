//! Subscriber setup for the CLI

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const APP_TARGET: &str = "p2p_rates";

/// Maps the number of `-v` flags to the level applied to this crate.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::OFF,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Directive used when `RUST_LOG` is unset. Only this crate's events pass;
/// dependencies stay silent.
pub fn default_directive(verbosity: u8) -> String {
    format!("{APP_TARGET}={}", level_for(verbosity))
}

/// Installs a compact stderr subscriber. `RUST_LOG` takes precedence over
/// `verbosity` when set.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let ansi = console::Term::stderr().features().colors_supported();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(verbosity > 2)
                .with_ansi(ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
