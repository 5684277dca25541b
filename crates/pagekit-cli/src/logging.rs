//! Tracing subscriber setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::LogFormat;
use crate::config::Verbosity;

/// Filter used when neither `-q`/`-v` nor `RUST_LOG` is given
fn filter(default_level: &str, verbosity: Verbosity) -> EnvFilter {
    match verbosity.log_filter() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `-q`/`-v` win over `RUST_LOG`, which wins over `default_level`. A second
/// call is a no-op.
pub fn init_tracing(default_level: &str, verbosity: Verbosity, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter(default_level, verbosity));
    let _ = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
}
