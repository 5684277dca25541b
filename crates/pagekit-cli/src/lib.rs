//! Pagekit CLI Library
//!
//! Command-line front end for the pagekit journey suite: locator and test
//! data checks that need no browser, plus `run`, which drives Chromium when
//! built with the `browser` feature.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, DataArgs, InitArgs, LogFormat, ParseArgs, ReportFormat, RunArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_tracing;
pub use output::ConsoleOutput;
