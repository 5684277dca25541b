//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ColorChoice;

/// Pagekit: locator-driven journeys for the Bupa website
#[derive(Parser, Debug)]
#[command(name = "pagekit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse locator strings and show their parts
    Parse(ParseArgs),

    /// Check every locator of the Bupa page object
    Locators,

    /// Validate a test data file and list the journeys it produces
    Data(DataArgs),

    /// Write a default suite configuration
    Init(InitArgs),

    /// Run the journeys in a real browser
    Run(RunArgs),
}

/// Arguments for the parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Locators of the form "name#strategy=selector"
    #[arg(required = true)]
    pub locators: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the data command
#[derive(Parser, Debug)]
pub struct DataArgs {
    /// Test data JSON file
    #[arg(default_value = "test_data/test_data.json")]
    pub file: PathBuf,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write the configuration
    #[arg(short, long, default_value = "pagekit.yaml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite configuration (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Test data JSON file
    #[arg(short, long, default_value = "test_data/test_data.json")]
    pub data: PathBuf,

    /// Only run journeys whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only run these capabilities (repeatable)
    #[arg(long = "capability")]
    pub capabilities: Vec<String>,

    /// Stop a capability at its first failed journey
    #[arg(long)]
    pub bail: bool,

    /// Override the site under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the report directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Report formats to write
    #[arg(long, value_delimiter = ',', default_value = "json,html")]
    pub format: Vec<ReportFormat>,
}

/// Report output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON results file
    Json,
    /// Self-contained HTML page
    Html,
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatically detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
