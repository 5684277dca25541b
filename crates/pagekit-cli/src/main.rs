//! Pagekit CLI: run Bupa site journeys
//!
//! ## Usage
//!
//! ```bash
//! pagekit parse "run search#css=input[id=searchButton]"
//! pagekit locators                     # Check the page object's locators
//! pagekit data test_data/test_data.json
//! pagekit init                         # Write pagekit.yaml
//! pagekit run --capability desktop     # Needs --features browser
//! ```

use clap::Parser;
use pagekit_cli::{
    handlers, init_tracing, Cli, CliConfig, CliResult, Commands, ConsoleOutput, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let out = ConsoleOutput::new(config.color.should_color(), config.verbosity.is_quiet());

    match run(cli, &config, &out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
}

fn run(cli: Cli, config: &CliConfig, out: &ConsoleOutput) -> CliResult<()> {
    let log_format = cli.log_format;
    let init_default = || init_tracing("warn", config.verbosity, log_format);
    match cli.command {
        Commands::Parse(args) => {
            init_default();
            handlers::parse_command(&args, out)
        }
        Commands::Locators => {
            init_default();
            handlers::locators_command(out)
        }
        Commands::Data(args) => {
            init_default();
            handlers::data_command(&args, out)
        }
        Commands::Init(args) => {
            init_default();
            handlers::init_command(&args, out)
        }
        Commands::Run(args) => {
            let suite = handlers::suite_config(&args)?;
            init_tracing(&suite.log_level, config.verbosity, log_format);
            handlers::run_command(&args, suite, out)
        }
    }
}
