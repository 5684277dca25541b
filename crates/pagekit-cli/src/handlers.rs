//! Command handlers

use pagekit::pages::bupa::{locators, static_locators};
use pagekit::suite::ABOUT_US;
use pagekit::{
    locator, DriverFactory, Journey, ParsedLocator, PagekitResult, Reporter, SuiteConfig,
    SuiteRunner, TestData,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::commands::{DataArgs, InitArgs, ParseArgs, ReportFormat, RunArgs};
use crate::error::{CliError, CliResult};
use crate::output::ConsoleOutput;

/// Whether this binary can drive a real browser
pub const BROWSER_ENABLED: bool = cfg!(feature = "browser");

/// Parse and strategy-check one locator
fn check(raw: &str) -> PagekitResult<ParsedLocator> {
    let parsed = locator::parse(raw)?;
    let _ = parsed.strategy()?;
    Ok(parsed)
}

/// Print the parts of each locator; fails if any is invalid
pub fn parse_command(args: &ParseArgs, out: &ConsoleOutput) -> CliResult<()> {
    let results: Vec<(&String, PagekitResult<ParsedLocator>)> =
        args.locators.iter().map(|raw| (raw, check(raw))).collect();
    let invalid = results.iter().filter(|(_, r)| r.is_err()).count();

    if args.json {
        let rows: Vec<serde_json::Value> = results
            .iter()
            .map(|(raw, result)| match result {
                Ok(p) => json!({
                    "locator": raw,
                    "name": p.name,
                    "strategy": p.strategy,
                    "selector": p.selector,
                }),
                Err(err) => json!({ "locator": raw, "error": err.to_string() }),
            })
            .collect();
        out.line(&serde_json::to_string_pretty(&rows)?);
    } else {
        for (raw, result) in &results {
            match result {
                Ok(p) => out.success(&format!("{} | {} | {}", p.name, p.strategy, p.selector)),
                Err(err) => out.failure(&format!("{raw}: {err}")),
            }
        }
    }

    if invalid > 0 {
        return Err(CliError::validation(format!(
            "{invalid} of {} locators are invalid",
            results.len()
        )));
    }
    Ok(())
}

/// Check the Bupa page object's fixed and generated locators
pub fn locators_command(out: &ConsoleOutput) -> CliResult<()> {
    let mut table: Vec<(String, String)> = static_locators()
        .into_iter()
        .map(|(field, raw)| (field.to_string(), raw.to_string()))
        .collect();
    table.push(("primary_link".into(), locators::primary_link(ABOUT_US, false)));
    table.push(("primary_link (mobile)".into(), locators::primary_link(ABOUT_US, true)));
    table.push(("location_link".into(), locators::location_link("Spain")));

    out.header("Bupa locators");
    let mut invalid = 0;
    for (field, raw) in &table {
        match check(raw) {
            Ok(p) => out.success(&format!("{field}: {} [{}]", p.name, p.strategy)),
            Err(err) => {
                invalid += 1;
                out.failure(&format!("{field}: {err}"));
            }
        }
    }
    if invalid > 0 {
        return Err(CliError::validation(format!("{invalid} locators are invalid")));
    }
    Ok(())
}

/// Validate a test data file and list the journeys it yields
pub fn data_command(args: &DataArgs, out: &ConsoleOutput) -> CliResult<()> {
    let data = TestData::load(&args.file)?;
    let journeys = Journey::from_data(&data);
    out.header(&format!("{} journeys from {}", journeys.len(), args.file.display()));
    for journey in &journeys {
        out.line(&journey.name());
    }
    Ok(())
}

/// Write the default suite configuration
pub fn init_command(args: &InitArgs, out: &ConsoleOutput) -> CliResult<()> {
    if args.output.exists() && !args.force {
        return Err(CliError::config(format!(
            "{} already exists; use --force to overwrite",
            args.output.display()
        )));
    }
    SuiteConfig::default().save(&args.output)?;
    out.success(&format!("wrote {}", args.output.display()));
    Ok(())
}

/// Load the suite configuration and apply command-line overrides
pub fn suite_config(args: &RunArgs) -> CliResult<SuiteConfig> {
    let mut config = match args.config {
        Some(ref path) => SuiteConfig::load(path)?,
        None => SuiteConfig::default(),
    };
    if args.bail {
        config.bail = true;
    }
    if let Some(ref url) = args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(ref dir) = args.report_dir {
        config.report_dir.clone_from(dir);
    }
    if !args.capabilities.is_empty() {
        let unknown: Vec<&str> = args
            .capabilities
            .iter()
            .filter(|name| !config.capabilities.iter().any(|c| &c.name == *name))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(CliError::config(format!(
                "unknown capability: {}",
                unknown.join(", ")
            )));
        }
        config
            .capabilities
            .retain(|c| args.capabilities.contains(&c.name));
    }
    config.validate()?;
    Ok(config)
}

/// Run the selected journeys on `factory`'s sessions
pub fn execute_with<F: DriverFactory + 'static>(
    runner: &SuiteRunner,
    factory: Arc<F>,
) -> CliResult<Reporter> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(runner.run(factory)))
}

#[cfg(feature = "browser")]
fn execute(runner: &SuiteRunner) -> CliResult<Reporter> {
    execute_with(runner, Arc::new(pagekit::ChromiumFactory))
}

#[cfg(not(feature = "browser"))]
fn execute(_runner: &SuiteRunner) -> CliResult<Reporter> {
    Err(CliError::BrowserUnavailable)
}

/// Write the requested report files into `dir`
pub fn write_reports(
    reporter: &Reporter,
    dir: &Path,
    formats: &[ReportFormat],
    out: &ConsoleOutput,
) -> CliResult<()> {
    fs::create_dir_all(dir)?;
    for format in formats {
        let path = match format {
            ReportFormat::Json => {
                let path = dir.join("results.json");
                reporter.generate_json(&path)?;
                path
            }
            ReportFormat::Html => {
                let path = dir.join("report.html");
                reporter.generate_html(&path)?;
                path
            }
        };
        info!(path = %path.display(), "report written");
        out.line(&format!("report: {}", path.display()));
    }
    Ok(())
}

/// Run the journeys in Chromium and write the reports
pub fn run_command(args: &RunArgs, config: SuiteConfig, out: &ConsoleOutput) -> CliResult<()> {
    if !BROWSER_ENABLED {
        return Err(CliError::BrowserUnavailable);
    }
    let data = TestData::load(&args.data)?;
    let mut runner = SuiteRunner::new(config, Journey::from_data(&data));
    if let Some(ref filter) = args.filter {
        runner = runner.with_filter(filter);
    }
    if runner.selected().is_empty() {
        return Err(CliError::config("no journey matches the filter"));
    }

    let reporter = execute(&runner)?;
    out.report(&reporter);
    write_reports(&reporter, &runner.config().report_dir, &args.format, out)?;

    if reporter.all_passed() {
        Ok(())
    } else {
        Err(CliError::JourneysFailed {
            message: reporter.summary(),
        })
    }
}
