//! Console output

use console::{style, Style, Term};
use pagekit::{Reporter, TestResultEntry, TestStatus};
use std::time::Duration;

/// Writes command results to the terminal
#[derive(Debug)]
pub struct ConsoleOutput {
    out: Term,
    err: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ConsoleOutput {
    /// Create a new console writer
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            use_color,
            quiet,
        }
    }

    fn prefixed(&self, symbol: &str, plain: &str, paint: fn(&str) -> String) -> String {
        if self.use_color {
            paint(symbol)
        } else {
            plain.to_string()
        }
    }

    /// Print a plain line
    pub fn line(&self, message: &str) {
        if !self.quiet {
            let _ = self.out.write_line(message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefixed("✓", "PASS", |s| style(s).green().bold().to_string());
        let _ = self.out.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = self.prefixed("✗", "FAIL", |s| style(s).red().bold().to_string());
        let _ = self.err.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefixed("⚠", "WARN", |s| style(s).yellow().bold().to_string());
        let _ = self.out.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.out.write_line("");
        let _ = self.out.write_line(&styled);
    }

    /// Print one journey result with its failed steps
    pub fn journey(&self, entry: &TestResultEntry) {
        let label = format!("[{}] {}", entry.capability, entry.name);
        match entry.status {
            TestStatus::Passed => self.success(&label),
            TestStatus::Skipped => self.warning(&format!("{label} (skipped)")),
            TestStatus::Failed => {
                self.failure(&label);
                if let Some(ref error) = entry.error {
                    let _ = self.err.write_line(&format!("    {error}"));
                }
            }
        }
    }

    /// Print every journey result and the suite totals
    pub fn report(&self, reporter: &Reporter) {
        self.header(&format!("{} journeys", reporter.results().len()));
        for entry in reporter.results() {
            self.journey(entry);
        }
        let skipped = reporter
            .results()
            .iter()
            .filter(|r| r.status == TestStatus::Skipped)
            .count();
        self.summary(
            reporter.passed_count(),
            reporter.failed_count(),
            skipped,
            reporter.total_duration(),
        );
    }

    /// Print suite totals
    pub fn summary(&self, passed: usize, failed: usize, skipped: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }
        let total = passed + failed + skipped;
        let secs = duration.as_secs_f64();
        let line = if self.use_color {
            let status = if failed > 0 {
                Style::new().red().bold().apply_to("FAILED")
            } else {
                Style::new().green().bold().apply_to("PASSED")
            };
            format!(
                "{status} {total} journeys in {secs:.2}s ({} passed, {} failed, {} skipped)",
                style(passed).green(),
                style(failed).red(),
                style(skipped).yellow()
            )
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            format!(
                "{status} {total} journeys in {secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)"
            )
        };
        let _ = self.out.write_line("");
        let _ = self.out.write_line(&line);
    }
}
