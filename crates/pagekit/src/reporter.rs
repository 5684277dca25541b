//! Step and journey reporting.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StepRecorder (shared by every action of one journey)        │
//! │    passed("...")  ──► info!   ──► Step { Passed }             │
//! │    failed("...")  ──► error!  ──► Step { Failed }             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Reporter (one per suite run)                                 │
//! │    record(TestResultEntry { steps, .. })                      │
//! │      AndonCord  ──► stop on first failed journey              │
//! │      CollectAll ──► keep going                                │
//! │    summary() / to_json() / render_html()                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{error, info};

use crate::result::{PagekitError, PagekitResult};

// ============================================================================
// Steps
// ============================================================================

/// Outcome of one reported step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// Step passed
    Passed,
    /// Step failed
    Failed,
}

/// One human-readable step line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Message shown in the report
    pub message: String,
    /// Step outcome
    pub status: StepStatus,
    /// When the step was recorded
    pub timestamp: SystemTime,
}

/// Shared, ordered sink for step lines.
///
/// Clones share the same buffer, so a page object and the suite runner can
/// hold the same recorder.
#[derive(Debug, Clone, Default)]
pub struct StepRecorder {
    steps: Arc<Mutex<Vec<Step>>>,
}

impl StepRecorder {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a passed step
    pub fn passed(&self, message: impl Into<String>) {
        let message = message.into();
        info!(step = %message, "step passed");
        self.push(message, StepStatus::Passed);
    }

    /// Record a failed step
    pub fn failed(&self, message: impl Into<String>) {
        let message = message.into();
        error!(step = %message, "step failed");
        self.push(message, StepStatus::Failed);
    }

    fn push(&self, message: String, status: StepStatus) {
        self.steps.lock().push(Step {
            message,
            status,
            timestamp: SystemTime::now(),
        });
    }

    /// Snapshot of every step so far
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        self.steps.lock().clone()
    }

    /// Remove and return every step so far
    pub fn take(&self) -> Vec<Step> {
        std::mem::take(&mut *self.steps.lock())
    }

    /// Number of recorded steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.lock().len()
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.lock().is_empty()
    }

    /// Messages of every failed step
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.steps
            .lock()
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .map(|s| s.message.clone())
            .collect()
    }
}

// ============================================================================
// Journey results
// ============================================================================

/// Failure mode for a suite run
///
/// AndonCord: stop the worker on its first failed journey
/// CollectAll: run every journey regardless
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop on first failure
    AndonCord,
    /// Collect all failures
    #[default]
    CollectAll,
}

impl FailureMode {
    /// Failure mode for the config `bail` flag
    #[must_use]
    pub const fn from_bail(bail: bool) -> Self {
        if bail {
            Self::AndonCord
        } else {
            Self::CollectAll
        }
    }
}

/// Journey result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    /// Journey passed
    Passed,
    /// Journey failed
    Failed,
    /// Journey was skipped after an earlier failure stopped the run
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Result of one journey on one capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultEntry {
    /// Journey name
    pub name: String,
    /// Capability the journey ran on
    pub capability: String,
    /// Journey status
    pub status: TestStatus,
    /// Wall-clock duration
    pub duration: Duration,
    /// Error message if failed
    pub error: Option<String>,
    /// Step lines recorded while the journey ran
    pub steps: Vec<Step>,
    /// Timestamp when the journey completed
    pub timestamp: SystemTime,
}

impl TestResultEntry {
    fn new(name: impl Into<String>, capability: impl Into<String>, status: TestStatus) -> Self {
        Self {
            name: name.into(),
            capability: capability.into(),
            status,
            duration: Duration::ZERO,
            error: None,
            steps: Vec::new(),
            timestamp: SystemTime::now(),
        }
    }

    /// Create a passing result
    #[must_use]
    pub fn passed(name: impl Into<String>, capability: impl Into<String>, duration: Duration) -> Self {
        Self {
            duration,
            ..Self::new(name, capability, TestStatus::Passed)
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        capability: impl Into<String>,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self {
            duration,
            error: Some(error.into()),
            ..Self::new(name, capability, TestStatus::Failed)
        }
    }

    /// Create a skipped result
    #[must_use]
    pub fn skipped(name: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::new(name, capability, TestStatus::Skipped)
    }

    /// Attach the recorded steps
    #[must_use]
    pub fn with_steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }
}

/// Suite reporter
///
/// # Example
///
/// ```
/// use pagekit::reporter::{Reporter, TestResultEntry};
/// use std::time::Duration;
///
/// let mut reporter = Reporter::andon();
/// reporter.record(TestResultEntry::passed("search", "desktop", Duration::from_millis(10))).unwrap();
/// assert!(reporter
///     .record(TestResultEntry::failed("links", "desktop", Duration::ZERO, "boom"))
///     .is_err());
/// ```
#[derive(Debug, Default)]
pub struct Reporter {
    results: Vec<TestResultEntry>,
    failure_mode: FailureMode,
    suite_name: String,
}

impl Reporter {
    /// Create new reporter (CollectAll mode)
    #[must_use]
    pub fn new() -> Self {
        Self {
            suite_name: "Bupa Healthcare".to_string(),
            ..Default::default()
        }
    }

    /// Create reporter with Andon Cord mode (fail-fast)
    #[must_use]
    pub fn andon() -> Self {
        Self {
            failure_mode: FailureMode::AndonCord,
            ..Self::new()
        }
    }

    /// Create reporter with the given failure mode
    #[must_use]
    pub fn with_mode(failure_mode: FailureMode) -> Self {
        Self {
            failure_mode,
            ..Self::new()
        }
    }

    /// Set suite name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = name.into();
        self
    }

    /// Failure mode in effect
    #[must_use]
    pub const fn failure_mode(&self) -> FailureMode {
        self.failure_mode
    }

    /// Record a journey result
    ///
    /// # Errors
    ///
    /// In AndonCord mode, returns `AssertionFailed` when the journey failed
    pub fn record(&mut self, result: TestResultEntry) -> PagekitResult<()> {
        let failure = result
            .status
            .is_failed()
            .then(|| (result.name.clone(), result.error.clone().unwrap_or_default()));
        self.results.push(result);

        match failure {
            Some((name, message)) if self.failure_mode == FailureMode::AndonCord => Err(
                PagekitError::assertion(format!("journey '{name}' failed: {message}")),
            ),
            _ => Ok(()),
        }
    }

    /// Number of passed journeys
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    /// Number of failed journeys
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    /// Number of recorded journeys
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Pass rate (0.0 to 1.0); an empty run counts as passing
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 1.0;
        }
        self.passed_count() as f64 / self.results.len() as f64
    }

    /// Check if no journey failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Sum of journey durations
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }

    /// Recorded results
    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    /// Failed results
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results.iter().filter(|r| r.status.is_failed()).collect()
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} passed ({:.1}%)",
            self.suite_name,
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0
        )
    }

    /// Serialise every result as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialisation fails
    pub fn to_json(&self) -> PagekitResult<String> {
        Ok(serde_json::to_string_pretty(&self.results)?)
    }

    /// Write the JSON report
    ///
    /// # Errors
    ///
    /// Returns error if serialisation or file writing fails
    pub fn generate_json(&self, output_path: &Path) -> PagekitResult<()> {
        std::fs::write(output_path, self.to_json()?)?;
        Ok(())
    }

    /// Write the HTML report
    ///
    /// # Errors
    ///
    /// Returns error if file writing fails
    pub fn generate_html(&self, output_path: &Path) -> PagekitResult<()> {
        std::fs::write(output_path, self.render_html())?;
        Ok(())
    }

    /// Render HTML report content
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut html = String::from(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Pagekit Journey Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .journey { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .journey.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .journey.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .journey.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .step.Failed { color: #d32f2f; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
    </style>
</head>
<body>
"#,
        );

        html.push_str(&format!(
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>Results: {}/{} passed ({:.1}%)</h2>
    <p>Duration: {:.2}s</p>
</div>
"#,
            escape_html(&self.suite_name),
            self.passed_count(),
            self.total_count(),
            self.pass_rate() * 100.0,
            self.total_duration().as_secs_f64()
        ));

        for result in &self.results {
            let class = match result.status {
                TestStatus::Passed => "pass",
                TestStatus::Failed => "fail",
                TestStatus::Skipped => "skip",
            };
            html.push_str(&format!(
                "<div class=\"journey {class}\">\n    <strong>{}</strong> [{}] - {:?} ({:.2}s)\n    <ol>\n",
                escape_html(&result.name),
                escape_html(&result.capability),
                result.status,
                result.duration.as_secs_f64()
            ));
            for step in &result.steps {
                html.push_str(&format!(
                    "        <li class=\"step {:?}\">{}</li>\n",
                    step.status,
                    escape_html(&step.message)
                ));
            }
            html.push_str("    </ol>\n");
            if let Some(error) = &result.error {
                html.push_str(&format!(
                    "    <div class=\"error\">{}</div>\n",
                    escape_html(error)
                ));
            }
            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    mod step_recorder_tests {
        use super::*;

        #[test]
        fn test_records_in_order() {
            let recorder = StepRecorder::new();
            recorder.passed("click action on search button is performed");
            recorder.failed("type action on search box failed");
            let steps = recorder.steps();
            assert_eq!(steps.len(), 2);
            assert_eq!(steps[0].status, StepStatus::Passed);
            assert_eq!(steps[1].status, StepStatus::Failed);
        }

        #[test]
        fn test_clones_share_buffer() {
            let recorder = StepRecorder::new();
            let other = recorder.clone();
            other.passed("shared");
            assert_eq!(recorder.len(), 1);
        }

        #[test]
        fn test_take_drains() {
            let recorder = StepRecorder::new();
            recorder.failed("boom");
            assert_eq!(recorder.failures(), vec!["boom".to_string()]);
            assert_eq!(recorder.take().len(), 1);
            assert!(recorder.is_empty());
        }
    }

    mod reporter_tests {
        use super::*;

        #[test]
        fn test_failure_mode_from_bail() {
            assert_eq!(FailureMode::from_bail(true), FailureMode::AndonCord);
            assert_eq!(FailureMode::from_bail(false), FailureMode::CollectAll);
        }

        #[test]
        fn test_andon_cord_pulled() {
            let mut reporter = Reporter::andon();
            let result = reporter.record(TestResultEntry::failed(
                "search",
                "desktop",
                Duration::ZERO,
                "no results",
            ));
            assert!(result.is_err());
            assert_eq!(reporter.total_count(), 1);
        }

        #[test]
        fn test_collect_all_continues() {
            let mut reporter = Reporter::new();
            reporter
                .record(TestResultEntry::failed("a", "mobile", Duration::ZERO, "x"))
                .unwrap();
            reporter
                .record(TestResultEntry::passed("b", "mobile", Duration::from_secs(1)))
                .unwrap();
            assert_eq!(reporter.failed_count(), 1);
            assert!(!reporter.all_passed());
            assert!((reporter.pass_rate() - 0.5).abs() < f64::EPSILON);
        }

        #[test]
        fn test_summary() {
            let mut reporter = Reporter::new().with_name("Suite");
            reporter
                .record(TestResultEntry::passed("a", "desktop", Duration::ZERO))
                .unwrap();
            assert_eq!(reporter.summary(), "Suite: 1/1 passed (100.0%)");
        }

        #[test]
        fn test_json_includes_steps() {
            let mut reporter = Reporter::new();
            let recorder = StepRecorder::new();
            recorder.passed("navigated");
            reporter
                .record(
                    TestResultEntry::passed("a", "desktop", Duration::ZERO)
                        .with_steps(recorder.take()),
                )
                .unwrap();
            let json = reporter.to_json().unwrap();
            assert!(json.contains("navigated"));
            assert!(json.contains("\"Passed\""));
        }

        #[test]
        fn test_render_html_escapes() {
            let mut reporter = Reporter::new();
            reporter
                .record(TestResultEntry::failed(
                    "links <Careers>",
                    "desktop",
                    Duration::ZERO,
                    "a & b",
                ))
                .unwrap();
            let html = reporter.render_html();
            assert!(html.contains("links &lt;Careers&gt;"));
            assert!(html.contains("a &amp; b"));
            assert!(html.contains("journey fail"));
        }

        #[test]
        fn test_generate_files() {
            let dir = tempfile::tempdir().unwrap();
            let reporter = Reporter::new();
            reporter.generate_json(&dir.path().join("r.json")).unwrap();
            reporter.generate_html(&dir.path().join("r.html")).unwrap();
            assert!(dir.path().join("r.html").exists());
        }
    }
}
