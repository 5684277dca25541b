//! Wait mechanisms
//!
//! Bounded polling used by the driver's `wait_for_*` defaults, plus the
//! timeout and settle-delay table every action reads from.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::result::{PagekitError, PagekitResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element waits (30 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 30_000;

/// Extended wait for hover and dropdown targets
pub const HOVER_TIMEOUT_MS: u64 = 50_000;

/// Extended wait for visibility assertions
pub const DISPLAYED_TIMEOUT_MS: u64 = 60_000;

/// Short wait used by the non-failing probe
pub const PROBE_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Upper bound for any configured wait or pause (one hour)
pub const MAX_WAIT_MS: u64 = 3_600_000;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Timeouts and settle delays applied by the action catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Element existence wait
    pub element_ms: u64,
    /// Existence wait before hover and dropdown selection
    pub hover_ms: u64,
    /// Existence wait before a visibility check
    pub displayed_ms: u64,
    /// Existence wait inside the probe
    pub probe_ms: u64,
    /// Pause after a click
    pub click_settle_ms: u64,
    /// Pause after hover and dropdown selection
    pub hover_settle_ms: u64,
    /// Pause around each item of `get_all_text`
    pub list_settle_ms: u64,
    /// Pause after switching windows
    pub window_settle_ms: u64,
    /// Pause after a swipe
    pub swipe_settle_ms: u64,
    /// Polling interval for every wait
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_ms: DEFAULT_ELEMENT_TIMEOUT_MS,
            hover_ms: HOVER_TIMEOUT_MS,
            displayed_ms: DISPLAYED_TIMEOUT_MS,
            probe_ms: PROBE_TIMEOUT_MS,
            click_settle_ms: 200,
            hover_settle_ms: 100,
            list_settle_ms: 200,
            window_settle_ms: 500,
            swipe_settle_ms: 1_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timeouts {
    /// Same waits, no settle pauses
    #[must_use]
    pub fn without_settle() -> Self {
        Self {
            click_settle_ms: 0,
            hover_settle_ms: 0,
            list_settle_ms: 0,
            window_settle_ms: 0,
            swipe_settle_ms: 0,
            ..Self::default()
        }
    }

    /// Element wait as a Duration
    #[must_use]
    pub const fn element(&self) -> Duration {
        Duration::from_millis(self.element_ms)
    }

    /// Hover wait as a Duration
    #[must_use]
    pub const fn hover(&self) -> Duration {
        Duration::from_millis(self.hover_ms)
    }

    /// Visibility wait as a Duration
    #[must_use]
    pub const fn displayed(&self) -> Duration {
        Duration::from_millis(self.displayed_ms)
    }

    /// Probe wait as a Duration
    #[must_use]
    pub const fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }

    /// Poll interval as a Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject a zero poll interval and any value above [`MAX_WAIT_MS`].
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the offending field.
    pub fn validate(&self) -> PagekitResult<()> {
        let fields = [
            ("element_ms", self.element_ms),
            ("hover_ms", self.hover_ms),
            ("displayed_ms", self.displayed_ms),
            ("probe_ms", self.probe_ms),
            ("click_settle_ms", self.click_settle_ms),
            ("hover_settle_ms", self.hover_settle_ms),
            ("list_settle_ms", self.list_settle_ms),
            ("window_settle_ms", self.window_settle_ms),
            ("swipe_settle_ms", self.swipe_settle_ms),
            ("poll_interval_ms", self.poll_interval_ms),
        ];
        if let Some((field, ms)) = fields.iter().find(|(_, ms)| *ms > MAX_WAIT_MS) {
            return Err(PagekitError::Config {
                message: format!("timeouts.{field} = {ms} exceeds {MAX_WAIT_MS} ms"),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(PagekitError::Config {
                message: "timeouts.poll_interval_ms must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll `check` until it reports `true` or `timeout` elapses.
///
/// Errors from `check` abort the wait immediately. The check always runs at
/// least once, so a zero timeout still sees an already-satisfied condition.
///
/// # Errors
///
/// Returns `Timeout` naming `what` when the condition never holds.
pub async fn poll_until<F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> PagekitResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PagekitResult<bool>>,
{
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if check().await? {
            return Ok(());
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(PagekitError::Timeout {
                what: what.to_string(),
                ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(interval).await;
    }
}

/// Sleep for `ms` milliseconds; zero returns immediately.
pub async fn settle(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    mod timeouts_tests {
        use super::*;

        #[test]
        fn test_defaults_match_catalogue() {
            let t = Timeouts::default();
            assert_eq!(t.element(), Duration::from_secs(30));
            assert_eq!(t.hover(), Duration::from_secs(50));
            assert_eq!(t.displayed(), Duration::from_secs(60));
            assert_eq!(t.probe(), Duration::from_secs(5));
            assert_eq!(t.click_settle_ms, 200);
        }

        #[test]
        fn test_without_settle_keeps_waits() {
            let t = Timeouts::without_settle();
            assert_eq!(t.element_ms, DEFAULT_ELEMENT_TIMEOUT_MS);
            assert_eq!(t.click_settle_ms, 0);
            assert_eq!(t.swipe_settle_ms, 0);
        }

        #[test]
        fn test_validate_bounds() {
            assert!(Timeouts::default().validate().is_ok());
            assert!(Timeouts::without_settle().validate().is_ok());

            let huge = Timeouts {
                element_ms: u64::MAX,
                ..Timeouts::default()
            };
            let err = huge.validate().unwrap_err();
            assert!(err.to_string().contains("timeouts.element_ms"));

            let busy = Timeouts {
                poll_interval_ms: 0,
                ..Timeouts::default()
            };
            let err = busy.validate().unwrap_err();
            assert!(err.to_string().contains("poll_interval_ms"));
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_poll_succeeds_after_retries() {
            let calls = AtomicU32::new(0);
            poll_until("ready", Duration::from_secs(1), Duration::from_millis(50), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n >= 3) }
            })
            .await
            .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 4);
        }

        #[tokio::test(start_paused = true)]
        async fn test_poll_times_out() {
            let err = poll_until(
                "exist",
                Duration::from_millis(200),
                Duration::from_millis(50),
                || async { Ok(false) },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, PagekitError::Timeout { ms: 200, .. }));
        }

        #[tokio::test]
        async fn test_poll_propagates_check_error() {
            let err = poll_until("exist", Duration::from_secs(1), Duration::from_millis(1), || async {
                Err::<bool, _>(PagekitError::driver("session gone"))
            })
            .await
            .unwrap_err();
            assert!(matches!(err, PagekitError::Driver { .. }));
        }

        #[tokio::test]
        async fn test_zero_timeout_checks_once() {
            poll_until("exist", Duration::ZERO, Duration::from_millis(1), || async { Ok(true) })
                .await
                .unwrap();
        }
    }
}
