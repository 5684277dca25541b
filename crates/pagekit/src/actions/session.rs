//! Session lifecycle, windows and page-level passthroughs.

use std::time::Duration;
use tracing::{error, info, warn};

use super::Actions;
use crate::driver::{AutomationDriver, DeviceClass};
use crate::result::PagekitResult;
use crate::wait::settle;

impl<D: AutomationDriver + ?Sized> Actions<D> {
    /// Classify the session and prepare the window.
    ///
    /// Mobile sessions are left as they are; desktop windows are maximised.
    ///
    /// # Errors
    ///
    /// Returns the driver error from the device query or the maximise call.
    pub async fn initialize_session(&self) -> PagekitResult<DeviceClass> {
        if self.driver.is_mobile().await? {
            info!("mobile session");
            return Ok(DeviceClass::Mobile);
        }
        self.driver.maximize_window().await?;
        info!("desktop session, window maximised");
        Ok(DeviceClass::Desktop)
    }

    /// Close the window and start a fresh browser session.
    ///
    /// Teardown is best effort: failures are logged and swallowed, and the
    /// session is reloaded even when the window could not be closed.
    pub async fn reset_session(&self) {
        info!("Close session");
        if let Err(err) = self.driver.close_window().await {
            warn!(error = %err, "Closing the window failed");
        }
        if let Err(err) = self.driver.reload_session().await {
            error!(error = %err, "Reloading the session failed");
        }
    }

    /// Switch focus to every window other than the current one, in order.
    ///
    /// Returns the handle finally focused, or `None` when only one window is
    /// open.
    ///
    /// # Errors
    ///
    /// Returns the driver error from enumerating or switching windows.
    pub async fn switch_to_new_window(&self) -> PagekitResult<Option<String>> {
        let outcome: PagekitResult<Option<String>> = async {
            let all = self.driver.window_handles().await?;
            let current = self.driver.current_window_handle().await?;
            self.driver.switch_to_window(&current).await?;
            let mut switched = None;
            for handle in all.into_iter().filter(|h| *h != current) {
                self.driver.switch_to_window(&handle).await?;
                settle(self.timeouts.window_settle_ms).await;
                let title = self.driver.title().await?;
                self.recorder.passed(format!("switched to new tab {title}"));
                switched = Some(handle);
            }
            if switched.is_none() {
                warn!("no other window to switch to");
            }
            Ok(switched)
        }
        .await;
        outcome.map_err(|err| {
            let err = err.for_action("switch window", "browser");
            self.recorder
                .failed(format!("not switched to new tab due to '{err}'"));
            err
        })
    }

    /// Reload the current page.
    ///
    /// # Errors
    ///
    /// Returns the driver error after recording a failed step.
    pub async fn reload_page(&self) -> PagekitResult<()> {
        let outcome = self.driver.reload().await;
        self.conclude_plain(
            "reload",
            outcome,
            |_| "browser reloaded".to_string(),
            |err| format!("browser is not reloaded due to {err}"),
        )
    }

    /// Title of the current page.
    ///
    /// # Errors
    ///
    /// Returns the driver error after recording a failed step.
    pub async fn get_page_title(&self) -> PagekitResult<String> {
        let outcome = self.driver.title().await;
        self.conclude_plain(
            "get title",
            outcome,
            |title| format!("{title} : page title is extracted"),
            |err| format!("page title is not extracted due to {err}"),
        )
    }

    /// Open `url` in the current window.
    ///
    /// # Errors
    ///
    /// Returns the driver error after recording a failed step.
    pub async fn navigate_to_url(&self, url: &str) -> PagekitResult<()> {
        let outcome = self.driver.navigate(url).await;
        self.conclude_plain(
            "navigate",
            outcome,
            |_| format!("Navigated to {url}"),
            |err| format!("navigation to {url} failed due to {err}"),
        )
    }

    /// URL of the current page.
    ///
    /// # Errors
    ///
    /// Returns the driver error after recording a failed step.
    pub async fn current_url(&self) -> PagekitResult<String> {
        let outcome = self.driver.current_url().await;
        self.conclude_plain(
            "current url",
            outcome,
            |url| format!("current url is {url}"),
            |err| format!("current url is not extracted due to {err}"),
        )
    }

    /// Sleep for `seconds`; negative or non-finite values are treated as zero.
    pub async fn wait_in_seconds(&self, seconds: f64) {
        let duration = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::harness;
    use crate::driver::MockDriver;
    use crate::reporter::StepStatus;
    use crate::result::PagekitError;

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_initialize_mobile_session() {
            let (driver, actions) = harness(MockDriver::new().mobile());
            assert_eq!(actions.initialize_session().await.unwrap(), DeviceClass::Mobile);
            assert!(!driver.was_called("maximize_window"));
        }

        #[tokio::test]
        async fn test_initialize_desktop_session_maximises() {
            let (driver, actions) = harness(MockDriver::new());
            assert_eq!(actions.initialize_session().await.unwrap(), DeviceClass::Desktop);
            assert!(driver.was_called("maximize_window"));
        }

        #[tokio::test]
        async fn test_reset_session_closes_then_reloads() {
            let (driver, actions) = harness(MockDriver::new());
            actions.reset_session().await;
            assert_eq!(driver.history(), vec!["close_window", "reload_session"]);
        }

        #[tokio::test]
        async fn test_reset_session_swallows_failure() {
            let (driver, actions) = harness(MockDriver::new());
            driver.fail_on("reload_session", "session deleted");
            actions.reset_session().await;
            assert!(actions.recorder().is_empty());
        }

        #[tokio::test]
        async fn test_reset_session_reloads_with_single_window() {
            let (driver, actions) = harness(MockDriver::new());
            actions.navigate_to_url("https://www.bupa.com/").await.unwrap();
            actions.reset_session().await;
            assert!(driver.was_called("reload_session"));
            assert_eq!(actions.current_url().await.unwrap(), "about:blank");
        }

        #[tokio::test]
        async fn test_reset_session_reloads_after_close_failure() {
            let (driver, actions) = harness(MockDriver::new());
            driver.fail_on("close_window", "no such window");
            actions.reset_session().await;
            assert_eq!(driver.history(), vec!["close_window", "reload_session"]);
            assert!(actions.recorder().is_empty());
        }
    }

    mod window_tests {
        use super::*;

        #[tokio::test]
        async fn test_switch_to_new_window() {
            let (driver, actions) = harness(MockDriver::new());
            let handle = driver.open_window("Careers | Bupa", "https://careers.bupa.com");
            let switched = actions.switch_to_new_window().await.unwrap();
            assert_eq!(switched, Some(handle));
            assert_eq!(actions.get_page_title().await.unwrap(), "Careers | Bupa");
            assert_eq!(
                actions.recorder().steps()[0].message,
                "switched to new tab Careers | Bupa"
            );
        }

        #[tokio::test]
        async fn test_switch_with_single_window() {
            let (_, actions) = harness(MockDriver::new());
            assert_eq!(actions.switch_to_new_window().await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_switch_failure_recorded() {
            let (driver, actions) = harness(MockDriver::new());
            driver.fail_on("window_handles", "session deleted");
            let err = actions.switch_to_new_window().await.unwrap_err();
            assert!(matches!(err, PagekitError::ActionFailed { .. }));
            assert_eq!(actions.recorder().steps()[0].status, StepStatus::Failed);
        }
    }

    mod page_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_and_current_url() {
            let (_, actions) = harness(MockDriver::new());
            actions.navigate_to_url("https://www.bupa.com/").await.unwrap();
            assert_eq!(actions.current_url().await.unwrap(), "https://www.bupa.com/");
        }

        #[tokio::test]
        async fn test_reload_failure() {
            let (driver, actions) = harness(MockDriver::new());
            driver.fail_on("reload", "timeout");
            assert!(actions.reload_page().await.is_err());
            assert!(actions.recorder().failures()[0].starts_with("browser is not reloaded"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_wait_in_seconds_negative_is_zero() {
            let (_, actions) = harness(MockDriver::new());
            actions.wait_in_seconds(-1.0).await;
            actions.wait_in_seconds(0.5).await;
        }
    }
}
