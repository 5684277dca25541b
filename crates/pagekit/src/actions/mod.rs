//! Action catalogue.
//!
//! Every action takes a locator string, resolves it through the injected
//! [`AutomationDriver`], performs one interaction and records exactly one
//! passed or failed step. Failures are returned as typed errors after the
//! step is recorded.
//!
//! ```text
//!   "run search#css=input[id=searchButton]"
//!          │
//!          ▼ locator::parse      ──► LocatorParse
//!   ParsedLocator
//!          │
//!          ▼ Strategy::from_token ──► StrategyUnsupported (no driver call)
//!   AutomationDriver::find_element
//!          │
//!          ▼ wait / act
//!   StepRecorder::passed | failed
//! ```

mod elements;
mod scroll;
mod session;

pub use elements::ElementProbe;

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::driver::{AutomationDriver, ElementHandle};
use crate::locator::{self, ParsedLocator};
use crate::reporter::StepRecorder;
use crate::result::{PagekitError, PagekitResult};
use crate::wait::Timeouts;

/// A locator resolved to a driver handle
#[derive(Debug, Clone)]
pub(crate) struct Resolved {
    pub(crate) locator: ParsedLocator,
    pub(crate) element: ElementHandle,
}

/// Locator-driven element actions over an injected driver.
///
/// All methods take `&self`; one instance can be shared by concurrent
/// flows because parsed locators are never stored.
#[derive(Debug)]
pub struct Actions<D: AutomationDriver + ?Sized> {
    driver: Arc<D>,
    timeouts: Timeouts,
    recorder: StepRecorder,
}

impl<D: AutomationDriver + ?Sized> Clone for Actions<D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            timeouts: self.timeouts,
            recorder: self.recorder.clone(),
        }
    }
}

impl<D: AutomationDriver + ?Sized> Actions<D> {
    /// Create actions over `driver` with default timeouts
    #[must_use]
    pub fn new(driver: Arc<D>) -> Self {
        Self {
            driver,
            timeouts: Timeouts::default(),
            recorder: StepRecorder::new(),
        }
    }

    /// Replace the timeout table
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Report steps into an existing recorder
    #[must_use]
    pub fn with_recorder(mut self, recorder: StepRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    /// Step recorder
    #[must_use]
    pub const fn recorder(&self) -> &StepRecorder {
        &self.recorder
    }

    /// Timeout table in effect
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// Parse and check the strategy without touching the driver
    fn parse_checked(locator: &str) -> PagekitResult<ParsedLocator> {
        let parsed = locator::parse(locator)?;
        let strategy = parsed.strategy()?;
        debug!(name = %parsed.name, %strategy, "resolving element");
        Ok(parsed)
    }

    pub(crate) async fn resolve(&self, locator: &str) -> PagekitResult<Resolved> {
        let locator = Self::parse_checked(locator)?;
        let element = self.driver.find_element(&locator.selector).await?;
        Ok(Resolved { locator, element })
    }

    pub(crate) async fn resolve_all(
        &self,
        locator: &str,
    ) -> PagekitResult<(ParsedLocator, Vec<ElementHandle>)> {
        let locator = Self::parse_checked(locator)?;
        let elements = self.driver.find_elements(&locator.selector).await?;
        debug!(name = %locator.name, count = elements.len(), "resolved elements");
        Ok((locator, elements))
    }

    /// Resolve a locator to the first matching element.
    ///
    /// No waiting happens here; the handle may not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `LocatorParse` or `StrategyUnsupported` before any driver
    /// call, or the driver's lookup error.
    pub async fn find_web_element(&self, locator: &str) -> PagekitResult<ElementHandle> {
        match self.resolve(locator).await {
            Ok(resolved) => Ok(resolved.element),
            Err(err) => Err(self.lookup_failed(err)),
        }
    }

    /// Resolve a locator to every matching element, in document order.
    ///
    /// # Errors
    ///
    /// Same as [`Actions::find_web_element`].
    pub async fn find_web_elements(&self, locator: &str) -> PagekitResult<Vec<ElementHandle>> {
        match self.resolve_all(locator).await {
            Ok((_, elements)) => Ok(elements),
            Err(err) => Err(self.lookup_failed(err)),
        }
    }

    fn lookup_failed(&self, err: PagekitError) -> PagekitError {
        self.recorder.failed(format!("{err} in findWebElement"));
        err
    }

    // ------------------------------------------------------------------------
    // Step reporting
    // ------------------------------------------------------------------------

    /// Record the outcome of `action` on `locator`.
    ///
    /// On success `passed` builds the step message from the element name;
    /// on failure the error is lifted, recorded and returned.
    pub(crate) fn conclude<T>(
        &self,
        action: &str,
        locator: &str,
        outcome: PagekitResult<T>,
        passed: impl FnOnce(&str, &T) -> String,
    ) -> PagekitResult<T> {
        let name = display_name(locator);
        match outcome {
            Ok(value) => {
                self.recorder.passed(passed(&name, &value));
                Ok(value)
            }
            Err(err) => Err(self.fail(action, &name, err)),
        }
    }

    /// Lift `err` for `action`, record the failed step and hand it back
    pub(crate) fn fail(&self, action: &str, name: &str, err: PagekitError) -> PagekitError {
        let err = err.for_action(action, name);
        self.recorder.failed(format!(
            "{action} action on {name} failed due to the following error: {err}"
        ));
        err
    }

    /// Wait for `element` to exist within `timeout`
    pub(crate) async fn exist(&self, element: &ElementHandle, timeout: Duration) -> PagekitResult<()> {
        self.driver
            .wait_for_exist(element, timeout, self.timeouts.poll_interval())
            .await
    }

    /// Record the outcome of a driver-level operation with no element
    pub(crate) fn conclude_plain<T>(
        &self,
        action: &str,
        outcome: PagekitResult<T>,
        passed: impl FnOnce(&T) -> String,
        failed: impl FnOnce(&PagekitError) -> String,
    ) -> PagekitResult<T> {
        match outcome {
            Ok(value) => {
                self.recorder.passed(passed(&value));
                Ok(value)
            }
            Err(err) => {
                let err = err.for_action(action, "browser");
                self.recorder.failed(failed(&err));
                Err(err)
            }
        }
    }
}

/// Element name for step messages, falling back to the raw locator when it
/// does not parse.
pub(crate) fn display_name(locator: &str) -> String {
    locator::parse(locator).map_or_else(|_| locator.to_string(), |p| p.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::reporter::StepStatus;

    pub(crate) fn harness(driver: MockDriver) -> (Arc<MockDriver>, Actions<MockDriver>) {
        let driver = Arc::new(driver);
        let actions = Actions::new(Arc::clone(&driver)).with_timeouts(Timeouts {
            element_ms: 200,
            hover_ms: 200,
            displayed_ms: 200,
            probe_ms: 200,
            ..Timeouts::without_settle()
        });
        (driver, actions)
    }

    mod resolve_tests {
        use super::*;

        #[tokio::test]
        async fn test_unsupported_strategy_never_reaches_driver() {
            let (driver, actions) = harness(MockDriver::new());
            let err = actions.find_web_element("Foo#bar=.sel").await.unwrap_err();
            assert!(matches!(
                err,
                PagekitError::StrategyUnsupported { ref strategy } if strategy == "bar"
            ));
            assert!(driver.history().is_empty());
            let steps = actions.recorder().steps();
            assert_eq!(steps.len(), 1);
            assert_eq!(steps[0].status, StepStatus::Failed);
            assert!(steps[0].message.contains("'bar' is not defined"));
        }

        #[tokio::test]
        async fn test_css_and_xpath_share_lookup() {
            let (driver, actions) = harness(
                MockDriver::new()
                    .with_element("//a[@href=\"#mmenu\"]", MockElement::default())
                    .with_element("input[id=searchTextbox]", MockElement::default()),
            );
            let _ = actions
                .find_web_element("mobile menu bar#xpath=//a[@href=\"#mmenu\"]")
                .await
                .unwrap();
            let handle = actions
                .find_web_element("search text box#CSS=input[id=searchTextbox]")
                .await
                .unwrap();
            assert_eq!(handle.selector, "input[id=searchTextbox]");
            assert_eq!(driver.call_count("find_element"), 2);
        }

        #[tokio::test]
        async fn test_find_web_elements_ordered() {
            let (_, actions) = harness(
                MockDriver::new()
                    .with_element("a", MockElement::with_text("1"))
                    .with_element("a", MockElement::with_text("2")),
            );
            let handles = actions.find_web_elements("links#css=a").await.unwrap();
            assert_eq!(handles.iter().map(|h| h.index).collect::<Vec<_>>(), vec![0, 1]);
        }

        #[test]
        fn test_display_name_falls_back_to_raw() {
            assert_eq!(display_name("search box#css=input"), "search box");
            assert_eq!(display_name("not a locator"), "not a locator");
        }
    }
}
