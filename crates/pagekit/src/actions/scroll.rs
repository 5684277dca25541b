//! Scrolling: into view, until a target shows up, touch swipes and
//! keyboard paging.

use std::time::Duration;
use tracing::debug;

use super::Actions;
use crate::driver::{AutomationDriver, Key, Swipe};
use crate::result::{PagekitError, PagekitResult};
use crate::wait::settle;

/// Horizontal position of coordinate swipes
pub const SWIPE_X: i32 = 500;

/// Hold time before a coordinate swipe moves
pub const SWIPE_HOLD: Duration = Duration::from_secs(1);

impl<D: AutomationDriver + ?Sized> Actions<D> {
    /// Scroll the element into the viewport.
    ///
    /// # Errors
    ///
    /// Returns the lookup, wait or scroll error after recording a failed step.
    pub async fn scroll_to_element(&self, locator: &str) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            let target = self.resolve(locator).await?;
            self.exist(&target.element, self.timeouts.element()).await?;
            debug!(name = %target.locator.name, "scrolling into view");
            self.driver.scroll_into_view(&target.element).await
        }
        .await;
        self.conclude("Scroll", locator, outcome, |name, _| {
            format!("Scroll action performed for '{name}'")
        })
    }

    /// Scroll through `scroll_locator`'s elements until `target_locator` is
    /// displayed.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` naming the target when it never shows up.
    pub async fn scroll_to_view(
        &self,
        scroll_locator: &str,
        target_locator: &str,
    ) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            let (_, elements) = self.resolve_all(scroll_locator).await?;
            for element in &elements {
                self.driver.scroll_into_view(element).await?;
                if self.return_element_status(target_locator).await {
                    return Ok(());
                }
            }
            Err(PagekitError::not_found(
                super::display_name(target_locator),
                "not displayed after scrolling",
            ))
        }
        .await;
        self.conclude("Scroll", target_locator, outcome, |name, _| {
            format!("Scrolled '{name}' into view")
        })
    }

    /// Swipe vertically at a fixed x from `start_y` to `end_y`.
    ///
    /// # Errors
    ///
    /// Returns the driver's gesture error after recording a failed step.
    pub async fn scroll_using_coordinates(&self, start_y: i32, end_y: i32) -> PagekitResult<()> {
        let outcome = self
            .driver
            .swipe(Swipe {
                x: SWIPE_X,
                start_y,
                end_y,
                hold: SWIPE_HOLD,
            })
            .await;
        let outcome = self.conclude_plain(
            "Scroll",
            outcome,
            |_| "Scrolled down".to_string(),
            |err| format!("Scroll down failed due to : {err}"),
        );
        if outcome.is_ok() {
            settle(self.timeouts.swipe_settle_ms).await;
        }
        outcome
    }

    /// Press arrow-down `last_index + 1` times.
    ///
    /// # Errors
    ///
    /// Returns the first key press error after recording a failed step.
    pub async fn scroll_to_bottom_based_on_last_index(&self, last_index: usize) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            for _ in 0..=last_index {
                self.driver.press_key(Key::ArrowDown).await?;
            }
            Ok(())
        }
        .await;
        self.conclude_plain(
            "Scroll",
            outcome,
            |_| format!("Pressed arrow down {} times", last_index + 1),
            |err| format!("Scroll to bottom failed due to : {err}"),
        )
    }
}
