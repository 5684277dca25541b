//! Element interactions: click, type, hover, dropdowns, text and attribute
//! extraction, list matching and state checks.

use regex::Regex;
use tracing::debug;

use super::{display_name, Actions};
use crate::driver::AutomationDriver;
use crate::result::{PagekitError, PagekitResult};
use crate::wait::settle;

/// Outcome of the non-failing element probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementProbe {
    /// Element exists; `displayed` tells whether it is visible
    Found {
        /// Whether the element is displayed
        displayed: bool,
    },
    /// Element could not be located within the probe timeout
    NotFound,
}

impl ElementProbe {
    /// Whether the element was found and is displayed
    #[must_use]
    pub const fn is_displayed(self) -> bool {
        matches!(self, Self::Found { displayed: true })
    }
}

/// How a dropdown option is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectBy {
    Value(String),
    Index(usize),
    Text(String),
}

impl SelectBy {
    fn parse(mode: &str, data: &str) -> PagekitResult<Self> {
        match mode.to_lowercase().as_str() {
            "value" => Ok(Self::Value(data.to_string())),
            "index" => data
                .trim()
                .parse()
                .map(Self::Index)
                .map_err(|_| PagekitError::InvalidOption {
                    option: data.to_string(),
                    message: "dropdown index must be a non-negative integer".to_string(),
                }),
            "text" => Ok(Self::Text(data.to_string())),
            _ => Err(PagekitError::InvalidOption {
                option: mode.to_string(),
                message: "dropdown mode must be one of value, index or text".to_string(),
            }),
        }
    }
}

fn compile(pattern: &str) -> PagekitResult<Regex> {
    Regex::new(pattern).map_err(|e| PagekitError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl<D: AutomationDriver + ?Sized> Actions<D> {
    /// Wait for the element to exist and be enabled.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` when the element does not become enabled within the
    /// element timeout.
    pub async fn wait_for_element_exists(&self, locator: &str) -> PagekitResult<bool> {
        let outcome: PagekitResult<bool> = async {
            let target = self.resolve(locator).await?;
            let timeout = self.timeouts.element();
            self.exist(&target.element, timeout).await?;
            self.driver
                .wait_for_enabled(&target.element, timeout, self.timeouts.poll_interval())
                .await?;
            Ok(true)
        }
        .await;
        self.conclude("element check", locator, outcome, |name, _| {
            format!("'{name}' Element exists")
        })
    }

    /// Click the element.
    ///
    /// # Errors
    ///
    /// Returns the lookup, wait or click error after recording a failed step.
    pub async fn click_on(&self, locator: &str) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            self.wait_for_element_exists(locator).await?;
            let target = self.resolve(locator).await?;
            self.exist(&target.element, self.timeouts.element()).await?;
            self.driver.click(&target.element).await?;
            settle(self.timeouts.click_settle_ms).await;
            Ok(())
        }
        .await;
        self.conclude("click", locator, outcome, |name, _| format!("Clicked on {name}"))
    }

    /// Clear the field and type `text` into it.
    ///
    /// # Errors
    ///
    /// Returns the lookup, wait or input error after recording a failed step.
    pub async fn type_in(&self, locator: &str, text: &str) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            self.wait_for_element_exists(locator).await?;
            let target = self.resolve(locator).await?;
            self.driver.clear_value(&target.element).await?;
            self.driver.set_value(&target.element, text).await
        }
        .await;
        self.conclude("type", locator, outcome, |name, _| {
            format!("Typed '{text}' in the text field '{name}'")
        })
    }

    /// Move the pointer over the element.
    ///
    /// # Errors
    ///
    /// Returns the lookup, wait or pointer error after recording a failed step.
    pub async fn mouse_hover(&self, locator: &str) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            self.wait_for_element_exists(locator).await?;
            let target = self.resolve(locator).await?;
            self.exist(&target.element, self.timeouts.hover()).await?;
            self.driver.move_to(&target.element).await?;
            settle(self.timeouts.hover_settle_ms).await;
            Ok(())
        }
        .await;
        self.conclude("Mouse hover", locator, outcome, |name, _| {
            format!("Mouse hover on {name}")
        })
    }

    /// Select a dropdown option.
    ///
    /// `mode` is `value` (match the option's `value` attribute against
    /// `data`), `index` (`data` is a zero-based position) or `text` (match the
    /// visible text), case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOption` for an unknown mode or a non-numeric index
    /// before any driver call; otherwise the lookup, wait or selection error.
    pub async fn select_dropdown_option(
        &self,
        locator: &str,
        mode: &str,
        data: &str,
    ) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            let select_by = SelectBy::parse(mode, data)?;
            self.wait_for_element_exists(locator).await?;
            let target = self.resolve(locator).await?;
            self.exist(&target.element, self.timeouts.hover()).await?;
            match select_by {
                SelectBy::Value(value) => {
                    self.driver
                        .select_by_attribute(&target.element, "value", &value)
                        .await?;
                }
                SelectBy::Index(index) => {
                    self.driver.select_by_index(&target.element, index).await?;
                }
                SelectBy::Text(text) => {
                    self.driver
                        .select_by_visible_text(&target.element, &text)
                        .await?;
                }
            }
            settle(self.timeouts.hover_settle_ms).await;
            Ok(())
        }
        .await;
        self.conclude("select", locator, outcome, |name, _| {
            format!("Selected {mode} '{data}' from {name} dropdown")
        })
    }

    /// Rendered text of the element.
    ///
    /// # Errors
    ///
    /// Returns the lookup or wait error after recording a failed step.
    pub async fn get_text(&self, locator: &str) -> PagekitResult<String> {
        let outcome: PagekitResult<String> = async {
            let target = self.resolve(locator).await?;
            self.exist(&target.element, self.timeouts.element()).await?;
            self.driver.get_text(&target.element).await
        }
        .await;
        self.conclude("get text", locator, outcome, |name, text| {
            format!("Text from the field '{name}' is {text}")
        })
    }

    /// Attribute value of the element, `None` when the attribute is absent.
    ///
    /// # Errors
    ///
    /// Returns the lookup or wait error after recording a failed step.
    pub async fn get_attribute_value(
        &self,
        locator: &str,
        attribute: &str,
    ) -> PagekitResult<Option<String>> {
        let outcome: PagekitResult<Option<String>> = async {
            let target = self.resolve(locator).await?;
            self.exist(&target.element, self.timeouts.element()).await?;
            self.driver.get_attribute(&target.element, attribute).await
        }
        .await;
        self.conclude("get attribute", locator, outcome, |name, value| {
            format!(
                "'{attribute}' of '{name}' is {}",
                value.as_deref().unwrap_or("<absent>")
            )
        })
    }

    /// Attribute value of every matching element, in document order.
    ///
    /// Elements without the attribute contribute an empty string.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when nothing matches.
    pub async fn get_all_attribute_values(
        &self,
        locator: &str,
        attribute: &str,
    ) -> PagekitResult<Vec<String>> {
        let outcome: PagekitResult<Vec<String>> = async {
            let (parsed, elements) = self.resolve_all(locator).await?;
            let first = elements
                .first()
                .ok_or_else(|| PagekitError::not_found(&parsed.name, "no elements matched"))?;
            self.exist(first, self.timeouts.element()).await?;
            let mut values = Vec::with_capacity(elements.len());
            for element in &elements {
                values.push(
                    self.driver
                        .get_attribute(element, attribute)
                        .await?
                        .unwrap_or_default(),
                );
            }
            Ok(values)
        }
        .await;
        self.conclude("get attributes", locator, outcome, |name, values| {
            format!("{} '{attribute}' values collected from '{name}'", values.len())
        })
    }

    /// Text of every matching element, in document order.
    ///
    /// Each element is scrolled into view first and reported as its own step.
    ///
    /// # Errors
    ///
    /// Returns the lookup, wait or text error after recording a failed step.
    pub async fn get_all_text(&self, locator: &str) -> PagekitResult<Vec<String>> {
        let outcome: PagekitResult<Vec<String>> = async {
            self.wait_for_element_exists(locator).await?;
            let (parsed, elements) = self.resolve_all(locator).await?;
            let mut items = Vec::with_capacity(elements.len());
            for element in &elements {
                self.driver.scroll_into_view(element).await?;
                settle(self.timeouts.list_settle_ms).await;
                let text = self.driver.get_text(element).await?;
                self.recorder
                    .passed(format!("Text from the field '{}' is {text}", parsed.name));
                settle(self.timeouts.list_settle_ms).await;
                items.push(text);
            }
            Ok(items)
        }
        .await;
        outcome.map_err(|err| self.fail("Get text", &display_name(locator), err))
    }

    /// Click the first element whose text matches `pattern`.
    ///
    /// Matching is an unanchored regular-expression search.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for a bad pattern and `ElementNotFound` when
    /// no element text matches.
    pub async fn select_data_from_list(&self, locator: &str, pattern: &str) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            let regex = compile(pattern)?;
            let (parsed, elements) = self.resolve_all(locator).await?;
            for element in &elements {
                let text = self.driver.get_text(element).await?;
                if regex.is_match(&text) {
                    debug!(name = %parsed.name, %text, "list item matched");
                    return self.driver.click(element).await;
                }
            }
            Err(PagekitError::not_found(
                &parsed.name,
                format!("no item matches '{pattern}'"),
            ))
        }
        .await;
        self.conclude("select from list", locator, outcome, |name, _| {
            format!("{pattern} is selected using {name}")
        })
    }

    /// Click every element whose `attribute` matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for a bad pattern and `ElementNotFound` when
    /// nothing matches.
    pub async fn click_based_on_attribute(
        &self,
        locator: &str,
        attribute: &str,
        pattern: &str,
    ) -> PagekitResult<()> {
        let outcome: PagekitResult<usize> = async {
            let regex = compile(pattern)?;
            let (parsed, elements) = self.resolve_all(locator).await?;
            let first = elements
                .first()
                .ok_or_else(|| PagekitError::not_found(&parsed.name, "no elements matched"))?;
            self.exist(first, self.timeouts.element()).await?;
            let mut clicked = 0;
            for element in &elements {
                let value = self
                    .driver
                    .get_attribute(element, attribute)
                    .await?
                    .unwrap_or_default();
                if regex.is_match(&value) {
                    self.driver.click(element).await?;
                    clicked += 1;
                }
            }
            if clicked == 0 {
                return Err(PagekitError::not_found(
                    &parsed.name,
                    format!("no '{attribute}' matches '{pattern}'"),
                ));
            }
            Ok(clicked)
        }
        .await;
        self.conclude("click", locator, outcome, |name, clicked| {
            format!("Clicked {clicked} '{name}' element(s) whose {attribute} matches {pattern}")
        })
        .map(|_| ())
    }

    /// Click the first element whose `attribute` contains `needle`, scrolling
    /// each candidate into view first when `scroll` is set.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when no attribute contains `needle`.
    pub async fn click_first_with_attribute(
        &self,
        locator: &str,
        attribute: &str,
        needle: &str,
        scroll: bool,
    ) -> PagekitResult<()> {
        let outcome: PagekitResult<()> = async {
            let (parsed, elements) = self.resolve_all(locator).await?;
            for element in &elements {
                if scroll {
                    self.driver.scroll_into_view(element).await?;
                }
                let value = self.driver.get_attribute(element, attribute).await?;
                if value.is_some_and(|v| v.contains(needle)) {
                    return self.driver.click(element).await;
                }
            }
            Err(PagekitError::not_found(
                &parsed.name,
                format!("no '{attribute}' contains '{needle}'"),
            ))
        }
        .await;
        self.conclude("click", locator, outcome, |name, _| {
            format!("Clicked '{name}' whose {attribute} contains {needle}")
        })
    }

    /// Click the `index`-th match and return the text it showed.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when fewer than `index + 1` elements match.
    pub async fn click_element_at(&self, locator: &str, index: usize) -> PagekitResult<String> {
        let outcome: PagekitResult<String> = async {
            let (parsed, elements) = self.resolve_all(locator).await?;
            let element = elements.get(index).ok_or_else(|| {
                PagekitError::not_found(
                    &parsed.name,
                    format!("only {} element(s), no index {index}", elements.len()),
                )
            })?;
            let text = self.driver.get_text(element).await?;
            self.driver.click(element).await?;
            settle(self.timeouts.click_settle_ms).await;
            Ok(text)
        }
        .await;
        self.conclude("click", locator, outcome, |name, text| {
            format!("Clicked {name} number {index} showing '{text}'")
        })
    }

    async fn displayed_state(&self, locator: &str) -> PagekitResult<bool> {
        let target = self.resolve(locator).await?;
        self.exist(&target.element, self.timeouts.displayed()).await?;
        self.driver.is_displayed(&target.element).await
    }

    /// Whether the element is displayed.
    ///
    /// # Errors
    ///
    /// Returns the lookup or wait error when the element cannot be found.
    pub async fn is_element_displayed(&self, locator: &str) -> PagekitResult<bool> {
        let outcome = self.displayed_state(locator).await;
        self.conclude("displayed check", locator, outcome, |name, displayed| {
            format!("'{name}' displayed status is {displayed}")
        })
    }

    /// Require the element to be displayed.
    ///
    /// # Errors
    ///
    /// Returns `NotDisplayed` when the element exists but is hidden, or the
    /// lookup or wait error when it cannot be found.
    pub async fn verify_element_is_displayed(&self, locator: &str) -> PagekitResult<bool> {
        let outcome: PagekitResult<bool> = async {
            if self.displayed_state(locator).await? {
                Ok(true)
            } else {
                Err(PagekitError::NotDisplayed {
                    element: display_name(locator),
                })
            }
        }
        .await;
        self.conclude("verify displayed", locator, outcome, |name, _| {
            format!("'{name}' is displayed")
        })
    }

    /// Whether the element is enabled.
    ///
    /// # Errors
    ///
    /// Returns the lookup or driver error.
    pub async fn is_element_enabled(&self, locator: &str) -> PagekitResult<bool> {
        let outcome: PagekitResult<bool> = async {
            let target = self.resolve(locator).await?;
            self.driver.is_enabled(&target.element).await
        }
        .await;
        self.conclude("enabled check", locator, outcome, |name, enabled| {
            format!("'{name}' enabled status is {enabled}")
        })
    }

    /// Whether the element currently exists.
    ///
    /// # Errors
    ///
    /// Returns the lookup or driver error.
    pub async fn is_element_exists(&self, locator: &str) -> PagekitResult<bool> {
        let outcome: PagekitResult<bool> = async {
            let target = self.resolve(locator).await?;
            self.driver.is_existing(&target.element).await
        }
        .await;
        self.conclude("exists check", locator, outcome, |name, exists| {
            format!("'{name}' existence is {exists}")
        })
    }

    /// Probe for the element without failing.
    ///
    /// Any error, including an unsupported strategy, yields
    /// [`ElementProbe::NotFound`]; nothing is recorded as a failed step.
    pub async fn probe_element(&self, locator: &str) -> ElementProbe {
        let outcome: PagekitResult<bool> = async {
            let target = self.resolve(locator).await?;
            self.exist(&target.element, self.timeouts.probe()).await?;
            self.driver.is_displayed(&target.element).await
        }
        .await;
        match outcome {
            Ok(displayed) => {
                debug!(element = %display_name(locator), displayed, "probe found element");
                ElementProbe::Found { displayed }
            }
            Err(err) => {
                debug!(element = %display_name(locator), error = %err, "probe found nothing");
                ElementProbe::NotFound
            }
        }
    }

    /// `true` only when the element is found and displayed; never fails.
    pub async fn return_element_status(&self, locator: &str) -> bool {
        self.probe_element(locator).await.is_displayed()
    }
}
