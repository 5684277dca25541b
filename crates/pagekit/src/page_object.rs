//! Page Object Model support
//!
//! A page object owns a table of named locator strings and composes journey
//! steps from the action catalogue.
//!
//! # Example
//!
//! ```
//! use pagekit::page_object::PageObject;
//!
//! struct LoginPage;
//!
//! impl PageObject for LoginPage {
//!     fn url_pattern(&self) -> &str {
//!         "/login"
//!     }
//!
//!     fn locators(&self) -> Vec<(&'static str, &'static str)> {
//!         vec![("username", "user name#css=input[name='username']")]
//!     }
//! }
//!
//! assert!(LoginPage.validate_locators().is_ok());
//! ```

use crate::locator::{self, ParsedLocator};
use crate::result::{PagekitError, PagekitResult};

/// A page or component with a fixed locator table
pub trait PageObject {
    /// URL pattern that matches this page (e.g. `/`, `/search*`)
    fn url_pattern(&self) -> &str;

    /// Static locator table as `(field, locator string)` pairs
    fn locators(&self) -> Vec<(&'static str, &'static str)>;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Wait allowed for the page to load (in milliseconds)
    fn load_timeout_ms(&self) -> u64 {
        30_000
    }

    /// Parse and strategy-check every locator in the table.
    ///
    /// # Errors
    ///
    /// Returns the first `LocatorParse` or `StrategyUnsupported` error, with
    /// the field name prefixed to a parse reason.
    fn validate_locators(&self) -> PagekitResult<Vec<(&'static str, ParsedLocator)>> {
        self.locators()
            .into_iter()
            .map(|(field, raw)| {
                let parsed = locator::parse(raw).map_err(|err| match err {
                    PagekitError::LocatorParse { locator, reason } => PagekitError::LocatorParse {
                        locator,
                        reason: format!("{field}: {reason}"),
                    },
                    other => other,
                })?;
                let _ = parsed.strategy()?;
                Ok((field, parsed))
            })
            .collect()
    }
}
