//! Locator strings: the compact `Name#strategy=selector` encoding used by
//! every page object.
//!
//! ```text
//!   Books Link # css = div#nav-xshop>a[href*='Books']
//!   └── name ─┘  └┬┘   └──────────── selector ──────┘
//!              strategy
//! ```
//!
//! The name is only for humans (it shows up in step reports), the strategy
//! picks how the selector is evaluated, and the selector is passed to the
//! driver verbatim. Parsing is a pure function returning a value; nothing is
//! cached between calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::result::{PagekitError, PagekitResult};

/// Lookup strategy for a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// CSS selector (e.g. `div#nav-xshop>a`)
    Css,
    /// XPath expression (e.g. `//a[@href="#mmenu"]`)
    XPath,
}

impl Strategy {
    /// Map a strategy token to a strategy, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `StrategyUnsupported` for anything other than `css` or `xpath`.
    pub fn from_token(token: &str) -> PagekitResult<Self> {
        match token.to_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "xpath" => Ok(Self::XPath),
            other => Err(PagekitError::StrategyUnsupported {
                strategy: other.to_string(),
            }),
        }
    }

    /// Token as written in locator strings
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A locator string split into its three parts.
///
/// `strategy` is kept as the lowercased token rather than a [`Strategy`]
/// because membership is only checked when the locator is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedLocator {
    /// Human-readable element name (trimmed)
    pub name: String,
    /// Lowercased strategy token
    pub strategy: String,
    /// Selector, verbatim
    pub selector: String,
}

impl ParsedLocator {
    /// Resolve the strategy token.
    ///
    /// # Errors
    ///
    /// Returns `StrategyUnsupported` when the token is not recognised.
    pub fn strategy(&self) -> PagekitResult<Strategy> {
        Strategy::from_token(&self.strategy)
    }
}

impl fmt::Display for ParsedLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}={}", self.name, self.strategy, self.selector)
    }
}

impl FromStr for ParsedLocator {
    type Err = PagekitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Split a locator string into name, strategy and selector.
///
/// The first `#` ends the name and the first `=` ends the strategy;
/// everything after that `=` is the selector, so selectors may themselves
/// contain `#` and `=`.
///
/// # Errors
///
/// Returns `LocatorParse` when `#` or `=` is missing, when an `=` comes
/// before the first `#`, or when the selector is empty.
///
/// # Example
///
/// ```
/// let parsed = pagekit::locator::parse("Books Link#css=div#nav-xshop>a[href*='Books']").unwrap();
/// assert_eq!(parsed.name, "Books Link");
/// assert_eq!(parsed.strategy, "css");
/// assert_eq!(parsed.selector, "div#nav-xshop>a[href*='Books']");
/// ```
pub fn parse(locator: &str) -> PagekitResult<ParsedLocator> {
    let reject = |reason: &str| PagekitError::LocatorParse {
        locator: locator.to_string(),
        reason: reason.to_string(),
    };

    let hash = locator.find('#').ok_or_else(|| reject("missing '#'"))?;
    let equals = locator.find('=').ok_or_else(|| reject("missing '='"))?;
    debug!(index_of_hash = hash, index_of_equal_to = equals, "locator split points");
    if equals < hash {
        return Err(reject("'=' appears before '#'"));
    }

    let selector = &locator[equals + 1..];
    if selector.is_empty() {
        return Err(reject("empty selector"));
    }

    let parsed = ParsedLocator {
        name: locator[..hash].trim().to_string(),
        strategy: locator[hash + 1..equals].to_lowercase(),
        selector: selector.to_string(),
    };
    debug!(
        name = %parsed.name,
        strategy = %parsed.strategy,
        selector = %parsed.selector,
        "parsed locator"
    );
    Ok(parsed)
}

/// Whether a selector reads as an XPath expression.
///
/// Locators tagged `css` sometimes carry XPath (both strategies share one
/// lookup), so drivers decide by shape rather than by tag.
#[must_use]
pub fn looks_like_xpath(selector: &str) -> bool {
    let trimmed = selector.trim_start();
    trimmed.starts_with('/') || trimmed.starts_with("(/") || trimmed.starts_with("./")
}
