//! Result and error types for pagekit.
//!
//! Every failure an action can hit falls into one closed set of kinds so
//! callers can branch on the kind instead of matching message text.

use thiserror::Error;

/// Result type for pagekit operations
pub type PagekitResult<T> = Result<T, PagekitError>;

/// Errors that can occur while resolving locators or driving the browser
#[derive(Debug, Error)]
pub enum PagekitError {
    /// Locator string is not of the form `Name#strategy=selector`
    #[error("Invalid locator '{locator}': {reason}")]
    LocatorParse {
        /// Raw locator string
        locator: String,
        /// Why it was rejected
        reason: String,
    },

    /// Locator strategy is not one of the recognised tokens
    #[error("Element Identifier '{strategy}' is not defined")]
    StrategyUnsupported {
        /// Lowercased strategy token
        strategy: String,
    },

    /// No element matched
    #[error("Element '{element}' not found: {message}")]
    ElementNotFound {
        /// Element display name or selector
        element: String,
        /// Detail
        message: String,
    },

    /// The underlying automation operation failed
    #[error("{action} on '{element}' failed: {message}")]
    ActionFailed {
        /// Action name
        action: String,
        /// Element display name
        element: String,
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited on
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Option outside the accepted set (dropdown mode, menu name, ...)
    #[error("Invalid option '{option}': {message}")]
    InvalidOption {
        /// Offending value
        option: String,
        /// Error message
        message: String,
    },

    /// Text match pattern is not a valid regular expression
    #[error("Invalid match pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern text
        pattern: String,
        /// Error message
        message: String,
    },

    /// Element exists but is not displayed
    #[error("'{element}' is not displayed")]
    NotDisplayed {
        /// Element display name
        element: String,
    },

    /// Journey-level assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Raw driver error, lifted into `ActionFailed` at the action boundary
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Suite configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Test data error
    #[error("Test data error: {message}")]
    TestData {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagekitError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an element-not-found error
    #[must_use]
    pub fn not_found(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ElementNotFound {
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Lift a raw driver error into `ActionFailed` for the named element.
    ///
    /// Every other kind is returned unchanged.
    #[must_use]
    pub fn for_action(self, action: &str, element: &str) -> Self {
        match self {
            Self::Driver { message } => Self::ActionFailed {
                action: action.to_string(),
                element: element.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Whether this error is a timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether this error means the element could not be located
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::Timeout { .. } | Self::StrategyUnsupported { .. }
        )
    }
}
