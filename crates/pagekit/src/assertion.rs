//! Assertions for journey validation.

use std::fmt::Debug;

use crate::result::{PagekitError, PagekitResult};

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a result
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` carrying the message when the assertion failed
    pub fn into_result(self) -> PagekitResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(PagekitError::assertion(self.message))
        }
    }
}

/// Assertion helpers
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected '{haystack}' to contain '{needle}'"))
        }
    }

    /// Assert a string contains a substring, ignoring case
    #[must_use]
    pub fn contains_ignore_case(haystack: &str, needle: &str) -> AssertionResult {
        Self::contains(&haystack.to_lowercase(), &needle.to_lowercase())
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a collection is not empty
    #[must_use]
    pub fn not_empty<T>(collection: &[T], what: &str) -> AssertionResult {
        if collection.is_empty() {
            AssertionResult::fail(format!("expected at least one {what}"))
        } else {
            AssertionResult::pass()
        }
    }
}
