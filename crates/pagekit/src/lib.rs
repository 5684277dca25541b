//! Pagekit: locator-string element actions and page objects for end-to-end
//! website journeys.
//!
//! Page objects name their elements with strings of the form
//! `"<display name>#<strategy>=<selector>"`. The action catalogue parses
//! them, resolves the element through an injected [`AutomationDriver`],
//! performs one interaction and records a passed or failed step.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       PAGEKIT Architecture                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────┐ │
//! │  │ SuiteRunner│──►│ BupaPage   │──►│ Actions    │──►│ Automation│ │
//! │  │ (journeys x│   │ (locators, │   │ (parse,    │   │ Driver    │ │
//! │  │ capability)│   │  journeys) │   │ wait, act) │   │ CDP / mock│ │
//! │  └─────┬──────┘   └────────────┘   └─────┬──────┘   └──────────┘ │
//! │        │                                 │                        │
//! │        ▼                                 ▼                        │
//! │  ┌────────────┐                   ┌────────────┐                  │
//! │  │ Reporter   │◄──────────────────│StepRecorder│                  │
//! │  │ JSON / HTML│                   │ pass/fail  │                  │
//! │  └────────────┘                   └────────────┘                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pagekit::locator;
//!
//! let parsed = locator::parse("books link#css=a[href*='books']").unwrap();
//! assert_eq!(parsed.name, "books link");
//! assert_eq!(parsed.strategy, "css");
//! assert_eq!(parsed.selector, "a[href*='books']");
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_futures))]

/// Locator-driven element actions
pub mod actions;
/// Value checks used by page journeys
pub mod assertion;
/// System date and time capture
pub mod clock;
/// Suite configuration
pub mod config;
/// Driver abstraction and scripted mock
pub mod driver;
/// Local file utilities
pub mod file_ops;
/// Locator-string parsing
pub mod locator;
/// Page object trait
pub mod page_object;
/// Site page objects
pub mod pages;
/// Step and journey reporting
pub mod reporter;
/// Error types
pub mod result;
/// Journey suite runner
pub mod suite;
/// Journey test data
pub mod test_data;
/// Timeouts and polling
pub mod wait;

/// Chromium driver over CDP
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod browser;

pub use actions::{Actions, ElementProbe};
pub use assertion::{Assertion, AssertionResult};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumFactory};
pub use config::{Capability, SuiteConfig, DEFAULT_BASE_URL};
pub use driver::{
    AutomationDriver, DeviceClass, DriverFactory, ElementHandle, Key, MockDriver, MockEffect,
    MockElement, MockOption, Swipe,
};
pub use locator::{ParsedLocator, Strategy};
pub use page_object::PageObject;
pub use pages::{BupaPage, Menu, MenuItem};
pub use reporter::{
    FailureMode, Reporter, Step, StepRecorder, StepStatus, TestResultEntry, TestStatus,
};
pub use result::{PagekitError, PagekitResult};
pub use suite::{Journey, SuiteRunner};
pub use test_data::{LinkRecord, LocationRecord, TestData};
pub use wait::Timeouts;
