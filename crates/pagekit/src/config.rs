//! Suite configuration
//!
//! ```yaml
//! base_url: https://www.bupa.com/
//! max_instances: 3
//! bail: false
//! log_level: error
//! report_dir: target/pagekit
//! capabilities:
//!   - name: pixel-6
//!     browser_name: chrome
//!     device_name: Pixel 6
//!     mobile: true
//!     viewport_width: 412
//!     viewport_height: 915
//! timeouts:
//!   element_ms: 30000
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::result::{PagekitError, PagekitResult};
use crate::wait::Timeouts;

/// Site the journeys run against
pub const DEFAULT_BASE_URL: &str = "https://www.bupa.com/";

/// One browser/device the suite runs on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Short name used in reports
    pub name: String,
    /// Browser family
    #[serde(default = "default_browser_name")]
    pub browser_name: String,
    /// Emulated device, if any
    #[serde(default)]
    pub device_name: Option<String>,
    /// Whether the session is a mobile one
    #[serde(default)]
    pub mobile: bool,
    /// Viewport width in CSS pixels
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    /// Viewport height in CSS pixels
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// Run without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Explicit browser executable
    #[serde(default)]
    pub chromium_path: Option<PathBuf>,
}

fn default_browser_name() -> String {
    "chrome".to_string()
}

const fn default_viewport_width() -> u32 {
    1920
}

const fn default_viewport_height() -> u32 {
    1080
}

const fn default_headless() -> bool {
    true
}

impl Capability {
    /// Emulated mobile device
    #[must_use]
    pub fn mobile(name: &str, device_name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            browser_name: default_browser_name(),
            device_name: Some(device_name.to_string()),
            mobile: true,
            viewport_width: width,
            viewport_height: height,
            headless: true,
            chromium_path: None,
        }
    }

    /// Desktop browser window
    #[must_use]
    pub fn desktop(name: &str) -> Self {
        Self {
            name: name.to_string(),
            browser_name: default_browser_name(),
            device_name: None,
            mobile: false,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            headless: true,
            chromium_path: None,
        }
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Page every journey starts from
    pub base_url: String,
    /// Sessions allowed to run at once
    pub max_instances: usize,
    /// Stop a capability's run at its first failed journey
    pub bail: bool,
    /// Log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Where reports are written
    pub report_dir: PathBuf,
    /// Browsers and devices to run on
    pub capabilities: Vec<Capability>,
    /// Wait and settle timings
    pub timeouts: Timeouts,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_instances: 3,
            bail: false,
            log_level: "error".to_string(),
            report_dir: PathBuf::from("target/pagekit"),
            capabilities: vec![
                Capability::mobile("pixel-6", "Pixel 6", 412, 915),
                Capability::mobile("iphone-12-mini", "iPhone 12 Mini", 375, 812),
                Capability::desktop("desktop"),
            ],
            timeouts: Timeouts::default(),
        }
    }
}

impl SuiteConfig {
    /// Parse YAML and validate
    ///
    /// # Errors
    ///
    /// Returns `Yaml` for malformed input or `Config` when validation fails.
    pub fn from_yaml(yaml: &str) -> PagekitResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Returns `Yaml` if serialisation fails.
    pub fn to_yaml(&self) -> PagekitResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Load from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read, otherwise as
    /// [`SuiteConfig::from_yaml`].
    pub fn load(path: &Path) -> PagekitResult<Self> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Save to a YAML file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if serialisation or file writing fails.
    pub fn save(&self, path: &Path) -> PagekitResult<()> {
        let yaml = self.to_yaml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Check the settings are usable
    ///
    /// # Errors
    ///
    /// Returns `Config` for an empty base URL, zero instances or no
    /// capabilities.
    pub fn validate(&self) -> PagekitResult<()> {
        let reject = |message: &str| {
            Err(PagekitError::Config {
                message: message.to_string(),
            })
        };
        if self.base_url.trim().is_empty() {
            return reject("base_url must not be empty");
        }
        if self.max_instances == 0 {
            return reject("max_instances must be at least 1");
        }
        if self.capabilities.is_empty() {
            return reject("at least one capability is required");
        }
        self.timeouts.validate()
    }
}
