//! Journey test data loaded from JSON.
//!
//! ```json
//! {
//!   "BupaLinkTest": [{ "BupaServiceSite": "bupaglobal", "LinkName": "Leadership" }],
//!   "BupaLocationTest": [{ "countryName": "Spain", "countryLink": "sanitas" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::result::{PagekitError, PagekitResult};

/// One data-driven primary-link journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Footer service site to open (matched against link hrefs)
    #[serde(rename = "BupaServiceSite")]
    pub service_site: String,
    /// Sub link to select under "about us"
    #[serde(rename = "LinkName")]
    pub link_name: String,
}

/// One data-driven location journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Country value in the contacts drop-down
    #[serde(rename = "countryName")]
    pub country_name: String,
    /// Fragment the country website URL must contain
    #[serde(rename = "countryLink")]
    pub country_link: String,
}

/// Test data document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestData {
    /// Primary-link journeys
    #[serde(rename = "BupaLinkTest", default)]
    pub link_tests: Vec<LinkRecord>,
    /// Location journeys
    #[serde(rename = "BupaLocationTest", default)]
    pub location_tests: Vec<LocationRecord>,
}

impl TestData {
    /// Parse a JSON document
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed input and `TestData` for records with
    /// empty fields.
    pub fn from_json(json: &str) -> PagekitResult<Self> {
        let data: Self = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Load and parse a JSON file
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read, otherwise as
    /// [`TestData::from_json`].
    pub fn load(path: impl AsRef<Path>) -> PagekitResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Reject records with empty fields
    ///
    /// # Errors
    ///
    /// Returns `TestData` naming the first offending record.
    pub fn validate(&self) -> PagekitResult<()> {
        if let Some((i, _)) = self
            .link_tests
            .iter()
            .enumerate()
            .find(|(_, r)| r.service_site.trim().is_empty() || r.link_name.trim().is_empty())
        {
            return Err(PagekitError::TestData {
                message: format!("BupaLinkTest[{i}] has an empty field"),
            });
        }
        if let Some((i, _)) = self
            .location_tests
            .iter()
            .enumerate()
            .find(|(_, r)| r.country_name.trim().is_empty() || r.country_link.trim().is_empty())
        {
            return Err(PagekitError::TestData {
                message: format!("BupaLocationTest[{i}] has an empty field"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "BupaLinkTest": [
            { "BupaServiceSite": "bupaglobal", "LinkName": "Leadership" },
            { "BupaServiceSite": "bupa.co.uk", "LinkName": "Governance" }
        ]
    }"#;

    #[test]
    fn test_parse_links_without_locations() {
        let data = TestData::from_json(SAMPLE).unwrap();
        assert_eq!(data.link_tests.len(), 2);
        assert_eq!(data.link_tests[1].link_name, "Governance");
        assert!(data.location_tests.is_empty());
    }

    #[test]
    fn test_empty_field_rejected() {
        let err = TestData::from_json(r#"{"BupaLinkTest":[{"BupaServiceSite":"","LinkName":"x"}]}"#)
            .unwrap_err();
        assert!(matches!(err, PagekitError::TestData { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_data.json");
        std::fs::write(
            &path,
            r#"{"BupaLocationTest":[{"countryName":"Spain","countryLink":"sanitas"}]}"#,
        )
        .unwrap();
        let data = TestData::load(&path).unwrap();
        assert_eq!(data.location_tests[0].country_link, "sanitas");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TestData::from_json("{"),
            Err(PagekitError::Json(_))
        ));
    }
}
