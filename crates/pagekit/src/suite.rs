//! Journey suite runner.
//!
//! ```text
//! SuiteRunner::run(factory)
//!   │
//!   ├── capability "pixel-6"        ─┐
//!   ├── capability "iphone-12-mini"  ├─ JoinSet, at most max_instances at once
//!   └── capability "desktop"        ─┘
//!          │
//!          └── for each journey:
//!                before:  initialize_session → navigate(base_url) → accept_cookies
//!                run:     Journey::run
//!                after:   reset_session
//! ```

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

use crate::actions::Actions;
use crate::config::{Capability, SuiteConfig};
use crate::driver::{AutomationDriver, DeviceClass, DriverFactory};
use crate::pages::BupaPage;
use crate::reporter::{FailureMode, Reporter, TestResultEntry};
use crate::result::PagekitResult;
use crate::test_data::{LinkRecord, LocationRecord, TestData};

/// Term every search journey looks for
pub const SEARCH_TERM: &str = "Bupa";

/// Primary link whose sub links the navigation journeys open
pub const ABOUT_US: &str = "about-us";

/// Sub link used by the window-handle journey
pub const LEADERSHIP: &str = "Leadership";

/// One end-to-end journey
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Journey {
    /// Search from the home page and open a result
    SearchEngine,
    /// Open a sub link first, then search and open a result
    SearchAfterSubLink,
    /// Open a sub link and a footer service site, then search
    PrimaryLinks(LinkRecord),
    /// Pick a country on the contacts page and check its website
    Location(LocationRecord),
}

impl Journey {
    /// Report name of the journey
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::SearchEngine => "Verify Bupa search engine working".to_string(),
            Self::SearchAfterSubLink => "Verify search navigating using window handles".to_string(),
            Self::PrimaryLinks(record) => {
                format!("Verify primary links of Bupa site {}", record.service_site)
            }
            Self::Location(record) => {
                format!("Verify locations of the health care {}", record.country_name)
            }
        }
    }

    /// The fixed journeys followed by one per test data record
    #[must_use]
    pub fn from_data(data: &TestData) -> Vec<Self> {
        let mut journeys = vec![Self::SearchEngine, Self::SearchAfterSubLink];
        journeys.extend(data.link_tests.iter().cloned().map(Self::PrimaryLinks));
        journeys.extend(data.location_tests.iter().cloned().map(Self::Location));
        journeys
    }

    /// Run the journey body on an already prepared page
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn run<D: AutomationDriver + ?Sized>(
        &self,
        page: &mut BupaPage<D>,
        device: DeviceClass,
    ) -> PagekitResult<()> {
        match self {
            Self::SearchEngine => {}
            Self::SearchAfterSubLink => {
                page.mouse_hover_on_link(ABOUT_US, device).await?;
                page.select_sub_link(LEADERSHIP, device).await?;
            }
            Self::PrimaryLinks(record) => {
                page.mouse_hover_on_link(ABOUT_US, device).await?;
                page.select_sub_link(&record.link_name, device).await?;
                page.click_media_links(&record.service_site, device).await?;
            }
            Self::Location(record) => {
                page.click_contact_list().await?;
                page.select_countries_from_list(&record.country_name).await?;
                page.open_location_link(&record.country_name).await?;
                return page.verify_location(&record.country_link).await;
            }
        }
        page.search_content(SEARCH_TERM, device).await?;
        page.verify_search_result(SEARCH_TERM).await?;
        let _ = page.navigate_to_first_link().await?;
        let _ = page.validate_article().await?;
        Ok(())
    }
}

/// Runs journeys on every configured capability
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    config: SuiteConfig,
    journeys: Vec<Journey>,
    filter: Option<String>,
}

impl SuiteRunner {
    /// Create a runner
    #[must_use]
    pub const fn new(config: SuiteConfig, journeys: Vec<Journey>) -> Self {
        Self {
            config,
            journeys,
            filter: None,
        }
    }

    /// Only run journeys whose name contains `filter` (case-insensitive)
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into().to_lowercase());
        self
    }

    /// Configuration in effect
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Journeys that pass the filter
    #[must_use]
    pub fn selected(&self) -> Vec<Journey> {
        self.journeys
            .iter()
            .filter(|j| {
                self.filter
                    .as_ref()
                    .map_or(true, |f| j.name().to_lowercase().contains(f))
            })
            .cloned()
            .collect()
    }

    /// Run every selected journey on every capability.
    ///
    /// Capabilities run concurrently, bounded by `max_instances`; journeys
    /// within one capability run in order on one session.
    pub async fn run<F: DriverFactory + 'static>(&self, factory: Arc<F>) -> Reporter {
        let journeys = Arc::new(self.selected());
        let slots = Arc::new(Semaphore::new(self.config.max_instances.max(1)));
        let mut set = JoinSet::new();

        for (index, capability) in self.config.capabilities.iter().cloned().enumerate() {
            let factory = Arc::clone(&factory);
            let slots = Arc::clone(&slots);
            let journeys = Arc::clone(&journeys);
            let config = self.config.clone();
            let _ = set.spawn(async move {
                let _permit = slots.acquire_owned().await;
                let entries = run_capability(factory.as_ref(), &capability, &config, &journeys).await;
                (index, entries)
            });
        }

        let mut collected = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(done) => collected.push(done),
                Err(err) => error!(error = %err, "capability worker panicked"),
            }
        }
        collected.sort_by_key(|(index, _)| *index);

        let mut reporter = Reporter::with_mode(FailureMode::CollectAll);
        for entry in collected.into_iter().flat_map(|(_, entries)| entries) {
            let _ = reporter.record(entry);
        }
        info!(summary = %reporter.summary(), "suite finished");
        reporter
    }
}

async fn run_capability<F: DriverFactory>(
    factory: &F,
    capability: &Capability,
    config: &SuiteConfig,
    journeys: &[Journey],
) -> Vec<TestResultEntry> {
    let driver = match factory.launch(capability).await {
        Ok(driver) => Arc::new(driver),
        Err(err) => {
            error!(capability = %capability.name, error = %err, "session launch failed");
            return journeys
                .iter()
                .map(|j| {
                    TestResultEntry::failed(
                        j.name(),
                        &capability.name,
                        std::time::Duration::ZERO,
                        err.to_string(),
                    )
                })
                .collect();
        }
    };

    let mut worker = Reporter::with_mode(FailureMode::from_bail(config.bail));
    let mut bailed = false;
    for journey in journeys {
        let name = journey.name();
        if bailed {
            let _ = worker.record(TestResultEntry::skipped(name, &capability.name));
            continue;
        }

        let actions = Actions::new(Arc::clone(&driver)).with_timeouts(config.timeouts);
        let recorder = actions.recorder().clone();
        let mut page = BupaPage::new(actions);
        let started = Instant::now();
        let span = info_span!("journey", name = %name, capability = %capability.name);
        let outcome = run_journey(&mut page, journey, &config.base_url)
            .instrument(span)
            .await;
        page.reset_session().await;

        let elapsed = started.elapsed();
        let entry = match outcome {
            Ok(()) => TestResultEntry::passed(&name, &capability.name, elapsed),
            Err(err) => TestResultEntry::failed(&name, &capability.name, elapsed, err.to_string()),
        };
        if worker.record(entry.with_steps(recorder.take())).is_err() {
            warn!(capability = %capability.name, journey = %name, "bailing after failure");
            bailed = true;
        }
    }
    worker.results().to_vec()
}

async fn run_journey<D: AutomationDriver + ?Sized>(
    page: &mut BupaPage<D>,
    journey: &Journey,
    base_url: &str,
) -> PagekitResult<()> {
    let device = page.initialize_session().await?;
    info!(?device, "session initialised");
    page.navigate_to_url(base_url).await?;
    page.accept_cookies().await;
    journey.run(page, device).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journey_names() {
        assert_eq!(Journey::SearchEngine.name(), "Verify Bupa search engine working");
        let record = LinkRecord {
            service_site: "bupaglobal".into(),
            link_name: "Leadership".into(),
        };
        assert_eq!(
            Journey::PrimaryLinks(record).name(),
            "Verify primary links of Bupa site bupaglobal"
        );
    }

    #[test]
    fn test_from_data_order() {
        let data = TestData::from_json(
            r#"{"BupaLinkTest":[{"BupaServiceSite":"a","LinkName":"b"}],
                "BupaLocationTest":[{"countryName":"Spain","countryLink":"sanitas"}]}"#,
        )
        .unwrap();
        let journeys = Journey::from_data(&data);
        assert_eq!(journeys.len(), 4);
        assert_eq!(journeys[0], Journey::SearchEngine);
        assert!(matches!(journeys[3], Journey::Location(_)));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let runner = SuiteRunner::new(
            SuiteConfig::default(),
            vec![Journey::SearchEngine, Journey::SearchAfterSubLink],
        )
        .with_filter("WINDOW");
        assert_eq!(runner.selected(), vec![Journey::SearchAfterSubLink]);
    }
}
