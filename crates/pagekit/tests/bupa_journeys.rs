//! End-to-end journeys against a scripted Bupa site.
//!
//! The site is a `MockDriver` populated with every element the journeys
//! touch, so the whole stack from locator strings down to driver calls runs
//! without a browser.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use pagekit::pages::bupa::locators::*;
use pagekit::suite::{ABOUT_US, LEADERSHIP, SEARCH_TERM};
use pagekit::{
    locator, Actions, BupaPage, Capability, DeviceClass, DriverFactory, Journey, LinkRecord,
    LocationRecord, MockDriver, MockEffect, MockElement, PagekitError, PagekitResult,
    StepStatus, SuiteConfig, SuiteRunner, TestData, TestStatus, Timeouts,
};
use std::sync::Arc;

// ============================================================================
// Scripted site
// ============================================================================

fn sel(locator: &str) -> String {
    locator::parse(locator).expect("page locators parse").selector
}

fn fast_timeouts() -> Timeouts {
    Timeouts {
        element_ms: 200,
        hover_ms: 200,
        displayed_ms: 200,
        probe_ms: 200,
        ..Timeouts::without_settle()
    }
}

fn article_window() -> MockEffect {
    MockEffect::OpenWindow {
        title: "Our strategy | Bupa".into(),
        url: "https://www.bupa.com/our-strategy".into(),
    }
}

/// Home page, menus, search results, footer and contacts page
fn bupa_site(mobile: bool) -> MockDriver {
    let driver = if mobile {
        MockDriver::new().mobile()
    } else {
        MockDriver::new()
    };
    driver
        .with_element(sel(ACCEPT_COOKIES), MockElement::with_text("Accept"))
        .with_element(sel(COMPANY_LOGO), MockElement::default())
        // desktop search
        .with_element(sel(SEARCH_BUTTON), MockElement::default())
        .with_element(sel(SEARCH_TEXT_BOX), MockElement::default())
        .with_element(sel(RUN_SEARCH), MockElement::default())
        // mobile menu: the search box only shows once the menu is open
        .with_element(
            sel(MOBILE_MENU_BAR),
            MockElement::default().on_click(MockEffect::Reveal(sel(SEARCH_ELEMENT_STATE))),
        )
        .with_element(sel(MOBILE_SEARCH_BOX), MockElement::default().hidden())
        .with_element(sel(RUN_MOBILE_SEARCH), MockElement::default())
        // results
        .with_element(
            sel(RESULT_SUMMARY),
            MockElement::with_text("Results 1 - 10 of 120 for Bupa"),
        )
        .with_element(sel(RESULT_LINKS), MockElement::with_text("www.bupa.com/news"))
        .with_element(
            sel(RESULT_LINKS),
            MockElement::with_text("www.bupa.com/our-strategy").on_click(article_window()),
        )
        .with_element(sel(LINK_HEADER), MockElement::with_text("Our strategy"))
        // primary navigation
        .with_element(sel(&primary_link(ABOUT_US, false)), MockElement::with_text("About us"))
        .with_element(sel(&primary_link(ABOUT_US, true)), MockElement::with_text("About us"))
        .with_element(sel(SUB_LINKS), MockElement::with_text("Leadership"))
        .with_element(sel(SUB_LINKS), MockElement::with_text("Governance"))
        .with_element(sel(SUB_LINKS_IN_MOBILE), MockElement::with_text("Leadership"))
        .with_element(sel(SUB_LINKS_IN_MOBILE), MockElement::with_text("careers"))
        // footer
        .with_element(
            sel(SERVICE_LINKS),
            MockElement::default().attr("href", "https://www.bupaglobal.com/"),
        )
        .with_element(
            sel(SERVICE_LINKS),
            MockElement::default().attr("href", "https://www.bupa.co.uk/"),
        )
        .with_element(
            sel(SERVICE_LINKS_IN_MOBILE),
            MockElement::default().attr("href", "https://www.bupaglobal.com/"),
        )
        .with_element(
            sel(SERVICE_LINKS_IN_MOBILE),
            MockElement::default().attr("href", "https://www.bupa.co.uk/"),
        )
        // contacts
        .with_element(sel(CONTACTS_LIST), MockElement::with_text("Websites"))
        .with_element(
            sel(COUNTRIES_DROP_DOWN),
            MockElement::default()
                .option("Spain", "Spain")
                .option("Chile", "Chile"),
        )
        .with_element(
            sel(&location_link("Spain")),
            MockElement::with_text("Visit website").on_click(MockEffect::OpenWindow {
                title: "Sanitas".into(),
                url: "https://www.sanitas.es/".into(),
            }),
        )
}

/// Page prepared the way the suite's before-hook does
async fn open_home(driver: MockDriver) -> (Arc<MockDriver>, BupaPage<MockDriver>, DeviceClass) {
    let driver = Arc::new(driver);
    let page = BupaPage::new(Actions::new(Arc::clone(&driver)).with_timeouts(fast_timeouts()));
    let device = page.initialize_session().await.unwrap();
    page.navigate_to_url("https://www.bupa.com/").await.unwrap();
    page.accept_cookies().await;
    (driver, page, device)
}

// ============================================================================
// Search journeys
// ============================================================================

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_desktop_search_opens_article() {
        let (driver, mut page, device) = open_home(bupa_site(false)).await;
        assert_eq!(device, DeviceClass::Desktop);

        Journey::SearchEngine.run(&mut page, device).await.unwrap();

        assert_eq!(page.captured_result(), Some("www.bupa.com/our-strategy"));
        assert!(driver.was_called(&format!("set_value:{}@0={SEARCH_TERM}", sel(SEARCH_TEXT_BOX))));
        assert!(driver.was_called("maximize_window"));
        assert!(!driver.was_called(&format!("click:{}", sel(MOBILE_MENU_BAR))));
        assert!(page.actions().recorder().failures().is_empty());
    }

    #[tokio::test]
    async fn test_validate_article_reads_new_window_header() {
        let (_driver, mut page, device) = open_home(bupa_site(false)).await;
        page.search_content(SEARCH_TERM, device).await.unwrap();
        page.verify_search_result(SEARCH_TERM).await.unwrap();
        let _ = page.navigate_to_first_link().await.unwrap();

        assert_eq!(page.validate_article().await.unwrap(), "Our strategy");
        assert_eq!(page.return_page_title().await.unwrap(), "Our strategy | Bupa");
    }

    #[tokio::test]
    async fn test_mobile_search_uses_hamburger_menu() {
        let (driver, mut page, device) = open_home(bupa_site(true)).await;
        assert_eq!(device, DeviceClass::Mobile);

        Journey::SearchEngine.run(&mut page, device).await.unwrap();

        assert_eq!(driver.call_count(&format!("click:{}@0", sel(MOBILE_MENU_BAR))), 1);
        assert_eq!(driver.call_count("reload"), 0);
        assert!(driver.was_called(&format!("set_value:{}@0=Bupa", sel(MOBILE_SEARCH_BOX))));
        assert!(!driver.was_called(&format!("click:{}", sel(SEARCH_BUTTON))));
        assert!(!driver.was_called("maximize_window"));
    }

    #[tokio::test]
    async fn test_mobile_menu_retries_with_reloads() {
        // Menu never opens: five reloads, then the search goes ahead anyway
        let driver = MockDriver::new()
            .mobile()
            .with_element(sel(MOBILE_MENU_BAR), MockElement::default())
            .with_element(sel(MOBILE_SEARCH_BOX), MockElement::default().hidden())
            .with_element(sel(RUN_MOBILE_SEARCH), MockElement::default());
        let (driver, page, device) = open_home(driver).await;

        page.search_content(SEARCH_TERM, device).await.unwrap();

        assert_eq!(driver.call_count("reload"), 5);
        assert_eq!(driver.call_count(&format!("click:{}@0", sel(MOBILE_MENU_BAR))), 6);
        assert!(driver.was_called(&format!("click:{}@0", sel(RUN_MOBILE_SEARCH))));
    }

    #[tokio::test]
    async fn test_summary_without_term_fails_assertion() {
        let driver = bupa_site(false);
        driver.remove_elements(&sel(RESULT_SUMMARY));
        driver.add_element(sel(RESULT_SUMMARY), MockElement::with_text("No results"));
        let (_driver, page, device) = open_home(driver).await;
        page.search_content(SEARCH_TERM, device).await.unwrap();

        let err = page.verify_search_result(SEARCH_TERM).await.unwrap_err();

        assert!(matches!(err, PagekitError::AssertionFailed { .. }));
        let steps = page.actions().recorder().steps();
        let last = steps.last().unwrap();
        assert_eq!(last.status, StepStatus::Failed);
        assert!(last.message.contains("Bupa"));
    }

    #[tokio::test]
    async fn test_single_result_cannot_open_second_link() {
        let driver = bupa_site(false);
        driver.remove_elements(&sel(RESULT_LINKS));
        driver.add_element(sel(RESULT_LINKS), MockElement::with_text("www.bupa.com"));
        let (_driver, mut page, _device) = open_home(driver).await;

        let err = page.navigate_to_first_link().await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(page.captured_result(), None);
    }
}

// ============================================================================
// Navigation journeys
// ============================================================================

mod navigation_tests {
    use super::*;

    #[tokio::test]
    async fn test_desktop_primary_links_hover_and_footer() {
        let (driver, mut page, device) = open_home(bupa_site(false)).await;
        let record = LinkRecord {
            service_site: "BupaGlobal".into(),
            link_name: LEADERSHIP.into(),
        };

        Journey::PrimaryLinks(record).run(&mut page, device).await.unwrap();

        assert!(driver.was_called(&format!("move_to:{}@0", sel(&primary_link(ABOUT_US, false)))));
        assert!(driver.was_called(&format!("click:{}@0", sel(SUB_LINKS))));
        assert!(driver.was_called(&format!("click:{}@0", sel(SERVICE_LINKS))));
        assert!(!driver.was_called(&format!("click:{}@1", sel(SERVICE_LINKS))));
    }

    #[tokio::test]
    async fn test_mobile_governance_opens_careers() {
        let (driver, mut page, device) = open_home(bupa_site(true)).await;
        let record = LinkRecord {
            service_site: "bupa.co.uk".into(),
            link_name: "Governance".into(),
        };

        Journey::PrimaryLinks(record).run(&mut page, device).await.unwrap();

        assert!(driver.was_called(&format!("click:{}@0", sel(&primary_link(ABOUT_US, true)))));
        assert!(driver.was_called(&format!("click:{}@1", sel(SUB_LINKS_IN_MOBILE))));
        assert!(driver.was_called(&format!("scroll_into_view:{}@0", sel(SERVICE_LINKS_IN_MOBILE))));
        assert!(driver.was_called(&format!("click:{}@1", sel(SERVICE_LINKS_IN_MOBILE))));
    }

    #[tokio::test]
    async fn test_unknown_sub_link_stops_journey() {
        let (driver, mut page, device) = open_home(bupa_site(false)).await;
        let record = LinkRecord {
            service_site: "bupaglobal".into(),
            link_name: "Investors".into(),
        };

        let err = Journey::PrimaryLinks(record)
            .run(&mut page, device)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(!driver.was_called(&format!("find_elements:{}", sel(SERVICE_LINKS))));
    }

    #[tokio::test]
    async fn test_menu_hover_then_item() {
        let driver = bupa_site(false)
            .with_element(sel(OUR_BUPA_MENU), MockElement::with_text("Our Bupa"))
            .with_element(sel(OUR_STRATEGY_MENU_ITEM), MockElement::with_text("Our strategy"));
        let (driver, page, _device) = open_home(driver).await;

        page.verify_home_page().await.unwrap();
        page.mouse_hover_on_menu("Our Bupa".parse().unwrap()).await.unwrap();
        page.click_on_menu_item("our strategy".parse().unwrap()).await.unwrap();

        let history = driver.history();
        let hover = history
            .iter()
            .position(|c| c == &format!("move_to:{}@0", sel(OUR_BUPA_MENU)))
            .unwrap();
        let click = history
            .iter()
            .position(|c| c == &format!("click:{}@0", sel(OUR_STRATEGY_MENU_ITEM)))
            .unwrap();
        assert!(hover < click);
    }

    #[tokio::test]
    async fn test_social_media_links_collects_hrefs() {
        let driver = bupa_site(false)
            .with_element(
                sel(SOCIAL_MEDIA_LINKS),
                MockElement::default().attr("href", "https://twitter.com/bupa"),
            )
            .with_element(sel(SOCIAL_MEDIA_LINKS), MockElement::default());
        let (_driver, page, _device) = open_home(driver).await;

        assert_eq!(
            page.social_media_links().await.unwrap(),
            vec!["https://twitter.com/bupa".to_string(), String::new()]
        );
    }
}

// ============================================================================
// Location journeys
// ============================================================================

mod location_tests {
    use super::*;

    fn spain(link: &str) -> Journey {
        Journey::Location(LocationRecord {
            country_name: "Spain".into(),
            country_link: link.into(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_opens_country_website() {
        let (driver, mut page, device) = open_home(bupa_site(false)).await;

        spain("sanitas").run(&mut page, device).await.unwrap();

        assert_eq!(driver.element(&sel(COUNTRIES_DROP_DOWN), 0).unwrap().selected, Some(0));
        assert!(driver.was_called("current_url"));
        assert!(!driver.was_called(&format!("click:{}", sel(SEARCH_BUTTON))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_with_wrong_link_fails() {
        let (_driver, mut page, device) = open_home(bupa_site(false)).await;

        let err = spain("bupa.cl").run(&mut page, device).await.unwrap_err();

        assert!(matches!(err, PagekitError::AssertionFailed { .. }));
        assert_eq!(page.actions().recorder().failures().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_country_is_not_selected() {
        let (_driver, page, _device) = open_home(bupa_site(false)).await;
        page.click_contact_list().await.unwrap();

        assert!(page.select_countries_from_list("Peru").await.is_err());
    }
}

// ============================================================================
// Suite runner
// ============================================================================

mod suite_tests {
    use super::*;

    /// Scripted site per capability, optionally without the search toggle
    struct SiteFactory {
        broken_search: bool,
    }

    #[async_trait]
    impl DriverFactory for SiteFactory {
        type Driver = MockDriver;

        async fn launch(&self, capability: &Capability) -> PagekitResult<MockDriver> {
            let driver = bupa_site(capability.mobile);
            if self.broken_search {
                driver.remove_elements(&sel(SEARCH_BUTTON));
            }
            Ok(driver)
        }
    }

    struct NoBrowser;

    #[async_trait]
    impl DriverFactory for NoBrowser {
        type Driver = MockDriver;

        async fn launch(&self, _capability: &Capability) -> PagekitResult<MockDriver> {
            Err(PagekitError::BrowserLaunch {
                message: "chromium not installed".into(),
            })
        }
    }

    fn config(capabilities: Vec<Capability>, bail: bool) -> SuiteConfig {
        SuiteConfig {
            capabilities,
            bail,
            max_instances: 2,
            timeouts: fast_timeouts(),
            ..SuiteConfig::default()
        }
    }

    fn sample_data() -> TestData {
        TestData::from_json(
            r#"{
                "BupaLinkTest": [
                    { "BupaServiceSite": "bupaglobal", "LinkName": "Leadership" },
                    { "BupaServiceSite": "bupa.co.uk", "LinkName": "Governance" }
                ],
                "BupaLocationTest": [{ "countryName": "Spain", "countryLink": "sanitas" }]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_journey_passes_on_every_capability() {
        let journeys = Journey::from_data(&sample_data());
        let runner = SuiteRunner::new(
            config(
                vec![
                    Capability::mobile("pixel-6", "Pixel 6", 412, 915),
                    Capability::desktop("desktop"),
                ],
                false,
            ),
            journeys.clone(),
        );

        let reporter = runner.run(Arc::new(SiteFactory { broken_search: false })).await;

        assert_eq!(reporter.total_count(), journeys.len() * 2);
        assert!(reporter.all_passed(), "{:?}", reporter.failures());
        assert_eq!(reporter.results()[0].capability, "pixel-6");
        assert_eq!(reporter.results()[journeys.len()].capability, "desktop");
        assert!(reporter.results().iter().all(|r| !r.steps.is_empty()));
        assert!(reporter.to_json().unwrap().contains("Verify Bupa search engine working"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_limits_journeys() {
        let runner = SuiteRunner::new(
            config(vec![Capability::desktop("desktop")], false),
            Journey::from_data(&sample_data()),
        )
        .with_filter("locations");

        let reporter = runner.run(Arc::new(SiteFactory { broken_search: false })).await;

        assert_eq!(reporter.total_count(), 1);
        assert_eq!(
            reporter.results()[0].name,
            "Verify locations of the health care Spain"
        );
    }

    #[tokio::test]
    async fn test_launch_failure_fails_every_journey() {
        let runner = SuiteRunner::new(
            config(vec![Capability::desktop("desktop")], false),
            vec![Journey::SearchEngine, Journey::SearchAfterSubLink],
        );

        let reporter = runner.run(Arc::new(NoBrowser)).await;

        assert_eq!(reporter.failed_count(), 2);
        assert!(reporter.results().iter().all(|r| r
            .error
            .as_deref()
            .is_some_and(|e| e.contains("chromium not installed"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bail_skips_after_first_failure() {
        let runner = SuiteRunner::new(
            config(vec![Capability::desktop("desktop")], true),
            vec![Journey::SearchEngine, Journey::SearchAfterSubLink],
        );

        let reporter = runner.run(Arc::new(SiteFactory { broken_search: true })).await;

        let statuses: Vec<TestStatus> = reporter.results().iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![TestStatus::Failed, TestStatus::Skipped]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_bail_every_journey_runs() {
        let runner = SuiteRunner::new(
            config(vec![Capability::desktop("desktop")], false),
            vec![Journey::SearchEngine, Journey::SearchAfterSubLink],
        );

        let reporter = runner.run(Arc::new(SiteFactory { broken_search: true })).await;

        assert_eq!(reporter.failed_count(), 2);
        let failed_steps = &reporter.results()[0].steps;
        assert!(failed_steps
            .iter()
            .any(|s| s.status == StepStatus::Failed && s.message.contains("search button")));
    }
}
