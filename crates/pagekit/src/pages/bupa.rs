//! Bupa corporate site page object.
//!
//! Desktop sessions navigate through hover menus; mobile sessions go through
//! the hamburger menu, which sometimes fails to open on the first tap and is
//! retried after a reload.

use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::actions::Actions;
use crate::assertion::{Assertion, AssertionResult};
use crate::driver::{AutomationDriver, DeviceClass};
use crate::page_object::PageObject;
use crate::result::{PagekitError, PagekitResult};

/// Locator table
pub mod locators {
    /// Company logo in the header
    pub const COMPANY_LOGO: &str =
        "bupa company logo#css=figure[id='logo'] img[src*='bupa-company-logo']";
    /// Sub links under "Our Bupa" (desktop)
    pub const SUB_LINKS: &str =
        "bupa sub links#css=ul[id='section-our-bupa-level2'] li[id*='level2'] > a > span";
    /// Sub links under "Our Bupa" (mobile menu)
    pub const SUB_LINKS_IN_MOBILE: &str =
        "bupa sub links in mobile#css=ul[class='mm-listview'] li[id*='level2'] > a > span";
    /// Hamburger menu button
    pub const MOBILE_MENU_BAR: &str = "mobile menu bar#xpath=//a[@href=\"#mmenu\"]";
    /// Search box inside the mobile menu
    pub const MOBILE_SEARCH_BOX: &str = "mobile search box#css=input[id=mobiSearchTextbox]";
    /// Search trigger inside the mobile menu
    pub const RUN_MOBILE_SEARCH: &str =
        "mobile search button#css=a[class=search_button_trigger]";
    /// Header search toggle
    pub const SEARCH_BUTTON: &str =
        "search button#xpath=//nav[contains(@class,'nav')]//..//a[@class='searchButton']";
    /// Header search box
    pub const SEARCH_TEXT_BOX: &str = "search text box#css=input[id=searchTextbox]";
    /// Header search submit
    pub const RUN_SEARCH: &str = "run search#css=input[id=searchButton]";
    /// Search result summary
    pub const RESULT_SUMMARY: &str = "result summary#css=div[id=result-summary]";
    /// Search result URLs
    pub const RESULT_LINKS: &str = "result links#css=span[class=resultURL]";
    /// Landing page title
    pub const LINK_HEADER: &str = "link header#css=div[class=banner-landing-page-title] > h1";
    /// Footer share icons
    pub const SOCIAL_MEDIA_LINKS: &str =
        "social media links#css=footer[id='footerwrapper'] div[class='share-icons'] a";
    /// Footer service links (desktop)
    pub const SERVICE_LINKS: &str = "service links#css=section[class='footer-box-bottom'] a";
    /// Footer service links (mobile)
    pub const SERVICE_LINKS_IN_MOBILE: &str =
        "service links in mobile#css=div[class='footer-bottom'] a";
    /// Cookie banner accept button
    pub const ACCEPT_COOKIES: &str = "accept cookies button#css=button[id='cc-cookieAgree']";
    /// "Our Bupa" top menu
    pub const OUR_BUPA_MENU: &str =
        "our bupa menu#css=li[id='nav-our-bupa-level1'] > a[href='/our-bupa']";
    /// "Our strategy" menu item
    pub const OUR_STRATEGY_MENU_ITEM: &str =
        "our strategy menu item#css=li[role='menuitem'] a[href*='our-strategy']";
    /// "What we do" top menu
    pub const WHAT_WE_DO_MENU: &str =
        "what we do menu#css=li[id='nav-what-we-do-level1'] > a[href*='/what-we-do']";
    /// "Our markets" menu item
    pub const OUR_MARKETS_MENU_ITEM: &str =
        "our markets menu item#xpath=//li[@role='menuitem']//a[contains(@href,'our-markets')]";
    /// Link to the contacts page
    pub const CONTACTS_LIST: &str = "contacts list#css=a[class='websites']";
    /// Country selector on the contacts page
    pub const COUNTRIES_DROP_DOWN: &str = "countries drop down box#css=select[id='select-box']";
    /// Element whose visibility shows the mobile menu is open
    pub const SEARCH_ELEMENT_STATE: &str =
        "search element state#css=input[id=mobiSearchTextbox]";

    /// Website button for a country tab
    #[must_use]
    pub fn location_link(country: &str) -> String {
        format!(
            "location link button#css=div[id='tab-{country}'] > div[class='website-button'] > a"
        )
    }

    /// Primary navigation link whose href contains `link`
    #[must_use]
    pub fn primary_link(link: &str, mobile: bool) -> String {
        if mobile {
            format!(
                "Bupa primary link#xpath=(//ul[@id='mobi-section-Homepage-level1']//li//a[contains(@href,'{link}')])[1]"
            )
        } else {
            format!("Bupa primary link#css=ul[id='section-Homepage-level1'] > li > a[href*='{link}']")
        }
    }
}

use locators::*;

/// Attempts at opening the mobile menu before carrying on regardless
pub const MOBILE_MENU_ATTEMPTS: usize = 5;

fn normalise(option: &str) -> String {
    option
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn unknown_option(option: &str) -> PagekitError {
    PagekitError::InvalidOption {
        option: option.to_string(),
        message: "mentioned option is not present in the menu".to_string(),
    }
}

/// Top-level hover menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    /// "Our Bupa"
    OurBupa,
    /// "What we do"
    WhatWeDo,
}

impl Menu {
    const fn locator(self) -> &'static str {
        match self {
            Self::OurBupa => OUR_BUPA_MENU,
            Self::WhatWeDo => WHAT_WE_DO_MENU,
        }
    }
}

impl FromStr for Menu {
    type Err = PagekitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "ourbupa" => Ok(Self::OurBupa),
            "whatwedo" => Ok(Self::WhatWeDo),
            _ => Err(unknown_option(s)),
        }
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OurBupa => "Our Bupa",
            Self::WhatWeDo => "What we do",
        })
    }
}

/// Items under the hover menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// "Our strategy"
    OurStrategy,
    /// "Our markets"
    OurMarkets,
}

impl MenuItem {
    const fn locator(self) -> &'static str {
        match self {
            Self::OurStrategy => OUR_STRATEGY_MENU_ITEM,
            Self::OurMarkets => OUR_MARKETS_MENU_ITEM,
        }
    }
}

impl FromStr for MenuItem {
    type Err = PagekitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "ourstrategy" => Ok(Self::OurStrategy),
            "ourmarkets" => Ok(Self::OurMarkets),
            _ => Err(unknown_option(s)),
        }
    }
}

/// Bupa site page object
#[derive(Debug)]
pub struct BupaPage<D: AutomationDriver + ?Sized> {
    actions: Actions<D>,
    captured_result: Option<String>,
}

impl<D: AutomationDriver + ?Sized> BupaPage<D> {
    /// Create a page over the given actions
    #[must_use]
    pub const fn new(actions: Actions<D>) -> Self {
        Self {
            actions,
            captured_result: None,
        }
    }

    /// Underlying actions
    #[must_use]
    pub const fn actions(&self) -> &Actions<D> {
        &self.actions
    }

    /// Result text captured by [`BupaPage::navigate_to_first_link`]
    #[must_use]
    pub fn captured_result(&self) -> Option<&str> {
        self.captured_result.as_deref()
    }

    fn check(&self, assertion: AssertionResult, passed: &str) -> PagekitResult<()> {
        if assertion.passed {
            self.actions.recorder().passed(passed);
        } else {
            self.actions.recorder().failed(assertion.message.clone());
        }
        assertion.into_result()
    }

    /// Prepare the session; see [`Actions::initialize_session`]
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub async fn initialize_session(&self) -> PagekitResult<DeviceClass> {
        self.actions.initialize_session().await
    }

    /// Best-effort teardown; see [`Actions::reset_session`]
    pub async fn reset_session(&self) {
        self.actions.reset_session().await;
    }

    /// Hover over a top-level menu
    ///
    /// # Errors
    ///
    /// Returns the hover error.
    pub async fn mouse_hover_on_menu(&self, menu: Menu) -> PagekitResult<()> {
        self.actions.mouse_hover(menu.locator()).await
    }

    /// Click a menu item
    ///
    /// # Errors
    ///
    /// Returns the click error.
    pub async fn click_on_menu_item(&self, item: MenuItem) -> PagekitResult<()> {
        self.actions.click_on(item.locator()).await
    }

    /// Require the company logo to be displayed
    ///
    /// # Errors
    ///
    /// Returns `NotDisplayed` or the lookup error.
    pub async fn verify_home_page(&self) -> PagekitResult<()> {
        self.actions
            .verify_element_is_displayed(COMPANY_LOGO)
            .await
            .map(|_| ())
    }

    /// Open the contacts page
    ///
    /// # Errors
    ///
    /// Returns the click error.
    pub async fn click_contact_list(&self) -> PagekitResult<()> {
        self.actions.click_on(CONTACTS_LIST).await
    }

    /// Dismiss the cookie banner if it shows up
    pub async fn accept_cookies(&self) {
        if let Err(err) = self.actions.click_on(ACCEPT_COOKIES).await {
            warn!(error = %err, "Cookies confirmation did not appear");
        }
    }

    /// Choose a country on the contacts page
    ///
    /// # Errors
    ///
    /// Returns the selection error.
    pub async fn select_countries_from_list(&self, country: &str) -> PagekitResult<()> {
        self.actions
            .select_dropdown_option(COUNTRIES_DROP_DOWN, "value", country)
            .await?;
        self.actions.wait_in_seconds(0.5).await;
        Ok(())
    }

    /// Open the website link of a country tab
    ///
    /// # Errors
    ///
    /// Returns the click error.
    pub async fn open_location_link(&self, country: &str) -> PagekitResult<()> {
        self.actions.click_on(&location_link(country)).await
    }

    /// Tap the hamburger menu until the menu content shows, reloading the
    /// page between attempts.
    async fn open_mobile_menu(&self) -> PagekitResult<()> {
        self.actions.click_on(MOBILE_MENU_BAR).await?;
        for attempt in 1..=MOBILE_MENU_ATTEMPTS {
            if self.actions.return_element_status(SEARCH_ELEMENT_STATE).await {
                return Ok(());
            }
            warn!(attempt, "mobile menu did not open, reloading");
            self.actions.reload_page().await?;
            self.actions.click_on(MOBILE_MENU_BAR).await?;
        }
        Ok(())
    }

    /// Bring up the sub links of a primary navigation link
    ///
    /// # Errors
    ///
    /// Returns the hover, click or reload error.
    pub async fn mouse_hover_on_link(&self, link: &str, device: DeviceClass) -> PagekitResult<()> {
        let locator = primary_link(link, device.is_mobile());
        if device.is_mobile() {
            self.open_mobile_menu().await?;
            self.actions.click_on(&locator).await
        } else {
            self.actions.mouse_hover(&locator).await
        }
    }

    /// Click the sub link whose text matches `name`.
    ///
    /// The mobile menu has no governance entry, so careers is used instead.
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when no sub link matches.
    pub async fn select_sub_link(&self, name: &str, device: DeviceClass) -> PagekitResult<()> {
        if device.is_mobile() {
            let name = if name.to_lowercase().contains("governance") {
                "careers"
            } else {
                name
            };
            self.actions
                .select_data_from_list(SUB_LINKS_IN_MOBILE, name)
                .await
        } else {
            self.actions.select_data_from_list(SUB_LINKS, name).await
        }
    }

    /// Title of the current page
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub async fn return_page_title(&self) -> PagekitResult<String> {
        self.actions.get_page_title().await
    }

    /// Run a site search
    ///
    /// # Errors
    ///
    /// Returns the first failing action's error.
    pub async fn search_content(&self, content: &str, device: DeviceClass) -> PagekitResult<()> {
        if device.is_mobile() {
            self.open_mobile_menu().await?;
            self.actions.type_in(MOBILE_SEARCH_BOX, content).await?;
            self.actions.click_on(RUN_MOBILE_SEARCH).await
        } else {
            self.actions.click_on(SEARCH_BUTTON).await?;
            self.actions.type_in(SEARCH_TEXT_BOX, content).await?;
            self.actions.click_on(RUN_SEARCH).await
        }
    }

    /// Require the summary and result links to mention `content`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` when either does not.
    pub async fn verify_search_result(&self, content: &str) -> PagekitResult<()> {
        let summaries = self.actions.find_web_elements(RESULT_SUMMARY).await?;
        self.check(
            Assertion::not_empty(&summaries, "result summary"),
            "result summary is shown",
        )?;
        let summary = self.actions.get_all_text(RESULT_SUMMARY).await?.join(",");
        self.check(
            Assertion::contains(&summary, content),
            &format!("result summary mentions '{content}'"),
        )?;
        let links = self.actions.get_all_text(RESULT_LINKS).await?.join(",");
        self.check(
            Assertion::contains_ignore_case(&links, content),
            &format!("result links mention '{content}'"),
        )
    }

    /// Open the second search result and remember its text
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when there are fewer than two results.
    pub async fn navigate_to_first_link(&mut self) -> PagekitResult<String> {
        let text = self.actions.click_element_at(RESULT_LINKS, 1).await?;
        info!(result = %text, "result from the 1st link is captured");
        self.captured_result = Some(text.clone());
        Ok(text)
    }

    /// Open `url` in the current window
    ///
    /// # Errors
    ///
    /// Returns the driver error.
    pub async fn navigate_to_url(&self, url: &str) -> PagekitResult<()> {
        self.actions.navigate_to_url(url).await
    }

    /// Switch to the article window and return its header
    ///
    /// # Errors
    ///
    /// Returns the window switch or text error.
    pub async fn validate_article(&self) -> PagekitResult<String> {
        let _ = self.actions.switch_to_new_window().await?;
        let header = self.actions.get_text(LINK_HEADER).await?;
        info!(%header, "Relevant article is displayed");
        Ok(header)
    }

    /// Switch to the new window and require its URL to contain `country_link`
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` when the URL does not match.
    pub async fn verify_location(&self, country_link: &str) -> PagekitResult<()> {
        let _ = self.actions.switch_to_new_window().await?;
        let url = self.actions.current_url().await?;
        self.check(
            Assertion::contains(&url, country_link),
            &format!("location url contains '{country_link}'"),
        )
    }

    /// Click the footer service link pointing at `site`
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when no footer link points at `site`.
    pub async fn click_media_links(&self, site: &str, device: DeviceClass) -> PagekitResult<()> {
        let locator = if device.is_mobile() {
            SERVICE_LINKS_IN_MOBILE
        } else {
            SERVICE_LINKS
        };
        self.actions
            .click_first_with_attribute(locator, "href", &site.to_lowercase(), device.is_mobile())
            .await
    }

    /// Hrefs of the footer share icons
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` when the footer has no share icons.
    pub async fn social_media_links(&self) -> PagekitResult<Vec<String>> {
        self.actions
            .get_all_attribute_values(SOCIAL_MEDIA_LINKS, "href")
            .await
    }
}

impl<D: AutomationDriver + ?Sized> PageObject for BupaPage<D> {
    fn url_pattern(&self) -> &str {
        "/"
    }

    fn page_name(&self) -> &str {
        "Bupa"
    }

    fn locators(&self) -> Vec<(&'static str, &'static str)> {
        static_locators()
    }
}

/// Every fixed locator of the page, for validation without a driver
#[must_use]
pub fn static_locators() -> Vec<(&'static str, &'static str)> {
    vec![
        ("company_logo", COMPANY_LOGO),
        ("sub_links", SUB_LINKS),
        ("sub_links_in_mobile", SUB_LINKS_IN_MOBILE),
        ("mobile_menu_bar", MOBILE_MENU_BAR),
        ("mobile_search_box", MOBILE_SEARCH_BOX),
        ("run_mobile_search", RUN_MOBILE_SEARCH),
        ("search_button", SEARCH_BUTTON),
        ("search_text_box", SEARCH_TEXT_BOX),
        ("run_search", RUN_SEARCH),
        ("result_summary", RESULT_SUMMARY),
        ("result_links", RESULT_LINKS),
        ("link_header", LINK_HEADER),
        ("social_media_links", SOCIAL_MEDIA_LINKS),
        ("service_links", SERVICE_LINKS),
        ("service_links_in_mobile", SERVICE_LINKS_IN_MOBILE),
        ("accept_cookies", ACCEPT_COOKIES),
        ("our_bupa_menu", OUR_BUPA_MENU),
        ("our_strategy_menu_item", OUR_STRATEGY_MENU_ITEM),
        ("what_we_do_menu", WHAT_WE_DO_MENU),
        ("our_markets_menu_item", OUR_MARKETS_MENU_ITEM),
        ("contacts_list", CONTACTS_LIST),
        ("countries_drop_down", COUNTRIES_DROP_DOWN),
        ("search_element_state", SEARCH_ELEMENT_STATE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::locator::{parse, Strategy};
    use std::sync::Arc;

    mod locator_tests {
        use super::*;

        #[test]
        fn test_every_static_locator_is_valid() {
            let page = BupaPage::new(Actions::new(Arc::new(MockDriver::new())));
            let parsed = page.validate_locators().unwrap();
            assert_eq!(parsed.len(), static_locators().len());
        }

        #[test]
        fn test_mobile_menu_selector_keeps_hash() {
            let parsed = parse(MOBILE_MENU_BAR).unwrap();
            assert_eq!(parsed.strategy().unwrap(), Strategy::XPath);
            assert_eq!(parsed.selector, "//a[@href=\"#mmenu\"]");
        }

        #[test]
        fn test_dynamic_locators() {
            let desktop = parse(&primary_link("about-us", false)).unwrap();
            assert_eq!(desktop.selector, "ul[id='section-Homepage-level1'] > li > a[href*='about-us']");
            let mobile = parse(&primary_link("about-us", true)).unwrap();
            assert_eq!(mobile.strategy().unwrap(), Strategy::XPath);
            assert!(mobile.selector.starts_with("(//ul"));
            let location = parse(&location_link("Spain")).unwrap();
            assert!(location.selector.starts_with("div[id='tab-Spain']"));
        }
    }

    mod menu_tests {
        use super::*;

        #[test]
        fn test_menu_from_free_text() {
            assert_eq!("Our Bupa".parse::<Menu>().unwrap(), Menu::OurBupa);
            assert_eq!(" what  WE do ".parse::<Menu>().unwrap(), Menu::WhatWeDo);
            assert_eq!("Our Markets".parse::<MenuItem>().unwrap(), MenuItem::OurMarkets);
        }

        #[test]
        fn test_unknown_menu_is_invalid_option() {
            let err = "careers".parse::<Menu>().unwrap_err();
            assert!(matches!(err, PagekitError::InvalidOption { .. }));
            assert!("".parse::<MenuItem>().is_err());
        }
    }
}
