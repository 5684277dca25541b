//! Chromium driver over the DevTools protocol.
//!
//! Element handles are resolved on every call by evaluating a small script
//! that runs `querySelectorAll` (or `document.evaluate` for XPath
//! selectors) and picks the handle's index. Browser pages double as window
//! handles, keyed by target id.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    Bounds, GetWindowForTargetParams, SetWindowBoundsParams, WindowState,
};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams,
};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, DispatchTouchEventParams, DispatchTouchEventType, TouchPoint,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ClearBrowserCacheParams, ClearBrowserCookiesParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Capability;
use crate::driver::{AutomationDriver, DriverFactory, ElementHandle, Key, Swipe};
use crate::locator::looks_like_xpath;
use crate::result::{PagekitError, PagekitResult};

fn cdp_error(err: impl std::fmt::Display) -> PagekitError {
    PagekitError::driver(err.to_string())
}

fn launch_error(err: impl std::fmt::Display) -> PagekitError {
    PagekitError::BrowserLaunch {
        message: err.to_string(),
    }
}

/// Empties the current origin's web storage
const CLEAR_STORAGE: &str =
    "(() => { try { localStorage.clear(); sessionStorage.clear(); } catch (e) {} return true; })()";

/// Script result for one element lookup
#[derive(Debug, Deserialize)]
struct Probe {
    found: bool,
    #[serde(default)]
    value: serde_json::Value,
}

/// JS expression that collects every node matching `selector` into `nodes`
fn collect_nodes(selector: &str) -> PagekitResult<String> {
    let literal = serde_json::to_string(selector)?;
    Ok(if looks_like_xpath(selector) {
        format!(
            "const snap = document.evaluate({literal}, document, null, \
             XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
             const nodes = []; \
             for (let i = 0; i < snap.snapshotLength; i++) nodes.push(snap.snapshotItem(i));"
        )
    } else {
        format!("const nodes = Array.from(document.querySelectorAll({literal}));")
    })
}

/// Wrap `body`, an expression over `el`, so it runs against the handle's node
fn element_script(element: &ElementHandle, body: &str) -> PagekitResult<String> {
    let nodes = collect_nodes(&element.selector)?;
    Ok(format!(
        "(() => {{ {nodes} const el = nodes[{index}]; \
         if (!el) return {{ found: false }}; \
         return {{ found: true, value: ({body}) }}; }})()",
        index = element.index
    ))
}

/// Expression selecting the first `<option>` of `el` matching `predicate`
fn select_option(predicate: &str) -> String {
    format!(
        "(() => {{ const opts = Array.from(el.options || []); \
         const opt = opts.find({predicate}); \
         if (!opt) return false; \
         el.value = opt.value; \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return true; }})()"
    )
}

/// Chromium session implementing [`AutomationDriver`]
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<Browser>,
    current: Mutex<Page>,
    mobile: bool,
    viewport: (u32, u32),
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch Chromium for `capability` and open a blank page
    ///
    /// # Errors
    ///
    /// Returns `BrowserLaunch` if the browser cannot be started or the first
    /// page cannot be opened.
    pub async fn launch(capability: &Capability) -> PagekitResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(capability.viewport_width, capability.viewport_height);
        if !capability.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = capability.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(launch_error)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(launch_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(launch_error)?;
        let driver = Self {
            browser: Mutex::new(browser),
            current: Mutex::new(page.clone()),
            mobile: capability.mobile,
            viewport: (capability.viewport_width, capability.viewport_height),
            handler,
        };
        driver.emulate(&page).await?;
        info!(capability = %capability.name, mobile = capability.mobile, "chromium launched");
        Ok(driver)
    }

    /// Apply the capability's viewport and touch settings to `page`
    async fn emulate(&self, page: &Page) -> PagekitResult<()> {
        let (width, height) = self.viewport;
        let metrics = SetDeviceMetricsOverrideParams::new(
            i64::from(width),
            i64::from(height),
            if self.mobile { 3.0 } else { 1.0 },
            self.mobile,
        );
        let _ = page.execute(metrics).await.map_err(cdp_error)?;
        if self.mobile {
            let _ = page
                .execute(SetTouchEmulationEnabledParams::new(true))
                .await
                .map_err(cdp_error)?;
        }
        Ok(())
    }

    async fn page(&self) -> Page {
        self.current.lock().await.clone()
    }

    async fn pages(&self) -> PagekitResult<Vec<Page>> {
        self.browser.lock().await.pages().await.map_err(cdp_error)
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: String) -> PagekitResult<T> {
        self.page()
            .await
            .evaluate(script)
            .await
            .map_err(cdp_error)?
            .into_value::<T>()
            .map_err(cdp_error)
    }

    /// Evaluate `body` against the handle's node
    async fn on_element<T: DeserializeOwned>(
        &self,
        element: &ElementHandle,
        body: &str,
    ) -> PagekitResult<T> {
        let probe: Probe = self.evaluate(element_script(element, body)?).await?;
        if !probe.found {
            return Err(PagekitError::not_found(
                &element.selector,
                format!("no match at index {}", element.index),
            ));
        }
        Ok(serde_json::from_value(probe.value)?)
    }

    async fn select(&self, element: &ElementHandle, predicate: &str, what: &str) -> PagekitResult<()> {
        let selected: bool = self.on_element(element, &select_option(predicate)).await?;
        if selected {
            Ok(())
        } else {
            Err(PagekitError::not_found(&element.selector, format!("no option {what}")))
        }
    }

    async fn touch(&self, kind: DispatchTouchEventType, at: Option<(i32, i32)>) -> PagekitResult<()> {
        let points = match at {
            Some((x, y)) => vec![TouchPoint::builder()
                .x(f64::from(x))
                .y(f64::from(y))
                .build()
                .map_err(cdp_error)?],
            None => Vec::new(),
        };
        let params = DispatchTouchEventParams::builder()
            .r#type(kind)
            .touch_points(points)
            .build()
            .map_err(cdp_error)?;
        let _ = self.page().await.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl AutomationDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> PagekitResult<()> {
        let _ = self.page().await.goto(url).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn reload(&self) -> PagekitResult<()> {
        let _ = self.page().await.reload().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn title(&self) -> PagekitResult<String> {
        let title = self.page().await.get_title().await.map_err(cdp_error)?;
        Ok(title.unwrap_or_default())
    }

    async fn current_url(&self) -> PagekitResult<String> {
        let url = self.page().await.url().await.map_err(cdp_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn find_element(&self, selector: &str) -> PagekitResult<ElementHandle> {
        Ok(ElementHandle::new(selector, 0))
    }

    async fn find_elements(&self, selector: &str) -> PagekitResult<Vec<ElementHandle>> {
        let script = format!("(() => {{ {} return nodes.length; }})()", collect_nodes(selector)?);
        let count: usize = self.evaluate(script).await?;
        debug!(selector, count, "matched elements");
        Ok((0..count).map(|i| ElementHandle::new(selector, i)).collect())
    }

    async fn is_existing(&self, element: &ElementHandle) -> PagekitResult<bool> {
        let probe: Probe = self.evaluate(element_script(element, "true")?).await?;
        Ok(probe.found)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> PagekitResult<bool> {
        self.on_element(
            element,
            "!!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) \
             && getComputedStyle(el).visibility !== 'hidden'",
        )
        .await
    }

    async fn is_enabled(&self, element: &ElementHandle) -> PagekitResult<bool> {
        self.on_element(element, "!el.disabled").await
    }

    async fn click(&self, element: &ElementHandle) -> PagekitResult<()> {
        self.on_element::<bool>(element, "(el.click(), true)").await?;
        Ok(())
    }

    async fn clear_value(&self, element: &ElementHandle) -> PagekitResult<()> {
        self.on_element::<bool>(
            element,
            "(el.value = '', el.dispatchEvent(new Event('input', { bubbles: true })), true)",
        )
        .await?;
        Ok(())
    }

    async fn set_value(&self, element: &ElementHandle, text: &str) -> PagekitResult<()> {
        let body = format!(
            "(el.value = {}, el.dispatchEvent(new Event('input', {{ bubbles: true }})), true)",
            serde_json::to_string(text)?
        );
        self.on_element::<bool>(element, &body).await?;
        Ok(())
    }

    async fn get_text(&self, element: &ElementHandle) -> PagekitResult<String> {
        self.on_element(element, "el.innerText ?? el.textContent ?? ''").await
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> PagekitResult<Option<String>> {
        let body = format!("el.getAttribute({})", serde_json::to_string(name)?);
        self.on_element(element, &body).await
    }

    async fn select_by_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
        value: &str,
    ) -> PagekitResult<()> {
        let predicate = format!(
            "o => o.getAttribute({}) === {}",
            serde_json::to_string(name)?,
            serde_json::to_string(value)?
        );
        self.select(element, &predicate, &format!("with {name}={value}")).await
    }

    async fn select_by_index(&self, element: &ElementHandle, index: usize) -> PagekitResult<()> {
        let predicate = format!("(o, i) => i === {index}");
        self.select(element, &predicate, &format!("at index {index}")).await
    }

    async fn select_by_visible_text(
        &self,
        element: &ElementHandle,
        text: &str,
    ) -> PagekitResult<()> {
        let predicate = format!("o => o.text.trim() === {}", serde_json::to_string(text)?);
        self.select(element, &predicate, &format!("with text '{text}'")).await
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> PagekitResult<()> {
        self.on_element::<bool>(element, "(el.scrollIntoView({ block: 'center' }), true)")
            .await?;
        Ok(())
    }

    async fn move_to(&self, element: &ElementHandle) -> PagekitResult<()> {
        let (x, y): (f64, f64) = self
            .on_element(
                element,
                "(() => { const r = el.getBoundingClientRect(); \
                 return [r.x + r.width / 2, r.y + r.height / 2]; })()",
            )
            .await?;
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseMoved)
            .x(x)
            .y(y)
            .build()
            .map_err(cdp_error)?;
        let _ = self.page().await.execute(params).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn window_handles(&self) -> PagekitResult<Vec<String>> {
        Ok(self
            .pages()
            .await?
            .iter()
            .map(|p| p.target_id().inner().clone())
            .collect())
    }

    async fn current_window_handle(&self) -> PagekitResult<String> {
        Ok(self.page().await.target_id().inner().clone())
    }

    async fn switch_to_window(&self, handle: &str) -> PagekitResult<()> {
        let page = self
            .pages()
            .await?
            .into_iter()
            .find(|p| p.target_id().inner() == handle)
            .ok_or_else(|| PagekitError::driver(format!("no window with handle {handle}")))?;
        let _ = page.bring_to_front().await.map_err(cdp_error)?;
        *self.current.lock().await = page;
        Ok(())
    }

    async fn is_mobile(&self) -> PagekitResult<bool> {
        Ok(self.mobile)
    }

    async fn maximize_window(&self) -> PagekitResult<()> {
        let page = self.page().await;
        let window = page
            .execute(GetWindowForTargetParams::default())
            .await
            .map_err(cdp_error)?;
        let bounds = Bounds::builder().window_state(WindowState::Maximized).build();
        let _ = page
            .execute(SetWindowBoundsParams::new(window.window_id.clone(), bounds))
            .await
            .map_err(cdp_error)?;
        Ok(())
    }

    async fn close_window(&self) -> PagekitResult<()> {
        let current = self.page().await;
        let handle = current.target_id().inner().clone();
        let remaining: Vec<Page> = self
            .pages()
            .await?
            .into_iter()
            .filter(|p| p.target_id().inner() != &handle)
            .collect();
        let Some(next) = remaining.into_iter().next() else {
            return Err(PagekitError::driver("cannot close the last window"));
        };
        current.close().await.map_err(cdp_error)?;
        *self.current.lock().await = next;
        Ok(())
    }

    async fn reload_session(&self) -> PagekitResult<()> {
        let mut pages = self.pages().await?.into_iter();
        let keep = match pages.next() {
            Some(page) => page,
            None => self
                .browser
                .lock()
                .await
                .new_page("about:blank")
                .await
                .map_err(cdp_error)?,
        };
        for extra in pages {
            extra.close().await.map_err(cdp_error)?;
        }
        if let Err(err) = keep.evaluate(CLEAR_STORAGE.to_string()).await {
            debug!(error = %err, "web storage not cleared");
        }
        let _ = keep
            .execute(ClearBrowserCookiesParams::default())
            .await
            .map_err(cdp_error)?;
        let _ = keep
            .execute(ClearBrowserCacheParams::default())
            .await
            .map_err(cdp_error)?;
        let _ = keep.goto("about:blank").await.map_err(cdp_error)?;
        self.emulate(&keep).await?;
        *self.current.lock().await = keep;
        Ok(())
    }

    async fn swipe(&self, swipe: Swipe) -> PagekitResult<()> {
        self.touch(DispatchTouchEventType::TouchStart, Some((swipe.x, swipe.start_y)))
            .await?;
        tokio::time::sleep(swipe.hold).await;
        self.touch(DispatchTouchEventType::TouchMove, Some((swipe.x, swipe.end_y)))
            .await?;
        self.touch(DispatchTouchEventType::TouchEnd, None).await
    }

    async fn press_key(&self, key: Key) -> PagekitResult<()> {
        let page = self.page().await;
        for kind in [DispatchKeyEventType::KeyDown, DispatchKeyEventType::KeyUp] {
            let params = DispatchKeyEventParams::builder()
                .r#type(kind)
                .key(key.name())
                .code(key.name())
                .windows_virtual_key_code(key.key_code())
                .build()
                .map_err(cdp_error)?;
            let _ = page.execute(params).await.map_err(cdp_error)?;
        }
        Ok(())
    }
}

/// Launches one [`ChromiumDriver`] per capability
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromiumFactory;

#[async_trait]
impl DriverFactory for ChromiumFactory {
    type Driver = ChromiumDriver;

    async fn launch(&self, capability: &Capability) -> PagekitResult<ChromiumDriver> {
        ChromiumDriver::launch(capability).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_script_uses_query_selector_all() {
        let script = element_script(&ElementHandle::new("a[href*='x']", 2), "true").unwrap();
        assert!(script.contains("querySelectorAll(\"a[href*='x']\")"));
        assert!(script.contains("nodes[2]"));
    }

    #[test]
    fn test_xpath_script_uses_evaluate() {
        let script = element_script(&ElementHandle::new("//ul/li", 0), "true").unwrap();
        assert!(script.contains("document.evaluate(\"//ul/li\""));
    }

    #[test]
    fn test_selector_quotes_are_escaped() {
        let nodes = collect_nodes("input[name=\"q\"]").unwrap();
        assert!(nodes.contains(r#"input[name=\"q\"]"#));
    }
}
