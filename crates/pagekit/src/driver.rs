//! AutomationDriver - Abstract Browser Automation Trait
//!
//! Every element action goes through this trait; the action catalogue never
//! talks to a browser directly.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  AutomationDriver (injected into Actions at construction)      │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────┐        │
//! │  │  ChromiumDriver     │        │  MockDriver         │        │
//! │  │  (`browser` feature)│        │  (scripted DOM,     │        │
//! │  │  CDP via            │        │   call history)     │        │
//! │  │  chromiumoxide      │        │                     │        │
//! │  └─────────────────────┘        └─────────────────────┘        │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Capability;
use crate::result::{PagekitError, PagekitResult};
use crate::wait::poll_until;

/// Reference to the `index`-th element matching `selector`.
///
/// Handles are cheap references, not live nodes: drivers re-resolve them on
/// every call, so a handle may point at an element that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Unique identifier for the element
    pub id: String,
    /// Selector the handle was found with
    pub selector: String,
    /// Position among the selector's matches
    pub index: usize,
}

impl ElementHandle {
    /// Create a handle for the `index`-th match of `selector`
    #[must_use]
    pub fn new(selector: impl Into<String>, index: usize) -> Self {
        let selector = selector.into();
        Self {
            id: format!("{selector}@{index}"),
            selector,
            index,
        }
    }
}

/// Device class of the running session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Phone or tablet: hamburger menu, touch gestures
    Mobile,
    /// Desktop browser: hover menus, maximised window
    Desktop,
}

impl DeviceClass {
    /// Check if this is a mobile session
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }
}

/// Keys the action catalogue presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Arrow down
    ArrowDown,
    /// Arrow up
    ArrowUp,
    /// Enter
    Enter,
    /// Escape
    Escape,
}

impl Key {
    /// DOM `key` value
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArrowDown => "ArrowDown",
            Self::ArrowUp => "ArrowUp",
            Self::Enter => "Enter",
            Self::Escape => "Escape",
        }
    }

    /// Windows virtual key code
    #[must_use]
    pub const fn key_code(self) -> i64 {
        match self {
            Self::ArrowDown => 40,
            Self::ArrowUp => 38,
            Self::Enter => 13,
            Self::Escape => 27,
        }
    }
}

/// Vertical press-move-release gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swipe {
    /// Horizontal position of the gesture
    pub x: i32,
    /// Press position
    pub start_y: i32,
    /// Release position
    pub end_y: i32,
    /// Time held before moving
    pub hold: Duration,
}

/// Abstract driver trait for browser automation
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP via chromiumoxide (`browser` feature)
/// - `MockDriver` - scripted in-memory page for unit testing
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> PagekitResult<()>;

    /// Reload the current page
    async fn reload(&self) -> PagekitResult<()>;

    /// Current page title
    async fn title(&self) -> PagekitResult<String>;

    /// Current URL
    async fn current_url(&self) -> PagekitResult<String>;

    /// Handle for the first match of `selector`
    async fn find_element(&self, selector: &str) -> PagekitResult<ElementHandle>;

    /// Handles for every current match of `selector`, in document order
    async fn find_elements(&self, selector: &str) -> PagekitResult<Vec<ElementHandle>>;

    /// Whether the handle currently resolves to a node
    async fn is_existing(&self, element: &ElementHandle) -> PagekitResult<bool>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self, element: &ElementHandle) -> PagekitResult<bool>;

    /// Whether the element is enabled
    async fn is_enabled(&self, element: &ElementHandle) -> PagekitResult<bool>;

    /// Wait until the element exists, polling every `interval`
    async fn wait_for_exist(
        &self,
        element: &ElementHandle,
        timeout: Duration,
        interval: Duration,
    ) -> PagekitResult<()> {
        poll_until(
            &format!("'{}' to exist", element.selector),
            timeout,
            interval,
            || self.is_existing(element),
        )
        .await
    }

    /// Wait until the element exists and is enabled, polling every `interval`
    async fn wait_for_enabled(
        &self,
        element: &ElementHandle,
        timeout: Duration,
        interval: Duration,
    ) -> PagekitResult<()> {
        poll_until(
            &format!("'{}' to be enabled", element.selector),
            timeout,
            interval,
            || async move { Ok(self.is_existing(element).await? && self.is_enabled(element).await?) },
        )
        .await
    }

    /// Click element
    async fn click(&self, element: &ElementHandle) -> PagekitResult<()>;

    /// Clear an input's value
    async fn clear_value(&self, element: &ElementHandle) -> PagekitResult<()>;

    /// Set an input's value
    async fn set_value(&self, element: &ElementHandle, text: &str) -> PagekitResult<()>;

    /// Rendered text of the element
    async fn get_text(&self, element: &ElementHandle) -> PagekitResult<String>;

    /// Attribute value, `None` when absent
    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> PagekitResult<Option<String>>;

    /// Select the `<option>` whose attribute `name` equals `value`
    async fn select_by_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
        value: &str,
    ) -> PagekitResult<()>;

    /// Select the `<option>` at `index`
    async fn select_by_index(&self, element: &ElementHandle, index: usize) -> PagekitResult<()>;

    /// Select the `<option>` whose visible text equals `text`
    async fn select_by_visible_text(&self, element: &ElementHandle, text: &str)
        -> PagekitResult<()>;

    /// Scroll the element into the viewport
    async fn scroll_into_view(&self, element: &ElementHandle) -> PagekitResult<()>;

    /// Move the pointer over the element
    async fn move_to(&self, element: &ElementHandle) -> PagekitResult<()>;

    /// Handles of every open window/tab
    async fn window_handles(&self) -> PagekitResult<Vec<String>>;

    /// Handle of the focused window/tab
    async fn current_window_handle(&self) -> PagekitResult<String>;

    /// Focus the given window/tab
    async fn switch_to_window(&self, handle: &str) -> PagekitResult<()>;

    /// Whether the session runs on a mobile device
    async fn is_mobile(&self) -> PagekitResult<bool>;

    /// Maximise the browser window
    async fn maximize_window(&self) -> PagekitResult<()>;

    /// Close the focused window/tab
    async fn close_window(&self) -> PagekitResult<()>;

    /// Replace the browser session with a fresh one
    async fn reload_session(&self) -> PagekitResult<()>;

    /// Perform a touch swipe
    async fn swipe(&self, swipe: Swipe) -> PagekitResult<()>;

    /// Press and release a key
    async fn press_key(&self, key: Key) -> PagekitResult<()>;
}

/// Launches one driver per configured capability
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Driver type produced
    type Driver: AutomationDriver + 'static;

    /// Start a session for `capability`
    async fn launch(&self, capability: &Capability) -> PagekitResult<Self::Driver>;
}

// ============================================================================
// MockDriver
// ============================================================================

/// What happens when a scripted element is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEffect {
    /// Make every element under this selector displayed
    Reveal(String),
    /// Open a new window and leave focus where it is
    OpenWindow {
        /// Window title
        title: String,
        /// Window URL
        url: String,
    },
    /// Navigate the focused window
    Navigate(String),
}

/// `<option>` of a scripted `<select>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOption {
    /// `value` attribute
    pub value: String,
    /// Visible text
    pub text: String,
}

/// Scripted DOM element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Rendered text
    pub text: String,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Whether displayed
    pub displayed: bool,
    /// Whether enabled
    pub enabled: bool,
    /// Current input value
    pub value: String,
    /// Options when the element is a `<select>`
    pub options: Vec<MockOption>,
    /// Index of the selected option
    pub selected: Option<usize>,
    /// Effects applied on click
    pub on_click: Vec<MockEffect>,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            attributes: BTreeMap::new(),
            displayed: true,
            enabled: true,
            value: String::new(),
            options: Vec::new(),
            selected: None,
            on_click: Vec::new(),
        }
    }
}

impl MockElement {
    /// Visible, enabled element with `text`
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Mark hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Mark disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Add a `<select>` option
    #[must_use]
    pub fn option(mut self, value: impl Into<String>, text: impl Into<String>) -> Self {
        self.options.push(MockOption {
            value: value.into(),
            text: text.into(),
        });
        self
    }

    /// Add a click effect
    #[must_use]
    pub fn on_click(mut self, effect: MockEffect) -> Self {
        self.on_click.push(effect);
        self
    }
}

#[derive(Debug, Clone)]
struct MockWindow {
    handle: String,
    title: String,
    url: String,
}

#[derive(Debug)]
struct MockState {
    elements: BTreeMap<String, Vec<MockElement>>,
    windows: Vec<MockWindow>,
    current: usize,
    mobile: bool,
    failures: BTreeMap<String, String>,
    call_history: Vec<String>,
    next_window: usize,
}

/// Mock driver for unit testing
///
/// Elements are scripted per selector; every trait call is appended to the
/// call history as `operation:argument`.
#[derive(Debug)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDriver {
    /// Create new mock driver with one blank desktop window
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                elements: BTreeMap::new(),
                windows: vec![MockWindow {
                    handle: "window-0".to_string(),
                    title: String::new(),
                    url: "about:blank".to_string(),
                }],
                current: 0,
                mobile: false,
                failures: BTreeMap::new(),
                call_history: Vec::new(),
                next_window: 1,
            }),
        }
    }

    /// Report the session as mobile
    #[must_use]
    pub fn mobile(self) -> Self {
        self.state.lock().mobile = true;
        self
    }

    /// Add a mock element under `selector`
    pub fn add_element(&self, selector: impl Into<String>, element: MockElement) {
        self.state
            .lock()
            .elements
            .entry(selector.into())
            .or_default()
            .push(element);
    }

    /// Builder form of [`MockDriver::add_element`]
    #[must_use]
    pub fn with_element(self, selector: impl Into<String>, element: MockElement) -> Self {
        self.add_element(selector, element);
        self
    }

    /// Remove every element under `selector`
    pub fn remove_elements(&self, selector: &str) {
        let _ = self.state.lock().elements.remove(selector);
    }

    /// Set the focused window's title
    pub fn set_title(&self, title: impl Into<String>) {
        let mut state = self.state.lock();
        let current = state.current;
        state.windows[current].title = title.into();
    }

    /// Open an extra window without focusing it
    pub fn open_window(&self, title: impl Into<String>, url: impl Into<String>) -> String {
        let mut state = self.state.lock();
        open_window(&mut state, title.into(), url.into())
    }

    /// Make every call to `operation` fail with `message`
    pub fn fail_on(&self, operation: impl Into<String>, message: impl Into<String>) {
        let _ = self
            .state
            .lock()
            .failures
            .insert(operation.into(), message.into());
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.lock().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state
            .lock()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Number of calls starting with `prefix`
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .call_history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Snapshot of a scripted element
    #[must_use]
    pub fn element(&self, selector: &str, index: usize) -> Option<MockElement> {
        self.state
            .lock()
            .elements
            .get(selector)
            .and_then(|list| list.get(index))
            .cloned()
    }

    fn record(&self, call: String) -> PagekitResult<()> {
        let mut state = self.state.lock();
        let operation = call.split(':').next().unwrap_or_default().to_string();
        state.call_history.push(call);
        match state.failures.get(&operation) {
            Some(message) => Err(PagekitError::driver(message.clone())),
            None => Ok(()),
        }
    }

    fn with_node<T>(
        &self,
        element: &ElementHandle,
        f: impl FnOnce(&mut MockElement) -> PagekitResult<T>,
    ) -> PagekitResult<T> {
        let mut state = self.state.lock();
        let node = state
            .elements
            .get_mut(&element.selector)
            .and_then(|list| list.get_mut(element.index))
            .ok_or_else(|| PagekitError::not_found(&element.selector, "no such element"))?;
        f(node)
    }
}

fn open_window(state: &mut MockState, title: String, url: String) -> String {
    let handle = format!("window-{}", state.next_window);
    state.next_window += 1;
    state.windows.push(MockWindow {
        handle: handle.clone(),
        title,
        url,
    });
    handle
}

#[async_trait]
impl AutomationDriver for MockDriver {
    async fn navigate(&self, url: &str) -> PagekitResult<()> {
        self.record(format!("navigate:{url}"))?;
        let mut state = self.state.lock();
        let current = state.current;
        state.windows[current].url = url.to_string();
        Ok(())
    }

    async fn reload(&self) -> PagekitResult<()> {
        self.record("reload".to_string())
    }

    async fn title(&self) -> PagekitResult<String> {
        self.record("title".to_string())?;
        let state = self.state.lock();
        Ok(state.windows[state.current].title.clone())
    }

    async fn current_url(&self) -> PagekitResult<String> {
        self.record("current_url".to_string())?;
        let state = self.state.lock();
        Ok(state.windows[state.current].url.clone())
    }

    async fn find_element(&self, selector: &str) -> PagekitResult<ElementHandle> {
        self.record(format!("find_element:{selector}"))?;
        Ok(ElementHandle::new(selector, 0))
    }

    async fn find_elements(&self, selector: &str) -> PagekitResult<Vec<ElementHandle>> {
        self.record(format!("find_elements:{selector}"))?;
        let count = self
            .state
            .lock()
            .elements
            .get(selector)
            .map_or(0, Vec::len);
        Ok((0..count).map(|i| ElementHandle::new(selector, i)).collect())
    }

    async fn is_existing(&self, element: &ElementHandle) -> PagekitResult<bool> {
        self.record(format!("is_existing:{}", element.id))?;
        Ok(self
            .state
            .lock()
            .elements
            .get(&element.selector)
            .is_some_and(|list| element.index < list.len()))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> PagekitResult<bool> {
        self.record(format!("is_displayed:{}", element.id))?;
        self.with_node(element, |node| Ok(node.displayed))
    }

    async fn is_enabled(&self, element: &ElementHandle) -> PagekitResult<bool> {
        self.record(format!("is_enabled:{}", element.id))?;
        self.with_node(element, |node| Ok(node.enabled))
    }

    async fn click(&self, element: &ElementHandle) -> PagekitResult<()> {
        self.record(format!("click:{}", element.id))?;
        let effects = self.with_node(element, |node| Ok(node.on_click.clone()))?;
        let mut state = self.state.lock();
        for effect in effects {
            match effect {
                MockEffect::Reveal(selector) => {
                    if let Some(list) = state.elements.get_mut(&selector) {
                        for node in list {
                            node.displayed = true;
                        }
                    }
                }
                MockEffect::OpenWindow { title, url } => {
                    let _ = open_window(&mut state, title, url);
                }
                MockEffect::Navigate(url) => {
                    let current = state.current;
                    state.windows[current].url = url;
                }
            }
        }
        Ok(())
    }

    async fn clear_value(&self, element: &ElementHandle) -> PagekitResult<()> {
        self.record(format!("clear_value:{}", element.id))?;
        self.with_node(element, |node| {
            node.value.clear();
            Ok(())
        })
    }

    async fn set_value(&self, element: &ElementHandle, text: &str) -> PagekitResult<()> {
        self.record(format!("set_value:{}={text}", element.id))?;
        self.with_node(element, |node| {
            node.value = text.to_string();
            Ok(())
        })
    }

    async fn get_text(&self, element: &ElementHandle) -> PagekitResult<String> {
        self.record(format!("get_text:{}", element.id))?;
        self.with_node(element, |node| Ok(node.text.clone()))
    }

    async fn get_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> PagekitResult<Option<String>> {
        self.record(format!("get_attribute:{}[{name}]", element.id))?;
        self.with_node(element, |node| Ok(node.attributes.get(name).cloned()))
    }

    async fn select_by_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
        value: &str,
    ) -> PagekitResult<()> {
        self.record(format!("select_by_attribute:{}[{name}={value}]", element.id))?;
        self.with_node(element, |node| {
            // Only the `value` attribute is scripted on mock options
            let position = node
                .options
                .iter()
                .position(|o| name == "value" && o.value == value)
                .ok_or_else(|| PagekitError::driver(format!("no option with {name}={value}")))?;
            node.selected = Some(position);
            Ok(())
        })
    }

    async fn select_by_index(&self, element: &ElementHandle, index: usize) -> PagekitResult<()> {
        self.record(format!("select_by_index:{}[{index}]", element.id))?;
        self.with_node(element, |node| {
            if index >= node.options.len() {
                return Err(PagekitError::driver(format!("no option at index {index}")));
            }
            node.selected = Some(index);
            Ok(())
        })
    }

    async fn select_by_visible_text(
        &self,
        element: &ElementHandle,
        text: &str,
    ) -> PagekitResult<()> {
        self.record(format!("select_by_visible_text:{}[{text}]", element.id))?;
        self.with_node(element, |node| {
            let position = node
                .options
                .iter()
                .position(|o| o.text == text)
                .ok_or_else(|| PagekitError::driver(format!("no option with text {text}")))?;
            node.selected = Some(position);
            Ok(())
        })
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> PagekitResult<()> {
        self.record(format!("scroll_into_view:{}", element.id))?;
        self.with_node(element, |_| Ok(()))
    }

    async fn move_to(&self, element: &ElementHandle) -> PagekitResult<()> {
        self.record(format!("move_to:{}", element.id))?;
        self.with_node(element, |_| Ok(()))
    }

    async fn window_handles(&self) -> PagekitResult<Vec<String>> {
        self.record("window_handles".to_string())?;
        Ok(self
            .state
            .lock()
            .windows
            .iter()
            .map(|w| w.handle.clone())
            .collect())
    }

    async fn current_window_handle(&self) -> PagekitResult<String> {
        self.record("current_window_handle".to_string())?;
        let state = self.state.lock();
        Ok(state.windows[state.current].handle.clone())
    }

    async fn switch_to_window(&self, handle: &str) -> PagekitResult<()> {
        self.record(format!("switch_to_window:{handle}"))?;
        let mut state = self.state.lock();
        let position = state
            .windows
            .iter()
            .position(|w| w.handle == handle)
            .ok_or_else(|| PagekitError::driver(format!("no window {handle}")))?;
        state.current = position;
        Ok(())
    }

    async fn is_mobile(&self) -> PagekitResult<bool> {
        self.record("is_mobile".to_string())?;
        Ok(self.state.lock().mobile)
    }

    async fn maximize_window(&self) -> PagekitResult<()> {
        self.record("maximize_window".to_string())
    }

    async fn close_window(&self) -> PagekitResult<()> {
        self.record("close_window".to_string())?;
        let mut state = self.state.lock();
        if state.windows.len() < 2 {
            return Err(PagekitError::driver("cannot close the last window"));
        }
        let current = state.current;
        let _ = state.windows.remove(current);
        state.current = 0;
        Ok(())
    }

    async fn reload_session(&self) -> PagekitResult<()> {
        self.record("reload_session".to_string())?;
        let mut state = self.state.lock();
        state.windows.truncate(1);
        state.current = 0;
        state.windows[0].url = "about:blank".to_string();
        Ok(())
    }

    async fn swipe(&self, swipe: Swipe) -> PagekitResult<()> {
        self.record(format!(
            "swipe:{},{}->{}",
            swipe.x, swipe.start_y, swipe.end_y
        ))
    }

    async fn press_key(&self, key: Key) -> PagekitResult<()> {
        self.record(format!("press_key:{}", key.name()))
    }
}

// ============================================================================
// Tests
// ============================================================================
