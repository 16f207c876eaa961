//! Testing infrastructure for the lifecycle core.
//!
//! Provides an in-process mock automation engine so suite/scenario
//! lifecycles can be exercised without spawning a browser. The mock
//! records every lifecycle and page event, keeps field state per isolated
//! context (which makes cross-scenario isolation observable), and supports
//! failure injection for launch, page close, and element visibility.
//!
//! # Example
//!
//! ```
//! use bdt_core::testing::MockEngine;
//! use bdt_core::{HarnessConfig, SuiteController};
//!
//! # async fn demo() -> bdt_core::Result<()> {
//! let engine = MockEngine::new();
//! let handle = engine.handle();
//! let mut controller = SuiteController::new(Box::new(engine), HarnessConfig::default());
//! controller.start_suite().await?;
//! // ... scenarios ...
//! controller.end_suite().await?;
//! assert!(!handle.engine_live());
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{LaunchConfig, Viewport};
use crate::engine::{BrowserLike, ContextLike, EngineLike, PageLike};
use crate::error::{HarnessError, Result};

/// Event recorded by the mock engine for lifecycle assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    EngineLaunched,
    EngineStopped,
    BrowserClosed,
    ContextOpened(u32),
    ContextClosed(u32),
    PageOpened(u32),
    PageClosed(u32),
    Navigated { context: u32, url: String },
    Filled { context: u32, selector: String, value: String },
    Clicked { context: u32, selector: String },
}

#[derive(Default)]
struct MockStateInner {
    events: Vec<MockEvent>,
    fail_launch: bool,
    fail_page_close: bool,
    titles: HashMap<String, String>,
    redirects: HashMap<(String, String), String>,
    hidden_selectors: HashSet<String>,
    next_context: u32,
    live_contexts: usize,
    max_live_contexts: usize,
    browser_live: bool,
    engine_live: bool,
}

#[derive(Clone, Default)]
struct MockState(Arc<Mutex<MockStateInner>>);

impl MockState {
    fn record(&self, event: MockEvent) {
        self.0.lock().unwrap().events.push(event);
    }
}

/// Shared observer and configurator for a [`MockEngine`].
///
/// Obtain one with [`MockEngine::handle`] before boxing the engine into a
/// controller; it stays valid for the engine's whole lifetime.
#[derive(Clone, Default)]
pub struct MockEngineHandle {
    state: MockState,
}

impl MockEngineHandle {
    /// All events recorded so far, in order.
    pub fn events(&self) -> Vec<MockEvent> {
        self.state.0.lock().unwrap().events.clone()
    }

    /// Number of currently open isolated contexts.
    pub fn live_contexts(&self) -> usize {
        self.state.0.lock().unwrap().live_contexts
    }

    /// High-water mark of simultaneously open contexts.
    pub fn max_live_contexts(&self) -> usize {
        self.state.0.lock().unwrap().max_live_contexts
    }

    pub fn browser_live(&self) -> bool {
        self.state.0.lock().unwrap().browser_live
    }

    pub fn engine_live(&self) -> bool {
        self.state.0.lock().unwrap().engine_live
    }

    /// Makes the next launch fail fatally.
    pub fn fail_launch(&self) {
        self.state.0.lock().unwrap().fail_launch = true;
    }

    /// Makes every page close report an error.
    pub fn fail_page_close(&self) {
        self.state.0.lock().unwrap().fail_page_close = true;
    }

    /// Sets the title reported while a page is at `url`.
    pub fn set_title_for_url(&self, url: &str, title: &str) {
        self.state
            .0
            .lock()
            .unwrap()
            .titles
            .insert(url.to_string(), title.to_string());
    }

    /// Makes clicking `selector` while at `on_url` navigate to `to_url`.
    pub fn redirect_on_click(&self, on_url: &str, selector: &str, to_url: &str) {
        self.state
            .0
            .lock()
            .unwrap()
            .redirects
            .insert((on_url.to_string(), selector.to_string()), to_url.to_string());
    }

    /// Makes visibility waits on `selector` time out.
    pub fn hide_selector(&self, selector: &str) {
        self.state
            .0
            .lock()
            .unwrap()
            .hidden_selectors
            .insert(selector.to_string());
    }
}

/// In-process automation engine double.
#[derive(Default)]
pub struct MockEngine {
    state: MockState,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observer handle sharing this engine's recorded state.
    pub fn handle(&self) -> MockEngineHandle {
        MockEngineHandle {
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl EngineLike for MockEngine {
    async fn launch(&self, _config: &LaunchConfig) -> Result<Box<dyn BrowserLike>> {
        {
            let mut inner = self.state.0.lock().unwrap();
            if inner.fail_launch {
                return Err(HarnessError::Launch("injected launch failure".to_string()));
            }
            inner.engine_live = true;
            inner.browser_live = true;
        }
        self.state.record(MockEvent::EngineLaunched);
        Ok(Box::new(MockBrowser {
            state: self.state.clone(),
        }))
    }

    async fn stop(self: Box<Self>) -> Result<()> {
        self.state.0.lock().unwrap().engine_live = false;
        self.state.record(MockEvent::EngineStopped);
        Ok(())
    }
}

struct MockBrowser {
    state: MockState,
}

#[async_trait]
impl BrowserLike for MockBrowser {
    async fn new_context(&self, _viewport: Viewport) -> Result<Box<dyn ContextLike>> {
        let id = {
            let mut inner = self.state.0.lock().unwrap();
            inner.next_context += 1;
            inner.live_contexts += 1;
            inner.max_live_contexts = inner.max_live_contexts.max(inner.live_contexts);
            inner.next_context
        };
        self.state.record(MockEvent::ContextOpened(id));
        Ok(Box::new(MockContext {
            state: self.state.clone(),
            id,
            fields: Arc::new(Mutex::new(HashMap::new())),
            url: Arc::new(Mutex::new(String::new())),
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.0.lock().unwrap().browser_live = false;
        self.state.record(MockEvent::BrowserClosed);
        Ok(())
    }
}

struct MockContext {
    state: MockState,
    id: u32,
    fields: Arc<Mutex<HashMap<String, String>>>,
    url: Arc<Mutex<String>>,
}

#[async_trait]
impl ContextLike for MockContext {
    async fn new_page(&self) -> Result<Box<dyn PageLike>> {
        self.state.record(MockEvent::PageOpened(self.id));
        Ok(Box::new(MockPage {
            state: self.state.clone(),
            context: self.id,
            fields: Arc::clone(&self.fields),
            url: Arc::clone(&self.url),
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.state.0.lock().unwrap().live_contexts -= 1;
        self.state.record(MockEvent::ContextClosed(self.id));
        Ok(())
    }
}

struct MockPage {
    state: MockState,
    context: u32,
    fields: Arc<Mutex<HashMap<String, String>>>,
    url: Arc<Mutex<String>>,
}

impl MockPage {
    fn timeout(&self, timeout: Duration, condition: String) -> HarnessError {
        HarnessError::Timeout {
            ms: timeout.as_millis() as u64,
            condition,
        }
    }
}

#[async_trait]
impl PageLike for MockPage {
    fn url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    async fn goto(&self, url: &str) -> Result<()> {
        *self.url.lock().unwrap() = url.to_string();
        self.state.record(MockEvent::Navigated {
            context: self.context,
            url: url.to_string(),
        });
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.fields
            .lock()
            .unwrap()
            .insert(selector.to_string(), value.to_string());
        self.state.record(MockEvent::Filled {
            context: self.context,
            selector: selector.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let target = {
            let inner = self.state.0.lock().unwrap();
            inner
                .redirects
                .get(&(self.url(), selector.to_string()))
                .cloned()
        };
        if let Some(url) = target {
            *self.url.lock().unwrap() = url;
        }
        self.state.record(MockEvent::Clicked {
            context: self.context,
            selector: selector.to_string(),
        });
        Ok(())
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        Ok(self
            .fields
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn title(&self) -> Result<String> {
        let url = self.url();
        Ok(self
            .state
            .0
            .lock()
            .unwrap()
            .titles
            .get(&url)
            .cloned()
            .unwrap_or_default())
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        let hidden = self
            .state
            .0
            .lock()
            .unwrap()
            .hidden_selectors
            .contains(selector);
        if hidden {
            return Err(self.timeout(
                timeout,
                format!("selector {selector:?} to become visible"),
            ));
        }
        Ok(())
    }

    async fn wait_for_title_contains(&self, text: &str, timeout: Duration) -> Result<()> {
        let title = self.title().await?;
        if title.contains(text) {
            Ok(())
        } else {
            Err(self.timeout(timeout, format!("title to contain {text:?}")))
        }
    }

    async fn wait_for_url(&self, url: &str, timeout: Duration) -> Result<()> {
        if self.url() == url {
            Ok(())
        } else {
            Err(self.timeout(timeout, format!("url to equal {url:?}")))
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        if self.state.0.lock().unwrap().fail_page_close {
            return Err(HarnessError::Driver(
                "injected page close failure".to_string(),
            ));
        }
        self.state.record(MockEvent::PageClosed(self.context));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_contexts_do_not_share_field_state() {
        let engine = MockEngine::new();
        let browser = engine
            .launch(&LaunchConfig::default())
            .await
            .expect("launch");

        let first = browser
            .new_context(Viewport::default())
            .await
            .expect("context");
        let page = first.new_page().await.expect("page");
        page.fill("input[name=\"q\"]", "playwright")
            .await
            .expect("fill");
        assert_eq!(
            page.input_value("input[name=\"q\"]").await.expect("value"),
            "playwright"
        );

        let second = browser
            .new_context(Viewport::default())
            .await
            .expect("context");
        let fresh = second.new_page().await.expect("page");
        assert_eq!(
            fresh.input_value("input[name=\"q\"]").await.expect("value"),
            ""
        );
    }

    #[tokio::test]
    async fn hidden_selectors_time_out_on_visibility_waits() {
        let engine = MockEngine::new();
        let handle = engine.handle();
        handle.hide_selector("#results");

        let browser = engine
            .launch(&LaunchConfig::default())
            .await
            .expect("launch");
        let context = browser
            .new_context(Viewport::default())
            .await
            .expect("context");
        let page = context.new_page().await.expect("page");

        let err = page
            .wait_for_visible("#results", Duration::from_millis(100))
            .await
            .expect_err("hidden selector should time out");
        assert!(matches!(err, HarnessError::Timeout { ms: 100, .. }));
        page.wait_for_visible("#other", Duration::from_millis(100))
            .await
            .expect("other selectors stay visible");
    }

    #[tokio::test]
    async fn configured_clicks_navigate_and_titles_resolve_by_url() {
        let engine = MockEngine::new();
        let handle = engine.handle();
        handle.set_title_for_url("https://example.com/dashboard", "Dashboard - Welcome");
        handle.redirect_on_click(
            "https://example.com/login",
            "button[type=\"submit\"]",
            "https://example.com/dashboard",
        );

        let browser = engine
            .launch(&LaunchConfig::default())
            .await
            .expect("launch");
        let context = browser
            .new_context(Viewport::default())
            .await
            .expect("context");
        let page = context.new_page().await.expect("page");

        page.goto("https://example.com/login").await.expect("goto");
        page.click("button[type=\"submit\"]").await.expect("click");
        assert_eq!(page.url(), "https://example.com/dashboard");
        page.wait_for_url("https://example.com/dashboard", Duration::from_millis(100))
            .await
            .expect("url wait");
        page.wait_for_title_contains("Welcome", Duration::from_millis(100))
            .await
            .expect("title wait");
    }
}
