//! Capability seam to the external automation engine.
//!
//! The lifecycle core depends on exactly these operations and nothing
//! more: launch a browser process, carve isolated contexts out of it, open
//! one page per context, and drive that page. Implementations are injected
//! into [`crate::SuiteController`], so the whole lifecycle is testable
//! without a real browser (see [`crate::testing`]).

pub mod playwright_cli;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{LaunchConfig, Viewport};
use crate::error::Result;

/// Entry point of an automation engine.
#[async_trait]
pub trait EngineLike: Send + Sync {
    /// Launches one browser process with the given options.
    async fn launch(&self, config: &LaunchConfig) -> Result<Box<dyn BrowserLike>>;

    /// Stops the engine and releases everything it still owns.
    async fn stop(self: Box<Self>) -> Result<()>;
}

/// A launched browser process serving isolated contexts.
#[async_trait]
pub trait BrowserLike: Send + Sync {
    /// Creates a fresh cookie/storage/viewport sandbox.
    async fn new_context(&self, viewport: Viewport) -> Result<Box<dyn ContextLike>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// An isolated browsing context within one browser process.
#[async_trait]
pub trait ContextLike: Send + Sync {
    /// Opens one page within this context.
    async fn new_page(&self) -> Result<Box<dyn PageLike>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// The active page of an isolated context.
///
/// Mirrors the subset of page operations the shipped step definitions
/// need. Waiting, actionability, and assertion semantics are entirely the
/// engine's; the `wait_*` helpers fail with a structured timeout error
/// once the bound elapses.
#[async_trait]
pub trait PageLike: Send + Sync {
    /// Last URL this page navigated to.
    fn url(&self) -> String;

    async fn goto(&self, url: &str) -> Result<()>;

    /// Replaces the value of the input matching `selector`.
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// Current value of the input matching `selector`.
    async fn input_value(&self, selector: &str) -> Result<String>;

    /// Page title from the `<title>` element.
    async fn title(&self) -> Result<String>;

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()>;

    async fn wait_for_title_contains(&self, text: &str, timeout: Duration) -> Result<()>;

    async fn wait_for_url(&self, url: &str, timeout: Duration) -> Result<()>;

    async fn close(self: Box<Self>) -> Result<()>;
}
