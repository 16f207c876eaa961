use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::engine::{BrowserLike, EngineLike};
use crate::error::{HarnessError, Result};

/// Owns automation-engine startup and shutdown; brackets the entire run.
///
/// One controller exists per process and is threaded explicitly through
/// the run (never held as ambient global state). It owns the engine and at
/// most one live browser process; scenarios borrow the browser through
/// [`browser`](Self::browser) to carve out their isolated sessions.
pub struct SuiteController {
    config: HarnessConfig,
    engine: Option<Box<dyn EngineLike>>,
    browser: Option<Box<dyn BrowserLike>>,
    started: bool,
}

impl SuiteController {
    /// Creates a controller over an injected automation engine.
    pub fn new(engine: Box<dyn EngineLike>, config: HarnessConfig) -> Self {
        Self {
            config,
            engine: Some(engine),
            browser: None,
            started: false,
        }
    }

    /// Launches the engine's browser process.
    ///
    /// Must run exactly once, before any scenario. A launch failure is
    /// fatal: it aborts the run before any scenario executes and is not
    /// retried.
    pub async fn start_suite(&mut self) -> Result<()> {
        if self.started {
            return Err(HarnessError::SuiteAlreadyStarted);
        }
        self.started = true;
        let engine = self.engine.as_ref().ok_or(HarnessError::SuiteClosed)?;
        let browser = engine.launch(&self.config.launch).await?;
        info!(
            target: "bdt",
            headless = self.config.launch.headless,
            slow_mo_ms = self.config.launch.slow_mo.map(|d| d.as_millis() as u64),
            "browser launched"
        );
        self.browser = Some(browser);
        Ok(())
    }

    /// Closes the browser process, then stops the engine.
    ///
    /// Runs after all scenarios, even when some failed, and is safe in any
    /// partial state: absent resources are skipped, and a close failure is
    /// logged without interrupting the remaining teardown.
    pub async fn end_suite(&mut self) -> Result<()> {
        if let Some(browser) = self.browser.take() {
            if let Err(err) = browser.close().await {
                warn!(target: "bdt", error = %err, "browser close failed during suite teardown");
            }
        }
        if self.started {
            if let Some(engine) = self.engine.take() {
                if let Err(err) = engine.stop().await {
                    warn!(target: "bdt", error = %err, "engine stop failed during suite teardown");
                }
            }
            debug!(target: "bdt", "suite teardown complete");
        }
        Ok(())
    }

    /// Live browser process, once the suite has started.
    pub fn browser(&self) -> Option<&dyn BrowserLike> {
        self.browser.as_deref()
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// True while a live browser process is available to scenarios.
    pub fn is_started(&self) -> bool {
        self.browser.is_some()
    }
}
