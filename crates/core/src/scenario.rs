use std::fmt;

use tracing::{debug, info};

use crate::engine::{ContextLike, PageLike};
use crate::error::{HarnessError, Result};
use crate::suite::SuiteController;

/// Terminal status attached to a scenario after execution.
///
/// Read-only to teardown; emitted for observability, never branched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioOutcome {
    Passed,
    Failed,
}

impl ScenarioOutcome {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            ScenarioOutcome::Passed
        } else {
            ScenarioOutcome::Failed
        }
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioOutcome::Passed => write!(f, "passed"),
            ScenarioOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Per-scenario lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    Active,
    TornDown,
}

/// Isolated browser state owned by exactly one scenario.
///
/// Created fresh before a scenario, never reused across scenarios, and
/// torn down after it regardless of pass/fail. Holds the context and page
/// as optional fields so teardown releases whatever actually got created.
pub struct ScenarioSession {
    id: String,
    state: SessionState,
    context: Option<Box<dyn ContextLike>>,
    page: Option<Box<dyn PageLike>>,
}

impl fmt::Debug for ScenarioSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ScenarioSession {
    /// A session that never started; tearing it down is a no-op.
    pub fn unstarted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: SessionState::Unstarted,
            context: None,
            page: None,
        }
    }

    /// Provisions a fresh isolated context and page from the suite's live
    /// browser process.
    ///
    /// Precondition: the suite has started. Without a live browser this
    /// fails fatally with [`HarnessError::SuiteNotStarted`]. If page
    /// creation fails after the context exists, the context is released
    /// before the error surfaces.
    pub async fn begin(suite: &SuiteController, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let browser = suite
            .browser()
            .ok_or_else(|| HarnessError::SuiteNotStarted {
                scenario: id.clone(),
            })?;
        info!(target: "bdt", scenario = %id, "starting scenario");
        let context = browser.new_context(suite.config().viewport).await?;
        let page = match context.new_page().await {
            Ok(page) => page,
            Err(err) => {
                if let Err(close_err) = context.close().await {
                    debug!(
                        target: "bdt",
                        scenario = %id,
                        error = %close_err,
                        "context close failed after page creation failure"
                    );
                }
                return Err(err);
            }
        };
        Ok(Self {
            id,
            state: SessionState::Active,
            context: Some(context),
            page: Some(page),
        })
    }

    /// Tears down the session's page, then its context.
    ///
    /// Idempotent, and a no-op for a session that never started. Each
    /// resource is closed independently: absence or close failure of one
    /// never blocks the other. Safe to call after a scenario failure with
    /// no side effects beyond normal cleanup.
    pub async fn end(&mut self, outcome: ScenarioOutcome) -> Result<()> {
        if self.state == SessionState::TornDown {
            return Ok(());
        }
        if let Some(page) = self.page.take() {
            if let Err(err) = page.close().await {
                debug!(
                    target: "bdt",
                    scenario = %self.id,
                    error = %err,
                    "page close failed during scenario teardown"
                );
            }
        }
        if let Some(context) = self.context.take() {
            if let Err(err) = context.close().await {
                debug!(
                    target: "bdt",
                    scenario = %self.id,
                    error = %err,
                    "context close failed during scenario teardown"
                );
            }
        }
        self.state = SessionState::TornDown;
        info!(target: "bdt", scenario = %self.id, outcome = %outcome, "scenario finished");
        Ok(())
    }

    /// Live page for step execution.
    pub fn page(&self) -> Result<&dyn PageLike> {
        self.page
            .as_deref()
            .ok_or_else(|| HarnessError::SessionNotActive {
                scenario: self.id.clone(),
            })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::testing::MockEngine;

    #[tokio::test]
    async fn ending_an_unstarted_session_is_a_no_op() {
        let mut session = ScenarioSession::unstarted("never-ran");
        assert_eq!(session.state(), SessionState::Unstarted);
        session
            .end(ScenarioOutcome::Failed)
            .await
            .expect("no-op teardown");
        assert_eq!(session.state(), SessionState::TornDown);
        assert!(session.page().is_err());
    }

    #[tokio::test]
    async fn begin_requires_a_live_browser() {
        let engine = MockEngine::new();
        let controller = SuiteController::new(Box::new(engine), HarnessConfig::default());
        let err = ScenarioSession::begin(&controller, "S1")
            .await
            .expect_err("suite never started");
        assert!(matches!(err, HarnessError::SuiteNotStarted { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn page_access_fails_after_teardown() {
        let engine = MockEngine::new();
        let mut controller = SuiteController::new(Box::new(engine), HarnessConfig::default());
        controller.start_suite().await.expect("start");

        let mut session = ScenarioSession::begin(&controller, "S1").await.expect("begin");
        assert_eq!(session.state(), SessionState::Active);
        session.page().expect("page is live");

        session.end(ScenarioOutcome::Passed).await.expect("end");
        assert!(matches!(
            session.page(),
            Err(HarnessError::SessionNotActive { .. })
        ));
    }
}
