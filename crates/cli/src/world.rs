use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cucumber::World;
use tokio::sync::Mutex;
use tracing::warn;

use bdt_core::engine::PageLike;
use bdt_core::{HarnessError, ScenarioOutcome, ScenarioSession, SuiteController};

/// Suite handle threaded into every scenario's world by the before hook.
pub type SharedSuite = Arc<Mutex<SuiteController>>;

/// Per-scenario cucumber world: the scenario's isolated session plus the
/// suite handle it was provisioned from.
#[derive(World)]
#[world(init = Self::empty)]
pub struct HarnessWorld {
    #[allow(dead_code, reason = "held so the suite outlives every live scenario session")]
    suite: Option<SharedSuite>,
    session: Option<ScenarioSession>,
    timeout: Duration,
}

impl fmt::Debug for HarnessWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessWorld")
            .field("session", &self.session)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HarnessWorld {
    /// World before its scenario session exists.
    pub fn empty() -> Self {
        Self {
            suite: None,
            session: None,
            timeout: Duration::from_millis(5_000),
        }
    }

    /// Provisions the isolated session for a starting scenario.
    pub async fn begin_scenario(
        &mut self,
        suite: SharedSuite,
        scenario: &str,
    ) -> bdt_core::Result<()> {
        let session = {
            let controller = suite.lock().await;
            self.timeout = controller.config().default_timeout;
            ScenarioSession::begin(&controller, scenario).await?
        };
        self.suite = Some(suite);
        self.session = Some(session);
        Ok(())
    }

    /// Tears down the scenario session, recording the outcome.
    pub async fn end_scenario(&mut self, outcome: ScenarioOutcome) {
        if let Some(session) = self.session.as_mut() {
            if let Err(err) = session.end(outcome).await {
                warn!(target: "bdt", error = %err, "scenario teardown failed");
            }
        }
    }

    /// The scenario's live page.
    pub fn page(&self) -> bdt_core::Result<&dyn PageLike> {
        match self.session.as_ref() {
            Some(session) => session.page(),
            None => Err(HarnessError::SessionNotActive {
                scenario: "(no session)".to_string(),
            }),
        }
    }

    /// Timeout applied to navigation and assertion waits.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
