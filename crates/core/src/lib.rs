//! Scenario lifecycle core for the `bdt` browser test harness.
//!
//! Two owners bracket a test run: [`SuiteController`] starts and stops the
//! automation engine once per process, and [`ScenarioSession`] provisions
//! an isolated browsing context plus one page per scenario, guaranteeing
//! teardown on every path. The engine itself is an external collaborator
//! behind the [`engine`] trait seam; [`testing`] ships an in-process mock
//! of it so the lifecycle is testable without a browser.

pub mod config;
pub mod engine;
pub mod error;
pub mod scenario;
pub mod suite;
pub mod testing;

pub use config::{HarnessConfig, LaunchConfig, Viewport};
pub use error::{HarnessError, Result};
pub use scenario::{ScenarioOutcome, ScenarioSession, SessionState};
pub use suite::SuiteController;
