use std::path::Path;
use std::sync::Arc;

use cucumber::World as _;
use cucumber::event::ScenarioFinished;
use cucumber::writer::Stats as _;
use tokio::sync::Mutex;
use tracing::error;

use bdt_core::{ScenarioOutcome, SuiteController};

use crate::world::HarnessWorld;

/// Runs every feature under `features` against the given controller.
///
/// Brackets the run: starts the suite (fatally erroring before any
/// scenario if the launch fails), executes scenarios strictly
/// sequentially with a fresh isolated session around each, and always
/// tears the suite down before reporting. Returns `true` when any
/// scenario failed.
pub async fn run_features(
    mut controller: SuiteController,
    features: &Path,
) -> bdt_core::Result<bool> {
    controller.start_suite().await?;
    let suite = Arc::new(Mutex::new(controller));

    let hook_suite = Arc::clone(&suite);
    let writer = HarnessWorld::cucumber()
        .max_concurrent_scenarios(1)
        .fail_on_skipped()
        .before(move |_feature, _rule, scenario, world| {
            let suite = Arc::clone(&hook_suite);
            let name = scenario.name.clone();
            Box::pin(async move {
                if let Err(err) = world.begin_scenario(suite, &name).await {
                    panic!("failed to provision scenario session for '{name}': {err}");
                }
            })
        })
        .after(|_feature, _rule, _scenario, finished, world| {
            let outcome = match finished {
                ScenarioFinished::StepPassed => ScenarioOutcome::Passed,
                _ => ScenarioOutcome::Failed,
            };
            Box::pin(async move {
                if let Some(world) = world {
                    world.end_scenario(outcome).await;
                }
            })
        })
        .run(features)
        .await;

    let failed = writer.execution_has_failed();
    if let Err(err) = suite.lock().await.end_suite().await {
        error!(target: "bdt", error = %err, "suite teardown failed");
    }
    Ok(failed)
}
