//! End-to-end run of the shipped feature files over the mock engine.

use std::path::Path;

use bdt_cli::runner;
use bdt_core::testing::{MockEngine, MockEvent};
use bdt_core::{HarnessConfig, SuiteController};

#[tokio::test]
async fn shipped_features_run_clean_on_the_mock_engine() {
    let engine = MockEngine::new();
    let handle = engine.handle();
    handle.set_title_for_url(
        "https://duckduckgo.com",
        "playwright at DuckDuckGo \u{2014} Privacy, simplified.",
    );
    handle.redirect_on_click(
        "https://example.com/login",
        "button[type=\"submit\"]",
        "https://example.com/dashboard",
    );

    let controller = SuiteController::new(Box::new(engine), HarnessConfig::default());
    let features = Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
    let failed = runner::run_features(controller, &features)
        .await
        .expect("suite runs");
    assert!(!failed, "shipped features should pass on the mock engine");

    // Every scenario got exactly one isolated session, torn down again.
    let events = handle.events();
    let opened = events
        .iter()
        .filter(|ev| matches!(ev, MockEvent::ContextOpened(_)))
        .count();
    let closed = events
        .iter()
        .filter(|ev| matches!(ev, MockEvent::ContextClosed(_)))
        .count();
    assert_eq!(opened, 2);
    assert_eq!(closed, 2);
    assert_eq!(handle.max_live_contexts(), 1);

    // And the suite released everything on the way out.
    assert_eq!(handle.live_contexts(), 0);
    assert!(!handle.browser_live());
    assert!(!handle.engine_live());
}
