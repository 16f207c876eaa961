//! Browser and navigation steps.

use cucumber::{given, then, when};

use crate::world::HarnessWorld;

const LOGIN_URL: &str = "https://example.com/login";

#[given("I open the browser")]
async fn open_browser(world: &mut HarnessWorld) {
    // The session hooks already provisioned browser state; just verify it.
    world.page().expect("no live page for this scenario");
}

#[when(expr = "I navigate to {string}")]
async fn navigate(world: &mut HarnessWorld, url: String) {
    world
        .page()
        .expect("no live page for this scenario")
        .goto(&url)
        .await
        .expect("navigation failed");
}

#[when("I navigate to the login page")]
async fn navigate_to_login(world: &mut HarnessWorld) {
    world
        .page()
        .expect("no live page for this scenario")
        .goto(LOGIN_URL)
        .await
        .expect("navigation failed");
}

#[then(expr = "the page title should contain {string}")]
async fn title_contains(world: &mut HarnessWorld, expected: String) {
    let timeout = world.timeout();
    world
        .page()
        .expect("no live page for this scenario")
        .wait_for_title_contains(&expected, timeout)
        .await
        .expect("title assertion failed");
}
