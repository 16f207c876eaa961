//! Form input and click steps.

use cucumber::{then, when};

use crate::world::HarnessWorld;

const SEARCH_BOX: &str = "input[name=\"q\"]";
const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";
const USERNAME_FIELD: &str = "input[name=\"username\"]";
const PASSWORD_FIELD: &str = "input[name=\"password\"]";
const SEARCH_RESULTS: &str = "#search";
const WELCOME_TEXT: &str = "text=Welcome";
const DASHBOARD_URL: &str = "https://example.com/dashboard";

#[when(expr = "I enter {string} in the search box")]
async fn enter_search_text(world: &mut HarnessWorld, text: String) {
    world
        .page()
        .expect("no live page for this scenario")
        .fill(SEARCH_BOX, &text)
        .await
        .expect("fill failed");
}

#[when("I click the search button")]
async fn click_search(world: &mut HarnessWorld) {
    world
        .page()
        .expect("no live page for this scenario")
        .click(SUBMIT_BUTTON)
        .await
        .expect("click failed");
}

#[when(expr = "I enter username {string}")]
async fn enter_username(world: &mut HarnessWorld, username: String) {
    world
        .page()
        .expect("no live page for this scenario")
        .fill(USERNAME_FIELD, &username)
        .await
        .expect("fill failed");
}

#[when(expr = "I enter password {string}")]
async fn enter_password(world: &mut HarnessWorld, password: String) {
    world
        .page()
        .expect("no live page for this scenario")
        .fill(PASSWORD_FIELD, &password)
        .await
        .expect("fill failed");
}

#[when("I click the login button")]
async fn click_login(world: &mut HarnessWorld) {
    world
        .page()
        .expect("no live page for this scenario")
        .click(SUBMIT_BUTTON)
        .await
        .expect("click failed");
}

#[then("I should see search results")]
async fn see_search_results(world: &mut HarnessWorld) {
    let timeout = world.timeout();
    world
        .page()
        .expect("no live page for this scenario")
        .wait_for_visible(SEARCH_RESULTS, timeout)
        .await
        .expect("search results never became visible");
}

#[then("I should be redirected to the dashboard")]
async fn redirected_to_dashboard(world: &mut HarnessWorld) {
    let timeout = world.timeout();
    world
        .page()
        .expect("no live page for this scenario")
        .wait_for_url(DASHBOARD_URL, timeout)
        .await
        .expect("dashboard redirect never happened");
}

#[then("I should see welcome message")]
async fn see_welcome_message(world: &mut HarnessWorld) {
    let timeout = world.timeout();
    world
        .page()
        .expect("no live page for this scenario")
        .wait_for_visible(WELCOME_TEXT, timeout)
        .await
        .expect("welcome message never became visible");
}
