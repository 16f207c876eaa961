//! Live engine backed by an external Playwright driver executable.
//!
//! Every operation is one driver invocation: a subcommand plus a JSON
//! payload on argv, answered by a single JSON envelope on stdout. The
//! driver owns the actual Playwright runtime; this side stays a thin
//! protocol client so the lifecycle core never links browser internals.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::process::Command;
use tracing::debug;

use crate::config::{LaunchConfig, Viewport};
use crate::engine::{BrowserLike, ContextLike, EngineLike, PageLike};
use crate::error::{HarnessError, Result};

/// Driver executable name looked up on PATH when no path is given.
pub const DEFAULT_DRIVER: &str = "bdt-playwright-driver";

#[derive(Debug, Deserialize)]
struct DriverResponse {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<DriverFault>,
}

/// Structured failure reported by the driver.
#[derive(Debug, Deserialize)]
struct DriverFault {
    code: String,
    message: String,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    selector: Option<String>,
}

impl DriverFault {
    fn into_error(self) -> HarnessError {
        match self.code.as_str() {
            "timeout" => HarnessError::Timeout {
                ms: self.timeout_ms.unwrap_or_default(),
                condition: self.condition.unwrap_or(self.message),
            },
            "navigation" => HarnessError::Navigation {
                url: self.url.unwrap_or_default(),
                source: anyhow::anyhow!(self.message),
            },
            "element-not-found" => HarnessError::ElementNotFound {
                selector: self.selector.unwrap_or_default(),
            },
            _ => HarnessError::Driver(format!("{}: {}", self.code, self.message)),
        }
    }
}

#[derive(Debug)]
struct DriverClient {
    program: PathBuf,
}

impl DriverClient {
    async fn call(&self, subcommand: &str, payload: Value) -> Result<Value> {
        debug!(target: "bdt", driver = %self.program.display(), subcommand, "invoking driver");
        let output = Command::new(&self.program)
            .arg(subcommand)
            .arg(serde_json::to_string(&payload)?)
            .output()
            .await
            .map_err(|err| {
                HarnessError::Driver(format!(
                    "failed to launch driver '{}': {err}",
                    self.program.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let detail = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                "no output".to_string()
            };
            return Err(HarnessError::Driver(format!(
                "driver subcommand '{subcommand}' failed: {detail}"
            )));
        }

        let body = String::from_utf8_lossy(&output.stdout);
        let response: DriverResponse = serde_json::from_str(body.trim()).map_err(|err| {
            HarnessError::Driver(format!("malformed driver response for '{subcommand}': {err}"))
        })?;
        if response.ok {
            return Ok(response.data);
        }
        match response.error {
            Some(fault) => Err(fault.into_error()),
            None => Err(HarnessError::Driver(format!(
                "driver reported failure for '{subcommand}' without detail"
            ))),
        }
    }
}

fn expect_str(data: &Value, key: &str, subcommand: &str) -> Result<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            HarnessError::Driver(format!(
                "driver response for '{subcommand}' is missing '{key}'"
            ))
        })
}

/// Automation engine driving an external Playwright driver CLI.
#[derive(Debug)]
pub struct PlaywrightCliEngine {
    client: Arc<DriverClient>,
}

impl PlaywrightCliEngine {
    /// Creates an engine over an explicit driver executable path.
    pub fn new(program: impl Into<PathBuf>) -> Result<Self> {
        let program = program.into();
        if program.as_os_str().is_empty() {
            return Err(HarnessError::Launch(
                "driver executable path cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            client: Arc::new(DriverClient { program }),
        })
    }

    /// Locates the default driver executable on PATH.
    pub fn discover() -> Result<Self> {
        let program = which::which(DEFAULT_DRIVER).map_err(|err| {
            HarnessError::Launch(format!(
                "driver executable '{DEFAULT_DRIVER}' not found: {err}"
            ))
        })?;
        Self::new(program)
    }
}

#[async_trait]
impl EngineLike for PlaywrightCliEngine {
    async fn launch(&self, config: &LaunchConfig) -> Result<Box<dyn BrowserLike>> {
        let payload = json!({
            "headless": config.headless,
            "slow_mo_ms": config.slow_mo.map(|d| d.as_millis() as u64),
            "args": config.args,
        });
        let data = self
            .client
            .call("launch", payload)
            .await
            .map_err(|err| match err {
                HarnessError::Driver(detail) => HarnessError::Launch(detail),
                other => other,
            })?;
        let browser_id = expect_str(&data, "browser_id", "launch")?;
        Ok(Box::new(PlaywrightCliBrowser {
            client: Arc::clone(&self.client),
            browser_id,
        }))
    }

    async fn stop(self: Box<Self>) -> Result<()> {
        self.client.call("stop", json!({})).await.map(|_| ())
    }
}

struct PlaywrightCliBrowser {
    client: Arc<DriverClient>,
    browser_id: String,
}

#[async_trait]
impl BrowserLike for PlaywrightCliBrowser {
    async fn new_context(&self, viewport: Viewport) -> Result<Box<dyn ContextLike>> {
        let data = self
            .client
            .call(
                "new-context",
                json!({
                    "browser_id": self.browser_id,
                    "viewport": { "width": viewport.width, "height": viewport.height },
                }),
            )
            .await?;
        let context_id = expect_str(&data, "context_id", "new-context")?;
        Ok(Box::new(PlaywrightCliContext {
            client: Arc::clone(&self.client),
            context_id,
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .call("close-browser", json!({ "browser_id": self.browser_id }))
            .await
            .map(|_| ())
    }
}

struct PlaywrightCliContext {
    client: Arc<DriverClient>,
    context_id: String,
}

#[async_trait]
impl ContextLike for PlaywrightCliContext {
    async fn new_page(&self) -> Result<Box<dyn PageLike>> {
        let data = self
            .client
            .call("new-page", json!({ "context_id": self.context_id }))
            .await?;
        let page_id = expect_str(&data, "page_id", "new-page")?;
        Ok(Box::new(PlaywrightCliPage {
            client: Arc::clone(&self.client),
            page_id,
            url: Mutex::new(String::new()),
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .call("close-context", json!({ "context_id": self.context_id }))
            .await
            .map(|_| ())
    }
}

struct PlaywrightCliPage {
    client: Arc<DriverClient>,
    page_id: String,
    url: Mutex<String>,
}

#[async_trait]
impl PageLike for PlaywrightCliPage {
    fn url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .call("goto", json!({ "page_id": self.page_id, "url": url }))
            .await
            .map_err(|err| match err {
                HarnessError::Driver(detail) => HarnessError::Navigation {
                    url: url.to_string(),
                    source: anyhow::anyhow!(detail),
                },
                other => other,
            })?;
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.client
            .call(
                "fill",
                json!({ "page_id": self.page_id, "selector": selector, "value": value }),
            )
            .await
            .map(|_| ())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let data = self
            .client
            .call(
                "click",
                json!({ "page_id": self.page_id, "selector": selector }),
            )
            .await?;
        // A click may navigate; the driver reports the landing URL when it does.
        if let Some(url) = data.get("url").and_then(Value::as_str) {
            *self.url.lock().unwrap() = url.to_string();
        }
        Ok(())
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        let data = self
            .client
            .call(
                "input-value",
                json!({ "page_id": self.page_id, "selector": selector }),
            )
            .await?;
        expect_str(&data, "value", "input-value")
    }

    async fn title(&self) -> Result<String> {
        let data = self
            .client
            .call("title", json!({ "page_id": self.page_id }))
            .await?;
        expect_str(&data, "title", "title")
    }

    async fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.client
            .call(
                "wait-for-visible",
                json!({
                    "page_id": self.page_id,
                    "selector": selector,
                    "timeout_ms": timeout.as_millis() as u64,
                }),
            )
            .await
            .map(|_| ())
    }

    async fn wait_for_title_contains(&self, text: &str, timeout: Duration) -> Result<()> {
        self.client
            .call(
                "wait-for-title",
                json!({
                    "page_id": self.page_id,
                    "text": text,
                    "timeout_ms": timeout.as_millis() as u64,
                }),
            )
            .await
            .map(|_| ())
    }

    async fn wait_for_url(&self, url: &str, timeout: Duration) -> Result<()> {
        self.client
            .call(
                "wait-for-url",
                json!({
                    "page_id": self.page_id,
                    "url": url,
                    "timeout_ms": timeout.as_millis() as u64,
                }),
            )
            .await?;
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .call("close-page", json!({ "page_id": self.page_id }))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::tempdir;

    use super::*;

    fn write_mock_driver(path: &Path) {
        std::fs::write(
            path,
            r#"#!/usr/bin/env python3
import json
import pathlib
import sys

log = pathlib.Path(__file__).with_suffix(".log")
command = sys.argv[1] if len(sys.argv) > 1 else ""
payload = json.loads(sys.argv[2]) if len(sys.argv) > 2 else {}

with log.open("a", encoding="utf-8") as fh:
    fh.write(command + "\n")

if command == "launch":
    print(json.dumps({"ok": True, "data": {"browser_id": "b1"}}))
elif command == "new-context":
    print(json.dumps({"ok": True, "data": {"context_id": "c1"}}))
elif command == "new-page":
    print(json.dumps({"ok": True, "data": {"page_id": "p1"}}))
elif command == "goto":
    print(json.dumps({"ok": True, "data": {}}))
elif command == "fill":
    print(json.dumps({"ok": True, "data": {}}))
elif command == "input-value":
    print(json.dumps({"ok": True, "data": {"value": "playwright"}}))
elif command == "title":
    print(json.dumps({"ok": True, "data": {"title": "Example Domain"}}))
elif command == "wait-for-visible":
    print(json.dumps({
        "ok": False,
        "error": {
            "code": "timeout",
            "message": "selector never became visible",
            "timeout_ms": payload.get("timeout_ms", 0),
            "condition": "selector " + payload.get("selector", "") + " to become visible",
        },
    }))
elif command in ("close-page", "close-context", "close-browser", "stop"):
    print(json.dumps({"ok": True, "data": {}}))
else:
    print("unsupported command", file=sys.stderr)
    raise SystemExit(2)
"#,
        )
        .expect("write mock driver");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path).expect("stat").permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms).expect("chmod");
        }
    }

    #[test]
    fn rejects_empty_driver_path() {
        let err = PlaywrightCliEngine::new("").expect_err("empty path should fail");
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn drives_a_full_lifecycle_in_creation_reverse_order() {
        let temp = tempdir().expect("tempdir");
        let script = temp.path().join("mock-driver.py");
        write_mock_driver(&script);

        let engine = PlaywrightCliEngine::new(&script).expect("engine");
        let browser = engine
            .launch(&LaunchConfig::default())
            .await
            .expect("launch");
        let context = browser
            .new_context(Viewport::default())
            .await
            .expect("context");
        let page = context.new_page().await.expect("page");

        page.goto("https://example.com").await.expect("goto");
        assert_eq!(page.url(), "https://example.com");
        page.fill("input[name=\"q\"]", "playwright")
            .await
            .expect("fill");
        assert_eq!(
            page.input_value("input[name=\"q\"]").await.expect("value"),
            "playwright"
        );
        assert_eq!(page.title().await.expect("title"), "Example Domain");

        page.close().await.expect("close page");
        context.close().await.expect("close context");
        browser.close().await.expect("close browser");
        Box::new(engine).stop().await.expect("stop");

        let log = std::fs::read_to_string(script.with_extension("log")).expect("log");
        let commands: Vec<&str> = log.lines().collect();
        assert_eq!(
            commands,
            vec![
                "launch",
                "new-context",
                "new-page",
                "goto",
                "fill",
                "input-value",
                "title",
                "close-page",
                "close-context",
                "close-browser",
                "stop",
            ]
        );
    }

    #[tokio::test]
    async fn maps_driver_timeouts_onto_the_structured_variant() {
        let temp = tempdir().expect("tempdir");
        let script = temp.path().join("mock-driver.py");
        write_mock_driver(&script);

        let engine = PlaywrightCliEngine::new(&script).expect("engine");
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
            .wait_for_visible("#results", Duration::from_millis(250))
            .await
            .expect_err("wait should time out");
        match err {
            HarnessError::Timeout { ms, condition } => {
                assert_eq!(ms, 250);
                assert!(condition.contains("#results"));
            }
            other => panic!("expected timeout error, got {other}"),
        }
    }

    #[tokio::test]
    async fn surfaces_driver_process_failures_with_detail() {
        let temp = tempdir().expect("tempdir");
        let script = temp.path().join("mock-driver.py");
        write_mock_driver(&script);

        // The mock driver exits non-zero for unknown subcommands.
        let client = DriverClient {
            program: script.clone(),
        };
        let err = client
            .call("screenshot", json!({}))
            .await
            .expect_err("unknown command should fail");
        assert!(err.to_string().contains("unsupported command"));
    }
}
