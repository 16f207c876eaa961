use std::time::Duration;

/// Fixed viewport applied to every isolated browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Browser launch options, applied once per suite.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Whether the browser launches without a visible window.
    pub headless: bool,
    /// Artificial delay between engine operations, for observability.
    pub slow_mo: Option<Duration>,
    /// Extra launch flags passed through to the engine.
    pub args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            slow_mo: None,
            args: Vec::new(),
        }
    }
}

/// Fully owned harness configuration.
///
/// This type is the stable handoff between the runner and the lifecycle
/// core: launch options for the suite, the per-scenario context viewport,
/// and the bound applied to navigation/assertion waits.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub launch: LaunchConfig,
    pub viewport: Viewport,
    /// Timeout applied to navigation and assertion waits.
    pub default_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            launch: LaunchConfig::default(),
            viewport: Viewport::default(),
            default_timeout: Duration::from_millis(5_000),
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.launch.headless = headless;
        self
    }

    pub fn with_slow_mo(mut self, slow_mo: Option<Duration>) -> Self {
        self.launch.slow_mo = slow_mo;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}
