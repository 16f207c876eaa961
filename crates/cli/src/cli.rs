use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use bdt_core::{HarnessConfig, LaunchConfig, Viewport};

/// Slow-mo applied when running headed without an explicit `--slow-mo`,
/// so a watched run stays followable.
const HEADED_SLOW_MO: Duration = Duration::from_millis(500);

/// Root CLI for the bdt harness.
#[derive(Parser, Debug)]
#[command(name = "bdt")]
#[command(about = "Behavior-driven browser test harness")]
#[command(version)]
pub struct Cli {
    /// Directory (or single file) of Gherkin features to run.
    #[arg(value_name = "FEATURES", default_value = "features")]
    pub features: PathBuf,

    /// Run the browser with a visible window instead of headless.
    #[arg(long)]
    pub headed: bool,

    /// Artificial delay between engine operations, in milliseconds.
    /// Defaults to 500 when running headed.
    #[arg(long, value_name = "MS")]
    pub slow_mo: Option<u64>,

    /// Timeout for navigation and assertion waits, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub timeout: u64,

    /// Automation engine backing the run.
    #[arg(long, value_enum, default_value_t = EngineChoice::Playwright)]
    pub engine: EngineChoice,

    /// Explicit path to the Playwright driver executable.
    #[arg(long, value_name = "PATH")]
    pub driver: Option<PathBuf>,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Engine implementations selectable at the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum EngineChoice {
    /// External Playwright driver subprocess.
    #[default]
    Playwright,
    /// In-process mock engine (dry runs, harness self-tests).
    Mock,
}

impl std::fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineChoice::Playwright => write!(f, "playwright"),
            EngineChoice::Mock => write!(f, "mock"),
        }
    }
}

impl Cli {
    /// Harness configuration resolved from command-line flags.
    pub fn harness_config(&self) -> HarnessConfig {
        let slow_mo = match (self.slow_mo, self.headed) {
            (Some(ms), _) => Some(Duration::from_millis(ms)),
            (None, true) => Some(HEADED_SLOW_MO),
            (None, false) => None,
        };
        HarnessConfig {
            launch: LaunchConfig {
                headless: !self.headed,
                slow_mo,
                args: Vec::new(),
            },
            viewport: Viewport::default(),
            default_timeout: Duration::from_millis(self.timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["bdt"]).unwrap();
        assert_eq!(cli.features, PathBuf::from("features"));
        assert!(!cli.headed);
        assert_eq!(cli.timeout, 5000);
        assert_eq!(cli.engine, EngineChoice::Playwright);

        let config = cli.harness_config();
        assert!(config.launch.headless);
        assert_eq!(config.launch.slow_mo, None);
        assert_eq!(config.default_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn parse_headed_run_with_mock_engine() {
        let cli = Cli::try_parse_from([
            "bdt",
            "specs/smoke.feature",
            "--headed",
            "--engine",
            "mock",
            "--timeout",
            "10000",
        ])
        .unwrap();
        assert_eq!(cli.features, PathBuf::from("specs/smoke.feature"));
        assert_eq!(cli.engine, EngineChoice::Mock);

        let config = cli.harness_config();
        assert!(!config.launch.headless);
        assert_eq!(config.launch.slow_mo, Some(HEADED_SLOW_MO));
        assert_eq!(config.default_timeout, Duration::from_millis(10_000));
    }

    #[test]
    fn explicit_slow_mo_wins_over_the_headed_default() {
        let cli = Cli::try_parse_from(["bdt", "--headed", "--slow-mo", "50"]).unwrap();
        let config = cli.harness_config();
        assert_eq!(config.launch.slow_mo, Some(Duration::from_millis(50)));
    }
}
