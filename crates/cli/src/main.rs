use clap::Parser;

use bdt_cli::cli::{Cli, EngineChoice};
use bdt_cli::{logging, runner};
use bdt_core::SuiteController;
use bdt_core::engine::EngineLike;
use bdt_core::engine::playwright_cli::PlaywrightCliEngine;
use bdt_core::testing::MockEngine;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let engine = match build_engine(&cli) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("bdt: {err}");
            std::process::exit(1);
        }
    };
    let controller = SuiteController::new(engine, cli.harness_config());

    match runner::run_features(controller, &cli.features).await {
        Ok(false) => {}
        Ok(true) => std::process::exit(1),
        Err(err) => {
            eprintln!("bdt: {err}");
            std::process::exit(1);
        }
    }
}

fn build_engine(cli: &Cli) -> bdt_core::Result<Box<dyn EngineLike>> {
    match cli.engine {
        EngineChoice::Playwright => {
            let engine = match &cli.driver {
                Some(path) => PlaywrightCliEngine::new(path.clone())?,
                None => PlaywrightCliEngine::discover()?,
            };
            Ok(Box::new(engine))
        }
        EngineChoice::Mock => Ok(Box::new(MockEngine::new())),
    }
}
