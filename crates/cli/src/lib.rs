//! Runnable BDD harness: CLI, cucumber world and hooks, step definitions.

pub mod cli;
pub mod logging;
pub mod runner;
pub mod steps;
pub mod world;
