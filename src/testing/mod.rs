//! E2E Test Runner
//!
//! Runs ordered HTTP scenarios against the Idea API, carrying captured
//! values from one step to the next through a [`ScenarioContext`].

mod config;
mod context;
mod runner;

pub use config::*;
pub use context::ScenarioContext;
pub use runner::{run_scenario, run_scenario_file, run_steps, StepOutcome, TestResult};
