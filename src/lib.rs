//! Idea API E2E - ordered end-to-end scenarios for the Idea management API
//!
//! Authenticates once, then runs create / list / edit / delete steps and
//! their error paths, asserting status codes and response bodies.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result, Settings};
pub use testing::{run_scenario, TestResult, TestScenario};
