//! Common utilities shared by the API client and the scenario runner

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::{Config, Overrides, Settings};
pub use error::{Error, Result};
