//! Error types for the Idea API scenario runner
//!
//! Error messages are meant to be actionable: configuration errors name the
//! file or environment variable to fix.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario runner
#[derive(Error, Debug)]
pub enum Error {
    // === Setup Errors ===
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    // === Step Errors ===
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode {context}: {message}")]
    Decode { context: String, message: String },

    #[error("Test assertion failed: {0}")]
    TestAssertion(String),

    #[error("Shared state '{0}' has not been captured by an earlier step")]
    StateMissing(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create a decode error, keeping only the head of the offending body
    pub fn decode(context: &str, message: impl Into<String>, body: &str) -> Self {
        Self::Decode {
            context: context.to_string(),
            message: format!("{} (body: {:?})", message.into(), excerpt(body)),
        }
    }

    /// Whether this error aborts the whole suite rather than a single step
    ///
    /// Every error `Session::open` can return is fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Authentication(_)
                | Error::ClientBuild(_)
                | Error::Config(_)
                | Error::ConfigParse(_)
                | Error::FileRead { .. }
        )
    }
}

const EXCERPT_LEN: usize = 200;

/// First [`EXCERPT_LEN`] characters of a response body
pub fn excerpt(body: &str) -> String {
    if body.chars().count() <= EXCERPT_LEN {
        body.to_string()
    } else {
        let head: String = body.chars().take(EXCERPT_LEN).collect();
        format!("{head}...")
    }
}
