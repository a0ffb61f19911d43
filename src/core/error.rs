//! Error types for arbor
//!
//! Generation itself is infallible; errors only come from the edges
//! (config files, color strings, command-line input).

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid color '{0}': expected #rrggbb")]
    Color(String),

    #[error("Config error: {0}")]
    Config(String),
}
