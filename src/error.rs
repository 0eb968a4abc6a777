//! Error types for Ghostwriter

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Ghostwriter errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config load error: {0}")]
    ConfigLoad(String),

    #[error("Pattern library load error: {0}")]
    PatternLoad(String),

    #[error("Thinking process parse error in '{id}': {reason}")]
    ProcessParse { id: String, reason: String },

    #[error("No thinking process available for selection")]
    NoProcessAvailable,

    #[error("Invalid requirements: {0}")]
    InvalidRequirements(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
