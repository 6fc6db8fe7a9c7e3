//! Common error types for the PA recommender services

use thiserror::Error;

/// Common result type for PA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across PA services
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Artifact file is malformed or structurally invalid
    #[error("Invalid artifact {artifact}: {reason}")]
    InvalidArtifact { artifact: String, reason: String },

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidArtifact`]
    pub fn invalid_artifact(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArtifact {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }
}
