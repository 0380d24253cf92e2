//! Squeezebox Controller Error Types
//!
//! Centralized error handling for the matching engine and the player client.

use thiserror::Error;

/// Central error type for the controller
#[derive(Error, Debug)]
pub enum SqueezeError {
    /// An alternation pattern could not be expanded
    #[error("Malformed pattern '{pattern}': {reason} at position {position}")]
    MalformedPattern {
        pattern: String,
        position: usize,
        reason: &'static str,
    },

    /// Something the end user asked for cannot be satisfied (empty term, nothing found)
    #[error("{0}")]
    User(String),

    /// The caller supplied missing or invalid arguments
    #[error("Invalid request: {0}")]
    Request(String),

    #[error("Player error: {0}")]
    Player(String),

    /// The server answered with a document we could not interpret
    #[error("Server response error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SqueezeError {
    /// True for errors meant to be read out to the user as-is
    pub fn is_user_facing(&self) -> bool {
        matches!(self, SqueezeError::User(_))
    }
}

/// Result type alias for controller operations
pub type SqueezeResult<T> = Result<T, SqueezeError>;
