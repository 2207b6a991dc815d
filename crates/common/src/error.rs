//! Error types shared across HoverIntent crates.

use std::path::PathBuf;

/// Top-level error type for HoverIntent operations.
#[derive(Debug, thiserror::Error)]
pub enum HoverIntentError {
    #[error("Invalid sensitivity {value}: must be a finite number of at least 1 pixel")]
    InvalidSensitivity { value: f64 },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transition log error: {message}")]
    TransitionLog { message: String },

    #[error("Hover intent driver is no longer running")]
    DriverClosed,

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using HoverIntentError.
pub type HoverIntentResult<T> = Result<T, HoverIntentError>;

impl HoverIntentError {
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn transition_log(msg: impl Into<String>) -> Self {
        Self::TransitionLog {
            message: msg.into(),
        }
    }
}
