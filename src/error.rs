//! Error types for the book catalog client

use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::FieldErrors;

/// Message shown when the book service gave no usable explanation
pub const GENERIC_ERROR_MESSAGE: &str = "Could not reach the book service. Please try again.";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Book service returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Could not decode book service response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected book service response: {0}")]
    UnexpectedResponse(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("No book is selected")]
    NoSelection,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("A {0} request is already in flight")]
    Busy(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Text for the store's error slot.
    ///
    /// A message carried by the service response is surfaced verbatim; every
    /// other network or decoding failure collapses into one generic message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            AppError::Transport(_)
            | AppError::Api { .. }
            | AppError::Decode(_)
            | AppError::UnexpectedResponse(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
