//! Error taxonomy shared by the workflow, the API client and the dashboard.
//!
use thiserror::Error;

/// Errors surfaced to the admin. None of them are fatal: the active dialog
/// is redisplayed with a message and the admin may retry or cancel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Local check that failed before any request was made.
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-2xx status.
    #[error("request failed with status {status}")]
    Request {
        status: u16,
        /// Message taken from the `{ "error": ... }` payload, if any.
        message: Option<String>,
    },

    /// The request could not complete.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Text shown to the admin. Server-provided messages win over `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Request { message: Some(msg), .. } if !msg.trim().is_empty() => msg.clone(),
            AppError::Request { .. } | AppError::Network(_) | AppError::Decode(_) => {
                fallback.to_string()
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
