use core::result::Result as CoreResult;
use std::io::Error as IoError;

use reqwest::Error as ReqwestError;
use thiserror::Error;
use toml::de::Error as TomlError;

/// Result type for backend and configuration operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors raised by model backends and the configuration layer.
///
/// These never reach the caller of the feedback pipeline directly; the
/// generator folds them into a [`GenerationError`](crate::GenerationError).
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// An HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A model backend reported a failure.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Required API key was not found.
    #[error("API key not found: {0}")]
    MissingApiKey(String),

    /// Model backend returned a reply that is not structured output.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    /// The backend did not answer within the allotted time.
    #[error("Timed out after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Whether the failure is about the shape of the backend's output rather
    /// than the backend being reachable.
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::InvalidResponse(_))
    }
}
