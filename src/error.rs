// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for CaptionsAI

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for CaptionsAI operations
pub type Result<T> = std::result::Result<T, CaptionsError>;

/// CaptionsAI error types
#[derive(Error, Debug)]
pub enum CaptionsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Provider error{}: {message}", status_suffix(.status))]
    Provider {
        status: Option<u16>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

/// Coarse error classification reported in results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInputError,
    ProviderError,
    ConfigurationError,
}

impl CaptionsError {
    /// Shorthand for a provider failure without an HTTP status
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Classify this error into one of the three reported kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::FileSystem(_) | Self::Image(_) => {
                ErrorKind::InvalidInputError
            }
            Self::Provider { .. } | Self::Http(_) | Self::Json(_) => ErrorKind::ProviderError,
            Self::Configuration(_) => ErrorKind::ConfigurationError,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidInputError => "InvalidInputError",
            Self::ProviderError => "ProviderError",
            Self::ConfigurationError => "ConfigurationError",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_display_includes_status() {
        let err = CaptionsError::Provider {
            status: Some(429),
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "Provider error (status 429): rate limited");

        let err = CaptionsError::provider("connection refused");
        assert_eq!(err.to_string(), "Provider error: connection refused");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CaptionsError::InvalidInput("x".into()).kind(),
            ErrorKind::InvalidInputError
        );
        assert_eq!(
            CaptionsError::Configuration("x".into()).kind(),
            ErrorKind::ConfigurationError
        );
        assert_eq!(CaptionsError::provider("x").kind(), ErrorKind::ProviderError);

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CaptionsError = io_err.into();
        assert_eq!(err.kind(), ErrorKind::InvalidInputError);
    }

    #[test]
    fn test_error_kind_serializes_by_name() {
        let json = serde_json::to_string(&ErrorKind::ProviderError).unwrap();
        assert_eq!(json, "\"ProviderError\"");
    }
}
