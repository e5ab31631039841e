// src/error.rs

//! Unified error handling for the consent platform.

use std::fmt;

use thiserror::Error;

/// Result type alias for consent operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Vendor list and consent model disagree about a referenced id
    #[error("Contract violation in {context}: {message}")]
    Contract { context: String, message: String },

    /// Consent string could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Persistence backend failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a contract violation with context.
    pub fn contract(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Contract {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a codec error.
    pub fn codec(message: impl fmt::Display) -> Self {
        Self::Codec(message.to_string())
    }

    /// Create a storage error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }
}
