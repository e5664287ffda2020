//! Custom error types for the GlyphBots bot.
//!
//! This module provides a centralized error handling system with specific error types
//! for the external services and the storage layer.

use std::fmt;

/// Main error type for GlyphBots operations.
#[derive(Debug)]
pub enum GlyphBotsError {
    /// Configuration errors (missing env vars, invalid values)
    Config(String),
    /// Database operation errors
    Database(String),
    /// GlyphBots REST API errors
    GlyphBotsApi(String),
    /// OpenSea API errors
    OpenSea(String),
    /// Generative AI API errors, with the HTTP status when one was received
    GenAi {
        status: Option<u16>,
        message: String,
    },
    /// Network/HTTP transport errors
    Network(String),
    /// Discord errors
    Discord(String),
    /// Validation errors (token ids out of range, etc.)
    Validation(String),
    /// Generic I/O errors
    Io(std::io::Error),
    /// Invalid input errors
    InvalidInput(String),
}

impl GlyphBotsError {
    /// Build an AI error from an HTTP status and response text.
    pub fn gen_ai(status: u16, message: impl Into<String>) -> Self {
        Self::GenAi {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Whether another attempt at the same request could succeed.
    ///
    /// Transport failures, rate limits and server-side errors are retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::GenAi { status: Some(status), .. } => *status == 429 || *status >= 500,
            Self::GenAi { status: None, .. } => false,
            _ => false,
        }
    }
}

impl fmt::Display for GlyphBotsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
            Self::GlyphBotsApi(msg) => write!(f, "GlyphBots API error: {}", msg),
            Self::OpenSea(msg) => write!(f, "OpenSea API error: {}", msg),
            Self::GenAi { status: Some(status), message } => {
                write!(f, "AI API error ({}): {}", status, message)
            }
            Self::GenAi { status: None, message } => write!(f, "AI API error: {}", message),
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::Discord(msg) => write!(f, "Discord error: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for GlyphBotsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlyphBotsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GlyphBotsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<rusqlite::Error> for GlyphBotsError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<reqwest::Error> for GlyphBotsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GlyphBotsError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for GlyphBotsError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Database(format!("Task join error: {}", err))
    }
}

impl From<poise::serenity_prelude::Error> for GlyphBotsError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        Self::Discord(err.to_string())
    }
}

/// Result type alias for GlyphBots operations.
pub type Result<T> = std::result::Result<T, GlyphBotsError>;
