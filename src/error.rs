//! Error types for the pagegen library

use thiserror::Error;

/// Main error type for question synthesis and page rendering
#[derive(Error, Debug)]
pub enum PagegenError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid product: {message}")]
    InvalidProduct { message: String },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Fallback exhausted: produced {produced} of {requested} questions")]
    FallbackExhausted { requested: usize, produced: usize },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<serde_json::Error> for PagegenError {
    fn from(err: serde_json::Error) -> Self {
        PagegenError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for PagegenError {
    fn from(err: std::io::Error) -> Self {
        PagegenError::Io {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for PagegenError {
    fn from(err: reqwest::Error) -> Self {
        PagegenError::Model {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for PagegenError {
    fn from(err: toml::de::Error) -> Self {
        PagegenError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type alias for pagegen operations
pub type Result<T> = std::result::Result<T, PagegenError>;
