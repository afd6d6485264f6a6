//! Custom error types for cobrowse
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

use crate::dom::SelectorError;

/// Main error type for cobrowse operations
#[derive(Error, Debug)]
pub enum CobrowseError {
    /// Reasoning backend connection or API errors
    #[error("Backend error: {0}")]
    Backend(String),

    /// UI tree construction or lookup errors
    #[error("Document error: {0}")]
    Document(String),

    /// Locator parsing errors
    #[error("Invalid locator: {0}")]
    Selector(#[from] SelectorError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Deferred effects need a tokio runtime to be scheduled on
    #[error("No tokio runtime available to schedule UI effects")]
    NoRuntime,

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for cobrowse operations
pub type Result<T> = std::result::Result<T, CobrowseError>;

impl CobrowseError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a document error
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }
}
