//! Error types for the notion-blog library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Notion error: {0}")]
    Notion(#[from] NotionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while parsing Markdown and front matter.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid front matter: {0}")]
    FrontMatter(String),
}

/// Errors returned by the Notion API layer.
#[derive(Debug, Error)]
pub enum NotionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Rate limited by the Notion API")]
    RateLimited,

    #[error("Unexpected response shape: {0}")]
    Decode(String),
}

impl NotionError {
    /// Whether a request failing with this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            NotionError::RateLimited => true,
            NotionError::Api { status, .. } => *status >= 500,
            NotionError::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            NotionError::Decode(_) => false,
        }
    }
}
