use thiserror::Error;

/// Errors returned by [`crate::CricinfoClient`] and the page parsers.
#[derive(Debug, Error)]
pub enum CricinfoError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Response body was not the JSON we expected
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON document did not contain an array at the requested pointer
    #[error("no array at JSON pointer {pointer}")]
    MissingJson { pointer: String },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A CSS selector from configuration failed to parse
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CricinfoError>;
