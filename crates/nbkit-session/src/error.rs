//! Error types for session lookup.

/// Result type for session lookup.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while locating a session's notebook.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The kernel connection file name did not contain a kernel id.
    #[error("Not a kernel connection file: {0}")]
    ConnectionFile(String),

    /// A notebook server answered with an error status.
    #[error("HTTP error from {url}: {status}")]
    Http { url: String, status: u16 },

    /// The request to a notebook server failed.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to serialize/deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SessionError> for nbkit_core::Error {
    fn from(err: SessionError) -> Self {
        nbkit_core::Error::Session(err.to_string())
    }
}
