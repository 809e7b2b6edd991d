//! Transport error types

/// Errors that can occur while sending a request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Any other transport specific failure.
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Creates a transport error from a message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}
