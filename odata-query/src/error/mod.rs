//! Error types

mod convert;
mod transport;
mod validation;

pub use convert::*;
pub use transport::*;
pub use validation::*;

/// Errors returned by query operations.
///
/// Only problems that prevent an HTTP response from existing at all end up
/// here. Undecodable bodies and failed conversions are reported through the
/// response itself (see [`DataError`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The builder was asked to hold an invalid fragment.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transport failed to produce a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request target could not be built from the configured host and path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A configured cookie or bearer token is not a valid header value.
    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(TransportError::Network(err))
    }
}
