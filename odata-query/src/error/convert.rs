//! Conversion failures and data diagnostics

/// Error returned by a conversion function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConvertError {
    message: String,
}

impl ConvertError {
    /// Creates a new conversion error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Why a response carries no typed data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// The body was not a JSON object. The decoded JSON is empty.
    #[error("Response body is not a JSON object: {0}")]
    Decode(String),

    /// The conversion function failed. The decoded JSON is kept.
    #[error("Conversion failed: {0}")]
    Convert(String),
}

impl DataError {
    /// Returns `true` if the body could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Returns `true` if the conversion function failed.
    pub fn is_convert(&self) -> bool {
        matches!(self, Self::Convert(_))
    }
}

impl From<ConvertError> for DataError {
    fn from(err: ConvertError) -> Self {
        Self::Convert(err.message)
    }
}
