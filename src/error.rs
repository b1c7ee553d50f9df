use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `SeirdError` and maps other errors to
/// convert to a `SeirdError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SeirdError {
    /// Bad input: non-positive rates, out-of-range probabilities, weights that
    /// do not sum to one, or impossible population bounds.
    InvalidParameter(String),
    /// The solver failed to converge or produced non-finite values.
    IntegrationError(String),
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
}

impl SeirdError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SeirdError::InvalidParameter(message.into())
    }

    pub(crate) fn integration(message: impl Into<String>) -> Self {
        SeirdError::IntegrationError(message.into())
    }
}

impl From<io::Error> for SeirdError {
    fn from(error: io::Error) -> Self {
        SeirdError::IoError(error)
    }
}

impl From<serde_json::Error> for SeirdError {
    fn from(error: serde_json::Error) -> Self {
        SeirdError::JsonError(error)
    }
}

impl From<csv::Error> for SeirdError {
    fn from(error: csv::Error) -> Self {
        SeirdError::CsvError(error)
    }
}

impl std::error::Error for SeirdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeirdError::IoError(error) => Some(error),
            SeirdError::JsonError(error) => Some(error),
            SeirdError::CsvError(error) => Some(error),
            SeirdError::InvalidParameter(_) | SeirdError::IntegrationError(_) => None,
        }
    }
}

impl Display for SeirdError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SeirdError::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
            SeirdError::IntegrationError(message) => write!(f, "integration failed: {message}"),
            SeirdError::IoError(error) => write!(f, "Error: {error:?}"),
            SeirdError::JsonError(error) => write!(f, "Error: {error:?}"),
            SeirdError::CsvError(error) => write!(f, "Error: {error:?}"),
        }
    }
}
