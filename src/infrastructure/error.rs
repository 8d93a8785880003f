//! Infrastructure-level errors (wraps application errors)

use thiserror::Error;

use crate::application::{ApplicationError, BindError, ParseError};
use crate::domain::ConfigurationError;

/// Infrastructure errors wrap application errors and add boundary concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("could not resolve settings type '{key}'")]
    CouldNotResolveType { key: String },

    #[error("config error: {message}")]
    Config { message: String },
}

impl From<ConfigurationError> for InfraError {
    fn from(e: ConfigurationError) -> Self {
        Self::Application(e.into())
    }
}

impl From<ParseError> for InfraError {
    fn from(e: ParseError) -> Self {
        Self::Application(e.into())
    }
}

impl From<BindError> for InfraError {
    fn from(e: BindError) -> Self {
        Self::Application(e.into())
    }
}

impl InfraError {
    /// The parse error inside, if that is what failed.
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Application(ApplicationError::Parse(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
