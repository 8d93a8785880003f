//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Config { .. } => crate::exitcode::CONFIG,
                InfraError::CouldNotResolveType { .. } => crate::exitcode::SOFTWARE,
                InfraError::Application(ApplicationError::Parse(_)) => crate::exitcode::USAGE,
                InfraError::Application(ApplicationError::Bind(_)) => crate::exitcode::DATAERR,
                InfraError::Application(ApplicationError::Configuration(_)) => {
                    crate::exitcode::SOFTWARE
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{BindError, ParseError};

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let parse: CliError = InfraError::from(ParseError::MissingCommand {
            branch: "<root>".into(),
            position: 0,
        })
        .into();
        let bind: CliError = InfraError::from(BindError::ArityMismatch {
            property: "x".into(),
            count: 2,
        })
        .into();

        assert_eq!(parse.exit_code(), crate::exitcode::USAGE);
        assert_eq!(bind.exit_code(), crate::exitcode::DATAERR);
    }
}
