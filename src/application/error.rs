//! Parse and bind errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{ConfigurationError, Span};

/// Lexical errors, positioned in the space-joined command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("option does not have a name (position {position})")]
    OptionHasNoName { position: usize },

    #[error("expected an option value (position {position})")]
    OptionValueExpected { position: usize },

    #[error("encountered unterminated quoted string '{value}' (position {position})")]
    UnterminatedQuote { position: usize, value: String },

    #[error("short option '{character}' does not have a valid name (position {position})")]
    InvalidShortOptionName { position: usize, character: char },

    #[error("did you forget the option name? (position {position})")]
    LongOptionNameIsMissing { position: usize },

    #[error("long option '{name}' must have more than one character (position {position})")]
    LongOptionNameIsOneCharacter { position: usize, name: String },

    #[error("option '{name}' cannot start with a digit (position {position})")]
    LongOptionNameStartsWithDigit { position: usize, name: String },

    #[error("option name contains invalid character '{character}' (position {position})")]
    LongOptionNameContainsSymbol { position: usize, character: char },
}

impl TokenizeError {
    pub fn position(&self) -> usize {
        match self {
            Self::OptionHasNoName { position }
            | Self::OptionValueExpected { position }
            | Self::UnterminatedQuote { position, .. }
            | Self::InvalidShortOptionName { position, .. }
            | Self::LongOptionNameIsMissing { position }
            | Self::LongOptionNameIsOneCharacter { position, .. }
            | Self::LongOptionNameStartsWithDigit { position, .. }
            | Self::LongOptionNameContainsSymbol { position, .. } => *position,
        }
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(", did you mean '{s}'?"))
        .unwrap_or_default()
}

/// Errors raised while walking a single argument vector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("unknown command '{name}'{}", did_you_mean(.suggestion))]
    UnknownCommand {
        name: String,
        position: usize,
        suggestion: Option<String>,
    },

    #[error("unknown option '{name}'{}", did_you_mean(.suggestion))]
    UnknownOption {
        name: String,
        position: usize,
        suggestion: Option<String>,
    },

    #[error("{}missing required argument '{argument}'", command_prefix(.command))]
    MissingRequiredArgument {
        command: String,
        argument: String,
        position: usize,
    },

    #[error("option '{option}' is defined but no value has been provided")]
    MissingRequiredOptionValue { option: String, position: usize },

    #[error("unexpected trailing argument '{value}'")]
    UnexpectedTrailingArgument { value: String, position: usize },

    #[error("'{branch}' requires a command")]
    MissingCommand { branch: String, position: usize },
}

fn command_prefix(command: &str) -> String {
    if command.is_empty() {
        String::new()
    } else {
        format!("command '{command}' is ")
    }
}

impl ParseError {
    /// Offset into the space-joined command line.
    pub fn position(&self) -> usize {
        match self {
            Self::Tokenize(e) => e.position(),
            Self::UnknownCommand { position, .. }
            | Self::UnknownOption { position, .. }
            | Self::MissingRequiredArgument { position, .. }
            | Self::MissingRequiredOptionValue { position, .. }
            | Self::UnexpectedTrailingArgument { position, .. }
            | Self::MissingCommand { position, .. } => *position,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::UnknownCommand { suggestion, .. } | Self::UnknownOption { suggestion, .. } => {
                suggestion.as_deref()
            }
            _ => None,
        }
    }

    /// Caret diagnostic against the command line the error came from.
    pub fn pretty(&self, command_line: &str) -> String {
        let width = match self {
            Self::UnknownCommand { name, .. } | Self::UnexpectedTrailingArgument { value: name, .. } => {
                name.chars().count()
            }
            Self::UnknownOption { name, .. } => name.chars().count(),
            _ => 1,
        };
        format!("{}\n{}", self, Span::new(self.position(), width).underline(command_line))
    }
}

/// Errors raised while converting captured values into settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("property '{property}' expects a single value but received {count}")]
    ArityMismatch { property: String, count: usize },

    #[error("failed to convert '{raw}' for '{property}': {reason}")]
    Conversion {
        property: String,
        raw: String,
        reason: String,
    },

    #[error("failed to decompose '{raw}' for '{property}': {reason}")]
    Decomposition {
        property: String,
        raw: String,
        reason: String,
    },

    #[error("failed to assign '{property}': {reason}")]
    Assignment { property: String, reason: String },
}

/// The three error kinds of the pipeline, kept distinguishable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Bind(#[from] BindError),
}

impl From<TokenizeError> for ApplicationError {
    fn from(e: TokenizeError) -> Self {
        ApplicationError::Parse(e.into())
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_message_with_suggestion() {
        let err = ParseError::UnknownCommand {
            name: "mamal".into(),
            position: 0,
            suggestion: Some("mammal".into()),
        };
        assert_eq!(
            err.to_string(),
            "unknown command 'mamal', did you mean 'mammal'?"
        );
        assert_eq!(err.suggestion(), Some("mammal"));
    }

    #[test]
    fn test_missing_argument_message_for_root_and_command() {
        let root = ParseError::MissingRequiredArgument {
            command: String::new(),
            argument: "AGE".into(),
            position: 0,
        };
        assert_eq!(root.to_string(), "missing required argument 'AGE'");

        let dog = ParseError::MissingRequiredArgument {
            command: "dog".into(),
            argument: "AGE".into(),
            position: 0,
        };
        assert_eq!(dog.to_string(), "command 'dog' is missing required argument 'AGE'");
    }

    #[test]
    fn test_pretty_underlines_token() {
        let err = ParseError::UnknownCommand {
            name: "mamal".into(),
            position: 7,
            suggestion: None,
        };
        let pretty = err.pretty("animal mamal dog");
        assert!(pretty.ends_with("animal mamal dog\n       ^^^^^"));
    }

    #[test]
    fn test_tokenize_error_lifts_into_application_error() {
        let err: ApplicationError = TokenizeError::OptionHasNoName { position: 3 }.into();
        assert!(matches!(err, ApplicationError::Parse(ParseError::Tokenize(_))));
    }
}
