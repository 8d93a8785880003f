//! Configuration-time errors (no external dependencies)

use thiserror::Error;

use crate::domain::span::Span;

/// A malformed argument or option template.
///
/// Every variant carries the offending template and the span of the
/// construct that failed, so callers can point at it with [`Span::underline`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("encountered unexpected character '{character}' in template '{template}'")]
    UnexpectedCharacter {
        template: String,
        span: Span,
        character: char,
    },

    #[error("encountered unterminated value name '{value}' in template '{template}'")]
    UnterminatedValueName {
        template: String,
        span: Span,
        value: String,
    },

    #[error("arguments can not contain options: '{template}'")]
    ArgumentCannotContainOptions { template: String, span: Span },

    #[error("multiple values are not supported: '{template}'")]
    MultipleValuesAreNotSupported { template: String, span: Span },

    #[error("values without name are not allowed: '{template}'")]
    ValuesMustHaveName { template: String, span: Span },

    #[error("encountered invalid character '{character}' in value name: '{template}'")]
    InvalidCharacterInValueName {
        template: String,
        span: Span,
        character: char,
    },

    #[error("options without name are not allowed: '{template}'")]
    OptionsMustHaveName { template: String, span: Span },

    #[error("option names cannot start with a digit: '{template}'")]
    OptionNamesCannotStartWithDigit { template: String, span: Span },

    #[error("encountered invalid character '{character}' in option name: '{template}'")]
    InvalidCharacterInOptionName {
        template: String,
        span: Span,
        character: char,
    },

    #[error("long option names must consist of more than one character: '{template}'")]
    LongOptionMustHaveMoreThanOneCharacter { template: String, span: Span },

    #[error("short option names can not be longer than one character: '{template}'")]
    ShortOptionMustOnlyBeOneCharacter { template: String, span: Span },

    #[error("multiple short option names are not supported: '{template}'")]
    MultipleShortOptionNamesNotAllowed { template: String, span: Span },

    #[error("multiple long option names are not supported: '{template}'")]
    MultipleLongOptionNamesNotAllowed { template: String, span: Span },

    #[error("multiple option values are not supported: '{template}'")]
    MultipleOptionValuesAreNotSupported { template: String, span: Span },

    #[error("option values cannot be optional: '{template}'")]
    OptionValueCannotBeOptional { template: String, span: Span },

    #[error("no long or short name for option has been specified: '{template}'")]
    MissingLongAndShortName { template: String, span: Span },
}

impl TemplateError {
    /// The template that failed to parse.
    pub fn template(&self) -> &str {
        match self {
            Self::UnexpectedCharacter { template, .. }
            | Self::UnterminatedValueName { template, .. }
            | Self::ArgumentCannotContainOptions { template, .. }
            | Self::MultipleValuesAreNotSupported { template, .. }
            | Self::ValuesMustHaveName { template, .. }
            | Self::InvalidCharacterInValueName { template, .. }
            | Self::OptionsMustHaveName { template, .. }
            | Self::OptionNamesCannotStartWithDigit { template, .. }
            | Self::InvalidCharacterInOptionName { template, .. }
            | Self::LongOptionMustHaveMoreThanOneCharacter { template, .. }
            | Self::ShortOptionMustOnlyBeOneCharacter { template, .. }
            | Self::MultipleShortOptionNamesNotAllowed { template, .. }
            | Self::MultipleLongOptionNamesNotAllowed { template, .. }
            | Self::MultipleOptionValuesAreNotSupported { template, .. }
            | Self::OptionValueCannotBeOptional { template, .. }
            | Self::MissingLongAndShortName { template, .. } => template,
        }
    }

    /// Character span of the offending construct.
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedCharacter { span, .. }
            | Self::UnterminatedValueName { span, .. }
            | Self::ArgumentCannotContainOptions { span, .. }
            | Self::MultipleValuesAreNotSupported { span, .. }
            | Self::ValuesMustHaveName { span, .. }
            | Self::InvalidCharacterInValueName { span, .. }
            | Self::OptionsMustHaveName { span, .. }
            | Self::OptionNamesCannotStartWithDigit { span, .. }
            | Self::InvalidCharacterInOptionName { span, .. }
            | Self::LongOptionMustHaveMoreThanOneCharacter { span, .. }
            | Self::ShortOptionMustOnlyBeOneCharacter { span, .. }
            | Self::MultipleShortOptionNamesNotAllowed { span, .. }
            | Self::MultipleLongOptionNamesNotAllowed { span, .. }
            | Self::MultipleOptionValuesAreNotSupported { span, .. }
            | Self::OptionValueCannotBeOptional { span, .. }
            | Self::MissingLongAndShortName { span, .. } => *span,
        }
    }

    /// Caret diagnostic pointing into the template.
    pub fn pretty(&self) -> String {
        self.span().underline(self.template())
    }
}

/// Errors raised while building the command model.
///
/// These are always fatal to setup and never depend on end-user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("invalid command name '{name}'")]
    InvalidCommandName { name: String },

    #[error("command '{name}' is declared more than once under '{parent}'")]
    DuplicateCommand { parent: String, name: String },

    #[error("option '{option}' is declared more than once on '{command}'")]
    DuplicateOption { command: String, option: String },

    #[error("property '{property}' of '{command}' is already declared on its command path")]
    DuplicateProperty { command: String, property: String },

    #[error("default command '{name}' is not a child of '{parent}'")]
    UnknownDefaultCommand { parent: String, name: String },

    #[error("'{command}' is a command and cannot declare a default command")]
    DefaultCommandOnLeaf { command: String },

    #[error("'{command}' is a command and cannot declare child commands")]
    LeafWithChildren { command: String },

    #[error("required argument '{argument}' of '{command}' follows an optional argument")]
    RequiredArgumentAfterOptional { command: String, argument: String },

    #[error("variadic argument '{argument}' of '{command}' must be the last argument")]
    VariadicArgumentNotLast { command: String, argument: String },

    #[error("could not find converter for type '{value_type}' (property '{property}')")]
    NoConverterFound { property: String, value_type: String },

    #[error("the option '{property}' is both marked as pair deconstructable and convertable")]
    AmbiguousPairDecomposition { property: String },

    #[error(
        "the option '{property}' is marked as pair deconstructable, but the underlying type does not support that"
    )]
    NotDecomposable { property: String },

    #[error("no pair decomposition available for mapping '{property}' of type '{value_type}'")]
    MissingDecomposer { property: String, value_type: String },

    #[error("flag '{property}' must be boolean, found '{value_type}'")]
    FlagMustBeBoolean { property: String, value_type: String },
}

/// Result type for model construction.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_points_at_span() {
        let err = TemplateError::OptionNamesCannotStartWithDigit {
            template: "-1|--one".to_string(),
            span: Span::at(1),
        };
        assert_eq!(err.pretty(), "-1|--one\n ^");
        assert_eq!(err.template(), "-1|--one");
    }

    #[test]
    fn test_configuration_error_wraps_template_error() {
        let err: ConfigurationError = TemplateError::OptionsMustHaveName {
            template: "--".to_string(),
            span: Span::new(0, 2),
        }
        .into();
        assert!(err.to_string().contains("options without name"));
    }
}
