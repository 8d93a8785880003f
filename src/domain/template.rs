//! Template grammar for arguments and options.
//!
//! ```text
//! argument := "<" NAME ">" | "[" NAME "]"
//! option   := name ("|" name)? value?
//! name     := "-" LETTER | "--" LONG
//! value    := "<" NAME ">"
//! ```
//!
//! Templates are parsed once while the command model is built. Every
//! failure is a [`TemplateError`] carrying the template and the span of the
//! offending construct.

use std::fmt;

use tracing::instrument;

use crate::domain::error::TemplateError;
use crate::domain::span::Span;

/// Parsed `<NAME>` / `[NAME]` argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentTemplate {
    pub value_name: String,
    pub required: bool,
}

/// Parsed `-x|--long <VALUE>` option template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTemplate {
    pub short: Option<char>,
    pub long: Option<String>,
    pub value_name: Option<String>,
}

impl OptionTemplate {
    /// Render back to canonical template form.
    pub fn render(&self) -> String {
        let mut names = Vec::new();
        if let Some(short) = self.short {
            names.push(format!("-{short}"));
        }
        if let Some(long) = &self.long {
            names.push(format!("--{long}"));
        }
        let mut rendered = names.join("|");
        if let Some(value) = &self.value_name {
            rendered.push_str(&format!(" <{value}>"));
        }
        rendered
    }

    /// Preferred display name: the long name if present.
    pub fn display_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }
}

impl fmt::Display for OptionTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Display for ArgumentTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "<{}>", self.value_name)
        } else {
            write!(f, "[{}]", self.value_name)
        }
    }
}

/// Either kind of template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Argument(ArgumentTemplate),
    Option(OptionTemplate),
}

impl Template {
    /// Parse a template, deciding its kind from the presence of option names.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let tokens = tokenize(template)?;
        let is_option = tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::ShortName | TokenKind::LongName));
        if is_option {
            build_option(template, &tokens).map(Template::Option)
        } else {
            build_argument(template, &tokens).map(Template::Argument)
        }
    }
}

/// Parse an argument template such as `<NAME>` or `[NAME]`.
#[instrument(level = "trace")]
pub fn parse_argument(template: &str) -> Result<ArgumentTemplate, TemplateError> {
    let tokens = tokenize(template)?;
    build_argument(template, &tokens)
}

/// Parse an option template such as `-n|--name <NAME>`.
#[instrument(level = "trace")]
pub fn parse_option(template: &str) -> Result<OptionTemplate, TemplateError> {
    let tokens = tokenize(template)?;
    build_option(template, &tokens)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    ShortName,
    LongName,
    RequiredValue,
    OptionalValue,
}

#[derive(Debug, Clone)]
struct TemplateToken {
    kind: TokenKind,
    /// Offset of the first character, including the `-`/`--`/`<`/`[` marker
    position: usize,
    /// Full length including markers
    len: usize,
    value: String,
}

impl TemplateToken {
    fn span(&self) -> Span {
        Span::new(self.position, self.len)
    }

    /// Offset of the name, past the option markers.
    fn name_offset(&self) -> usize {
        match self.kind {
            TokenKind::ShortName | TokenKind::RequiredValue | TokenKind::OptionalValue => {
                self.position + 1
            }
            TokenKind::LongName => self.position + 2,
        }
    }
}

fn is_name_terminator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '|' | '<' | '[')
}

fn tokenize(template: &str) -> Result<Vec<TemplateToken>, TemplateError> {
    let chars: Vec<char> = template.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() || c == '|' {
            i += 1;
            continue;
        }

        let start = i;
        match c {
            '-' => {
                let kind = if chars.get(i + 1) == Some(&'-') {
                    i += 2;
                    TokenKind::LongName
                } else {
                    i += 1;
                    TokenKind::ShortName
                };
                let name_start = i;
                while i < chars.len() && !is_name_terminator(chars[i]) {
                    i += 1;
                }
                tokens.push(TemplateToken {
                    kind,
                    position: start,
                    len: i - start,
                    value: chars[name_start..i].iter().collect(),
                });
            }
            '<' | '[' => {
                let (close, kind) = if c == '<' {
                    ('>', TokenKind::RequiredValue)
                } else {
                    (']', TokenKind::OptionalValue)
                };
                i += 1;
                let name_start = i;
                while i < chars.len() && chars[i] != close {
                    i += 1;
                }
                let value: String = chars[name_start..i].iter().collect();
                if i >= chars.len() {
                    return Err(TemplateError::UnterminatedValueName {
                        template: template.to_string(),
                        span: Span::new(start, i - start),
                        value,
                    });
                }
                i += 1;
                tokens.push(TemplateToken {
                    kind,
                    position: start,
                    len: i - start,
                    value,
                });
            }
            other => {
                return Err(TemplateError::UnexpectedCharacter {
                    template: template.to_string(),
                    span: Span::at(start),
                    character: other,
                });
            }
        }
    }

    Ok(tokens)
}

fn validate_value_name(template: &str, token: &TemplateToken) -> Result<(), TemplateError> {
    if token.value.is_empty() {
        return Err(TemplateError::ValuesMustHaveName {
            template: template.to_string(),
            span: token.span(),
        });
    }
    for (idx, c) in token.value.chars().enumerate() {
        let allowed = c.is_alphanumeric() || matches!(c, '_' | '.') || (c == '-' && idx > 0);
        if !allowed {
            return Err(TemplateError::InvalidCharacterInValueName {
                template: template.to_string(),
                span: Span::at(token.name_offset() + idx),
                character: c,
            });
        }
    }
    Ok(())
}

fn build_argument(template: &str, tokens: &[TemplateToken]) -> Result<ArgumentTemplate, TemplateError> {
    let mut result: Option<ArgumentTemplate> = None;

    for token in tokens {
        match token.kind {
            TokenKind::ShortName | TokenKind::LongName => {
                return Err(TemplateError::ArgumentCannotContainOptions {
                    template: template.to_string(),
                    span: token.span(),
                });
            }
            TokenKind::RequiredValue | TokenKind::OptionalValue => {
                if result.is_some() {
                    return Err(TemplateError::MultipleValuesAreNotSupported {
                        template: template.to_string(),
                        span: token.span(),
                    });
                }
                validate_value_name(template, token)?;
                result = Some(ArgumentTemplate {
                    value_name: token.value.clone(),
                    required: token.kind == TokenKind::RequiredValue,
                });
            }
        }
    }

    result.ok_or_else(|| TemplateError::ValuesMustHaveName {
        template: template.to_string(),
        span: Span::new(0, template.chars().count()),
    })
}

fn validate_short_name(template: &str, token: &TemplateToken) -> Result<char, TemplateError> {
    let mut chars = token.value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => {
            return Err(TemplateError::OptionsMustHaveName {
                template: template.to_string(),
                span: token.span(),
            })
        }
    };
    if first.is_ascii_digit() {
        return Err(TemplateError::OptionNamesCannotStartWithDigit {
            template: template.to_string(),
            span: Span::at(token.name_offset()),
        });
    }
    if chars.next().is_some() {
        return Err(TemplateError::ShortOptionMustOnlyBeOneCharacter {
            template: template.to_string(),
            span: Span::new(token.name_offset(), token.value.chars().count()),
        });
    }
    if !first.is_alphabetic() {
        return Err(TemplateError::InvalidCharacterInOptionName {
            template: template.to_string(),
            span: Span::at(token.name_offset()),
            character: first,
        });
    }
    Ok(first)
}

fn validate_long_name(template: &str, token: &TemplateToken) -> Result<String, TemplateError> {
    let value = &token.value;
    let first = match value.chars().next() {
        Some(c) => c,
        None => {
            return Err(TemplateError::OptionsMustHaveName {
                template: template.to_string(),
                span: token.span(),
            })
        }
    };
    if first.is_ascii_digit() {
        return Err(TemplateError::OptionNamesCannotStartWithDigit {
            template: template.to_string(),
            span: Span::at(token.name_offset()),
        });
    }
    if value.chars().count() == 1 {
        return Err(TemplateError::LongOptionMustHaveMoreThanOneCharacter {
            template: template.to_string(),
            span: Span::at(token.name_offset()),
        });
    }
    if let Some((idx, c)) = value
        .chars()
        .enumerate()
        .find(|(_, c)| !(c.is_alphanumeric() || matches!(c, '-' | '_')))
    {
        return Err(TemplateError::InvalidCharacterInOptionName {
            template: template.to_string(),
            span: Span::at(token.name_offset() + idx),
            character: c,
        });
    }
    Ok(value.clone())
}

fn build_option(template: &str, tokens: &[TemplateToken]) -> Result<OptionTemplate, TemplateError> {
    let mut result = OptionTemplate {
        short: None,
        long: None,
        value_name: None,
    };

    for token in tokens {
        match token.kind {
            TokenKind::ShortName => {
                if result.short.is_some() {
                    return Err(TemplateError::MultipleShortOptionNamesNotAllowed {
                        template: template.to_string(),
                        span: token.span(),
                    });
                }
                result.short = Some(validate_short_name(template, token)?);
            }
            TokenKind::LongName => {
                if result.long.is_some() {
                    return Err(TemplateError::MultipleLongOptionNamesNotAllowed {
                        template: template.to_string(),
                        span: token.span(),
                    });
                }
                result.long = Some(validate_long_name(template, token)?);
            }
            TokenKind::OptionalValue => {
                return Err(TemplateError::OptionValueCannotBeOptional {
                    template: template.to_string(),
                    span: token.span(),
                });
            }
            TokenKind::RequiredValue => {
                if result.value_name.is_some() {
                    return Err(TemplateError::MultipleOptionValuesAreNotSupported {
                        template: template.to_string(),
                        span: token.span(),
                    });
                }
                validate_value_name(template, token)?;
                result.value_name = Some(token.value.clone());
            }
        }
    }

    if result.short.is_none() && result.long.is_none() {
        return Err(TemplateError::MissingLongAndShortName {
            template: template.to_string(),
            span: Span::new(0, template.chars().count()),
        });
    }

    Ok(result)
}
