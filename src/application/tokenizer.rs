//! Lexer for raw argument vectors.
//!
//! Positions are character offsets into the command line obtained by
//! joining the arguments with single spaces (see [`command_line`]), so
//! every error can be underlined against that string.

use tracing::{debug, instrument, trace};

use crate::application::error::TokenizeError;
use crate::application::token::{Token, TokenKind, TokenStream};

/// Tokenizer output.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    pub tokens: TokenStream,
    /// Arguments following `--`, verbatim
    pub remaining: Vec<String>,
    /// Every character consumed, arguments separated by one space
    pub consumed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Remaining,
}

/// Space-joined form of `args`, the reference for token positions.
pub fn command_line<S: AsRef<str>>(args: &[S]) -> String {
    args.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ")
}

/// Lex `args` into tokens plus the verbatim tail after `--`.
#[instrument(level = "debug", skip(args), fields(count = args.len()))]
pub fn tokenize<S: AsRef<str>>(args: &[S]) -> Result<Tokenized, TokenizeError> {
    let mut tokenizer = Tokenizer::new(args);
    tokenizer.run()?;
    debug!(
        "tokenize: {} tokens, {} remaining",
        tokenizer.tokens.len(),
        tokenizer.remaining.len()
    );
    Ok(Tokenized {
        tokens: TokenStream::new(tokenizer.tokens),
        remaining: tokenizer.remaining,
        consumed: tokenizer.consumed,
    })
}

struct Tokenizer {
    args: Vec<Vec<char>>,
    /// Offset of each argument in the joined command line
    offsets: Vec<usize>,
    arg: usize,
    pos: usize,
    mode: Mode,
    tokens: Vec<Token>,
    remaining: Vec<String>,
    consumed: String,
}

impl Tokenizer {
    fn new<S: AsRef<str>>(args: &[S]) -> Self {
        let args: Vec<Vec<char>> = args.iter().map(|a| a.as_ref().chars().collect()).collect();
        let mut offsets = Vec::with_capacity(args.len());
        let mut offset = 0;
        for arg in &args {
            offsets.push(offset);
            offset += arg.len() + 1;
        }
        Self {
            args,
            offsets,
            arg: 0,
            pos: 0,
            mode: Mode::Normal,
            tokens: Vec::new(),
            remaining: Vec::new(),
            consumed: String::new(),
        }
    }

    fn run(&mut self) -> Result<(), TokenizeError> {
        while self.arg < self.args.len() {
            if self.mode == Mode::Remaining {
                let verbatim: String = self.args[self.arg].iter().collect();
                trace!("remaining: {:?}", verbatim);
                self.consumed.push_str(&verbatim);
                self.remaining.push(verbatim);
                self.next_arg();
                continue;
            }

            while let Some(c) = self.peek() {
                if c.is_whitespace() {
                    self.advance();
                } else if c == '-' {
                    self.scan_options()?;
                } else {
                    let token = self.scan_string(false)?;
                    self.tokens.push(token);
                }
            }
            self.next_arg();
        }
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.args.get(self.arg).and_then(|a| a.get(self.pos)).copied()
    }

    /// Consume the current character, recording it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        self.consumed.push(c);
        Some(c)
    }

    fn next_arg(&mut self) {
        self.arg += 1;
        self.pos = 0;
        if self.arg < self.args.len() {
            self.consumed.push(' ');
        }
    }

    fn position(&self) -> usize {
        self.offsets.get(self.arg).copied().unwrap_or(0) + self.pos
    }

    /// Bare or quoted text up to the end of the argument, or up to the next
    /// whitespace for attached option values.
    fn scan_string(&mut self, stop_at_whitespace: bool) -> Result<Token, TokenizeError> {
        if self.peek() == Some('"') {
            return self.scan_quoted_string();
        }

        let position = self.position();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if stop_at_whitespace && c.is_whitespace() {
                break;
            }
            self.advance();
            text.push(c);
        }
        let value = text.trim().to_string();
        Ok(Token::new(TokenKind::PlainString, position, value, text))
    }

    /// `"..."`, continuing into following arguments until the closing quote.
    fn scan_quoted_string(&mut self) -> Result<Token, TokenizeError> {
        let position = self.position();
        self.advance();

        let mut text = String::new();
        loop {
            match self.peek() {
                Some('"') => break,
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None if self.arg + 1 < self.args.len() => {
                    self.next_arg();
                    text.push(' ');
                }
                None => {
                    return Err(TokenizeError::UnterminatedQuote {
                        position,
                        value: text,
                    })
                }
            }
        }
        self.advance();

        let raw = format!("\"{text}\"");
        Ok(Token::new(TokenKind::PlainString, position, text, raw))
    }

    fn scan_options(&mut self) -> Result<(), TokenizeError> {
        let position = self.position();
        self.advance();

        match self.peek() {
            None => return Err(TokenizeError::OptionHasNoName { position }),
            Some('-') => {
                let token = self.scan_long_option(position)?;
                let is_marker = token.kind == TokenKind::RemainingMarker;
                self.tokens.push(token);
                if is_marker {
                    return Ok(());
                }
            }
            Some(_) => {
                let tokens = self.scan_short_options(position)?;
                self.tokens.extend(tokens);
            }
        }

        if let Some(separator @ ('=' | ':')) = self.peek() {
            self.advance();
            match self.peek() {
                Some(c) if !c.is_whitespace() => {
                    let mut value = self.scan_string(true)?;
                    value.attached = true;
                    trace!("option value via '{}': {:?}", separator, value.value);
                    self.tokens.push(value);
                }
                _ => {
                    return Err(TokenizeError::OptionValueExpected {
                        position: self.position(),
                    })
                }
            }
        }

        Ok(())
    }

    fn scan_short_options(&mut self, position: usize) -> Result<Vec<Token>, TokenizeError> {
        let mut result: Vec<Token> = Vec::new();

        while let Some(current) = self.peek() {
            if current.is_whitespace() || current == '=' || current == ':' {
                break;
            }
            if !current.is_alphabetic() {
                return Err(TokenizeError::InvalidShortOptionName {
                    position: self.position(),
                    character: current,
                });
            }

            let letter_position = self.position();
            self.advance();
            let value = current.to_string();
            let token = if result.is_empty() {
                Token::new(TokenKind::ShortOption, position, value.clone(), format!("-{value}"))
            } else {
                Token::new(TokenKind::ShortOption, letter_position, value.clone(), value)
            };
            result.push(token);
        }

        if result.is_empty() {
            return Err(TokenizeError::OptionHasNoName { position });
        }
        if result.len() > 1 {
            for token in &mut result {
                token.grouped = true;
            }
        }
        Ok(result)
    }

    fn scan_long_option(&mut self, position: usize) -> Result<Token, TokenizeError> {
        self.advance();

        if self.peek().is_none() {
            debug!("remaining marker at {}", position);
            self.mode = Mode::Remaining;
            return Ok(Token::new(TokenKind::RemainingMarker, position, "--", "--"));
        }

        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '=' || c == ':' || c.is_whitespace() {
                break;
            }
            self.advance();
            name.push(c);
        }

        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return Err(TokenizeError::LongOptionNameIsMissing { position }),
            (Some(_), None) => {
                return Err(TokenizeError::LongOptionNameIsOneCharacter { position, name })
            }
            (Some(first), Some(_)) if first.is_ascii_digit() => {
                return Err(TokenizeError::LongOptionNameStartsWithDigit { position, name })
            }
            _ => {}
        }
        if let Some((index, character)) = name
            .chars()
            .enumerate()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(TokenizeError::LongOptionNameContainsSymbol {
                position: position + 2 + index,
                character,
            });
        }

        let raw = format!("--{name}");
        Ok(Token::new(TokenKind::LongOption, position, name, raw))
    }
}
