//! Lexical units produced by the tokenizer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    PlainString,
    ShortOption,
    LongOption,
    RemainingMarker,
}

/// One lexical unit, immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset into the space-joined command line
    pub position: usize,
    /// Text as written, including option markers and quotes
    pub raw: String,
    /// Decoded value: option name or unquoted string
    pub value: String,
    /// Short option scanned from a multi-letter cluster such as `-abc`
    pub grouped: bool,
    /// String introduced by `=` or `:` directly after an option
    pub attached: bool,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, position: usize, value: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            raw: raw.into(),
            value: value.into(),
            grouped: false,
            attached: false,
        }
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, TokenKind::ShortOption | TokenKind::LongOption)
    }

    /// Number of characters the raw text covers.
    pub fn width(&self) -> usize {
        self.raw.chars().count()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Forward-only cursor over tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0 }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consume the next token only if it has the given kind.
    pub fn consume_if(&mut self, kind: TokenKind) -> Option<Token> {
        match self.peek() {
            Some(token) if token.kind == kind => self.consume(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// All tokens, consumed or not.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}
