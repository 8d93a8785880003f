//! Application layer: the per-invocation pipeline
//!
//! tokenize → parse into a command tree → bind into settings. Every call
//! works on its own state; only the built model is shared.

pub mod binder;
pub mod error;
pub mod parser;
pub mod settings;
pub mod suggestor;
pub mod token;
pub mod tokenizer;
pub mod tree;

pub use binder::{Binder, BoundCommand};
pub use error::{ApplicationError, ApplicationResult, BindError, ParseError, TokenizeError};
pub use parser::CommandTreeParser;
pub use settings::{BoundSettings, SettingsTarget};
pub use suggestor::{levenshtein_distance, suggest, suggest_option};
pub use token::{Token, TokenKind, TokenStream};
pub use tokenizer::{command_line, tokenize, Tokenized};
pub use tree::{CommandTree, CommandTreeNode, MappedValue, ParseResult, RemainingArguments};
