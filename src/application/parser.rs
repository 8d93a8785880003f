//! Walks a token stream down the command model.
//!
//! The walk starts at the root and keeps exactly one live path. Plain strings
//! fill pending arguments or select children, options are looked up on the
//! current command and then on its ancestors, and whatever the path does not
//! consume ends up in [`RemainingArguments`].

use std::collections::BTreeMap;

use tracing::{debug, instrument, trace};

use crate::application::error::ParseError;
use crate::application::suggestor::{suggest, suggest_option};
use crate::application::token::{Token, TokenKind, TokenStream};
use crate::application::tokenizer::{tokenize, Tokenized};
use crate::application::tree::{CommandTree, MappedValue, ParseResult, RemainingArguments};
use crate::config::ParserSettings;
use crate::domain::{CommandModel, CommandNode, NodeId, ParameterDefinition};

/// Stateless parser over a shared, immutable model.
#[derive(Debug, Clone, Copy)]
pub struct CommandTreeParser<'m> {
    model: &'m CommandModel,
    settings: &'m ParserSettings,
}

impl<'m> CommandTreeParser<'m> {
    pub fn new(model: &'m CommandModel, settings: &'m ParserSettings) -> Self {
        Self { model, settings }
    }

    /// Tokenize and parse in one step.
    pub fn parse_args<S: AsRef<str>>(&self, args: &[S]) -> Result<ParseResult, ParseError> {
        self.parse(tokenize(args)?)
    }

    #[instrument(level = "debug", skip(self, tokenized), fields(tokens = tokenized.tokens.len()))]
    pub fn parse(&self, tokenized: Tokenized) -> Result<ParseResult, ParseError> {
        let Tokenized {
            mut tokens,
            remaining: tail,
            consumed,
        } = tokenized;
        let end = consumed.chars().count();

        let mut walk = Walk {
            model: self.model,
            settings: self.settings,
            tree: CommandTree::new(self.model.root()),
            surplus: Vec::new(),
        };

        while let Some(token) = tokens.consume() {
            match token.kind {
                TokenKind::RemainingMarker => break,
                TokenKind::ShortOption | TokenKind::LongOption => {
                    walk.option(&token, &mut tokens)?
                }
                TokenKind::PlainString => walk.plain(token)?,
            }
        }

        walk.finish(end)?;
        walk.check_required(end)?;

        let remaining = self.remaining(walk.surplus, tail);
        debug!(
            "parse: path '{}', {} remaining",
            walk.tree.path(self.model).join(" "),
            remaining.raw.len()
        );
        Ok(ParseResult {
            tree: walk.tree,
            remaining,
        })
    }

    fn remaining(&self, surplus: Vec<String>, tail: Vec<String>) -> RemainingArguments {
        let parsed = if self.settings.parse_remaining_pairs {
            parse_pairs(&tail)
        } else {
            BTreeMap::new()
        };
        let mut raw = surplus;
        raw.extend(tail);
        RemainingArguments { raw, parsed }
    }
}

/// `--key value`, `--key=value` and `--key:value` items; a key without
/// value maps to an empty string.
fn parse_pairs(items: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut parsed: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut iter = items.iter().peekable();

    while let Some(item) = iter.next() {
        if !is_key(item) {
            continue;
        }
        let (key, value) = match item.find(['=', ':']) {
            Some(idx) => (item[..idx].to_string(), item[idx + 1..].to_string()),
            None => match iter.next_if(|next| !is_key(next)) {
                Some(next) => (item.clone(), next.clone()),
                None => (item.clone(), String::new()),
            },
        };
        trace!("remaining pair {} = {:?}", key, value);
        parsed.entry(key).or_default().push(value);
    }
    parsed
}

/// `-x` and `--x` are keys; `-5` is a negative number, so a value.
fn is_key(item: &str) -> bool {
    let mut chars = item.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| !c.is_ascii_digit())
}

struct Walk<'m> {
    model: &'m CommandModel,
    settings: &'m ParserSettings,
    tree: CommandTree,
    surplus: Vec<String>,
}

impl<'m> Walk<'m> {
    fn current(&self) -> NodeId {
        self.tree.leaf().command
    }

    fn current_index(&self) -> usize {
        self.tree.len() - 1
    }

    fn descend(&mut self, child: NodeId) {
        trace!("descend into '{}'", self.model.node(child));
        self.tree.descend(child);
    }

    fn capture(&mut self, tree_index: usize, parameter: usize, value: String, position: usize) {
        trace!("capture #{} = {:?}", parameter, value);
        if let Some(step) = self.tree.get_mut(tree_index) {
            step.mapped.push(MappedValue {
                parameter,
                value,
                position,
            });
        }
    }

    /// Next argument of the current command without a value, optionally
    /// restricted to required ones.
    fn next_free_argument(&self, node: &CommandNode, required_only: bool) -> Option<usize> {
        let step = self.tree.leaf();
        node.arguments()
            .filter(|(_, p)| !required_only || p.required)
            .find(|(i, _)| !step.has_value(*i))
            .map(|(i, _)| i)
    }

    fn plain(&mut self, token: Token) -> Result<(), ParseError> {
        let model = self.model;
        let idx = self.current();
        let node = model.node(idx);

        if node.is_leaf || node.children.is_empty() {
            return self.trailing(node, token);
        }

        if let Some(parameter) = self.next_free_argument(node, true) {
            self.capture(self.current_index(), parameter, token.value, token.position);
            return Ok(());
        }
        if let Some(child) = model.find_child(idx, &token.value, self.settings.case_sensitive) {
            debug!("matched command '{}'", token.value);
            self.descend(child);
            return Ok(());
        }
        if let Some(parameter) = self.next_free_argument(node, false) {
            self.capture(self.current_index(), parameter, token.value, token.position);
            return Ok(());
        }
        if let Some(default) = node.default_child {
            debug!("'{}' falls through to default command", token.value);
            self.descend(default);
            return self.plain(token);
        }

        let suggestion = if self.settings.suggestions {
            suggest(model, Some(idx), &token.value, self.settings.suggestion_distance)
                .map(|s| model.node(s).name.clone())
        } else {
            None
        };
        Err(ParseError::UnknownCommand {
            name: token.value,
            position: token.position,
            suggestion,
        })
    }

    /// Plain string once no further command can be selected.
    fn trailing(&mut self, node: &CommandNode, token: Token) -> Result<(), ParseError> {
        let index = self.current_index();
        if let Some(parameter) = self.next_free_argument(node, false) {
            self.capture(index, parameter, token.value, token.position);
            return Ok(());
        }
        if let Some((parameter, _)) = node.arguments().last().filter(|(_, p)| p.allows_multiple())
        {
            self.capture(index, parameter, token.value, token.position);
            return Ok(());
        }
        if self.settings.strict {
            return Err(ParseError::UnexpectedTrailingArgument {
                value: token.value,
                position: token.position,
            });
        }
        trace!("surplus {:?}", token.value);
        self.surplus.push(token.value);
        Ok(())
    }

    /// Option of `node` named by `token`.
    fn declared_on(&self, node: NodeId, token: &Token) -> Option<(usize, &'m ParameterDefinition)> {
        let model = self.model;
        let case_sensitive = self.settings.case_sensitive;
        model.node(node).options().find(|(_, p)| match token.kind {
            TokenKind::ShortOption => p.matches_short(&token.value, case_sensitive),
            _ => p.matches_long(&token.value, case_sensitive),
        })
    }

    /// Look the option up on the path, then along the default commands
    /// below the current node, descending into the one declaring it.
    fn find_option(&mut self, token: &Token) -> Option<(NodeId, usize, &'m ParameterDefinition)> {
        let model = self.model;
        let on_path = model
            .ancestors(self.current())
            .find_map(|owner| self.declared_on(owner, token).map(|(i, p)| (owner, i, p)));
        if on_path.is_some() {
            return on_path;
        }

        let mut defaults = Vec::new();
        let mut next = model.node(self.current()).default_child;
        while let Some(default) = next {
            defaults.push(default);
            if let Some((i, p)) = self.declared_on(default, token) {
                for &step in &defaults {
                    debug!("option '{}' enters default command '{}'", token.raw, model.node(step));
                    self.descend(step);
                }
                return Some((default, i, p));
            }
            next = model.node(default).default_child;
        }
        None
    }

    fn option(&mut self, token: &Token, tokens: &mut TokenStream) -> Result<(), ParseError> {
        let model = self.model;
        let display = match token.kind {
            TokenKind::ShortOption => format!("-{}", token.value),
            _ => format!("--{}", token.value),
        };

        let Some((owner, parameter, definition)) = self.find_option(token) else {
            // single letters are too short for a meaningful edit distance
            let suggestion = if self.settings.suggestions && token.kind == TokenKind::LongOption {
                suggest_option(
                    model,
                    self.current(),
                    &token.value,
                    self.settings.suggestion_distance,
                )
                .map(|s| format!("--{s}"))
            } else {
                None
            };
            return Err(ParseError::UnknownOption {
                name: display,
                position: token.position,
                suggestion,
            });
        };

        let tree_index = self
            .tree
            .iter()
            .position(|step| step.command == owner)
            .unwrap_or_else(|| self.current_index());

        if definition.is_flag() {
            match tokens.peek() {
                Some(next) if next.kind == TokenKind::PlainString && next.attached => {
                    if let Some(value) = tokens.consume() {
                        self.capture(tree_index, parameter, value.value, value.position);
                    }
                }
                _ => self.capture(tree_index, parameter, "true".to_string(), token.position),
            }
            return Ok(());
        }

        match tokens.consume_if(TokenKind::PlainString) {
            Some(value) => {
                self.capture(tree_index, parameter, value.value, value.position);
                Ok(())
            }
            None => Err(ParseError::MissingRequiredOptionValue {
                option: display,
                position: token.position,
            }),
        }
    }

    /// Follow default commands until the walk rests on a command.
    fn finish(&mut self, end: usize) -> Result<(), ParseError> {
        let model = self.model;
        loop {
            let node = model.node(self.current());
            if node.is_leaf || node.children.is_empty() {
                return Ok(());
            }
            match node.default_child {
                Some(default) => {
                    debug!("input ended on '{}', using default command", node);
                    self.descend(default);
                }
                None => {
                    return Err(ParseError::MissingCommand {
                        branch: node.display_name().to_string(),
                        position: end,
                    })
                }
            }
        }
    }

    fn check_required(&self, end: usize) -> Result<(), ParseError> {
        for step in &self.tree {
            let node = self.model.node(step.command);
            if let Some((_, missing)) = node
                .arguments()
                .find(|(i, p)| p.required && !step.has_value(*i))
            {
                return Err(ParseError::MissingRequiredArgument {
                    command: node.name.clone(),
                    argument: missing.display_name(),
                    position: end,
                });
            }
        }
        Ok(())
    }
}
