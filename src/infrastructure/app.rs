//! Application container
//!
//! Wires the built command model, parser settings and settings resolver,
//! and runs the whole pipeline for one argument vector.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{
    Binder, BoundCommand, BoundSettings, CommandTreeParser, ParseResult, RemainingArguments,
};
use crate::config::ParserSettings;
use crate::domain::{CommandModel, CommandModelBuilder, NodeId};
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::resolver::SettingsRegistry;
use crate::infrastructure::traits::TypeResolver;

/// Outcome of a successful run, handed to the command dispatcher.
#[derive(Debug)]
pub struct Invocation {
    /// Matched command
    pub command: NodeId,
    /// Command names from the root, root excluded
    pub path: Vec<String>,
    /// All values along the path in one map
    pub settings: BoundSettings,
    /// Resolved settings for every step that declares a settings key
    pub commands: Vec<BoundCommand>,
    pub remaining: RemainingArguments,
}

/// Container holding the immutable model and its collaborators.
///
/// Cheap to clone and safe to share between threads; every call to
/// [`CommandApp::run`] works on its own tokens, tree and settings.
#[derive(Clone)]
pub struct CommandApp {
    pub model: Arc<CommandModel>,
    pub settings: Arc<ParserSettings>,
    pub resolver: Arc<dyn TypeResolver>,
}

impl CommandApp {
    /// Build the model and resolve unregistered settings keys to
    /// [`BoundSettings`].
    pub fn new(builder: &CommandModelBuilder, settings: ParserSettings) -> InfraResult<Self> {
        let model = builder.build()?;
        Ok(Self::with_deps(
            model,
            settings,
            Arc::new(SettingsRegistry::with_fallback()),
        ))
    }

    /// Create a container with custom dependencies (for testing).
    pub fn with_deps(
        model: CommandModel,
        settings: ParserSettings,
        resolver: Arc<dyn TypeResolver>,
    ) -> Self {
        Self {
            model: Arc::new(model),
            settings: Arc::new(settings),
            resolver,
        }
    }

    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> InfraResult<ParseResult> {
        let parser = CommandTreeParser::new(&self.model, &self.settings);
        Ok(parser.parse_args(args)?)
    }

    /// Parse and bind `args`.
    #[instrument(level = "debug", skip_all, fields(args = args.len()))]
    pub fn run<S: AsRef<str>>(&self, args: &[S]) -> InfraResult<Invocation> {
        let ParseResult { tree, remaining } = self.parse(args)?;
        let binder = Binder::new(&self.model);

        let mut settings = BoundSettings::new();
        binder.bind_path(&tree, &mut settings)?;
        let commands = binder.bind_each(&tree, self.resolver.as_ref())?;

        let command = tree.leaf().command;
        let path: Vec<String> = self.model.path(command).into_iter().map(String::from).collect();
        debug!("run: {:?} with {} settings", path, settings.len());
        Ok(Invocation {
            command,
            path,
            settings,
            commands,
            remaining,
        })
    }
}
