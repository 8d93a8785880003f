//! Command dispatch for the demo binary

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{command_line, tokenize, ParseError};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, ParserSettings};
use crate::domain::{CommandModelBuilder, Span, TreeNodeConvert};
use crate::infrastructure::{CommandApp, InfraError};

const APP: &str = "argtree";

/// The model the demo binary parses against.
pub fn demo_model() -> CommandModelBuilder {
    let mut builder = CommandModelBuilder::new();
    builder
        .root()
        .option("-v|--verbose", "verbose")
        .describe("Verbose output");
    builder.registry_mut().register_enum("color", ["brown", "white", "black"]);

    builder.branch("animal", |animal| {
        animal
            .describe("All animals")
            .settings("animal")
            .option("-a|--alive", "is_alive")
            .describe("Animal is alive");

        animal.branch("mammal", |mammal| {
            mammal.describe("Mammals").default_command("dog");
            mammal.command("dog", |dog| {
                dog.settings("dog");
                dog.argument("<AGE>", "age").of_type("uint");
                dog.option("-n|--name <NAME>", "name");
            });
            mammal.command("horse", |horse| {
                horse.settings("horse");
                horse.option("-s|--speed <SPEED>", "speed").of_type("float");
                horse.option("-c|--color <COLOR>", "color").of_type("color");
            });
        });

        animal.command("bird", |bird| {
            bird.settings("bird");
            bird.argument("[WINGSPAN]", "wingspan").of_type("float");
            bird.option("-t|--tag <TAG>", "tags").sequence();
            bird.option("-m|--meta <PAIR>", "meta").mapping();
            bird.option("-l|--label <PAIR>", "labels").multi_mapping();
        });
    });
    builder
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Parse { args } => run_parse(cli, args),
        Commands::Tokenize { args } => run_tokenize(args),
        Commands::Tree => run_tree(),
        Commands::Config { command } => run_config(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, APP, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_settings(cli: &Cli) -> CliResult<ParserSettings> {
    Ok(ParserSettings::load(APP, cli.config.as_deref())?)
}

#[instrument(level = "debug", skip(cli))]
fn run_parse(cli: &Cli, args: &[String]) -> CliResult<()> {
    let app = CommandApp::new(&demo_model(), load_settings(cli)?)?;

    let invocation = app.run(args).map_err(|e| {
        if let Some(parse_error) = e.as_parse_error() {
            let line = command_line(args);
            output::hint(&format!(
                "\n{}",
                Span::at(parse_error.position()).underline(&line)
            ));
        }
        CliError::from(e)
    })?;
    debug!("invocation: {:?}", invocation);

    output::action("command", &invocation.path.join(" "));
    output::header("settings");
    for (property, value) in invocation.settings.iter() {
        output::detail(&format!("{property} = {value}"));
    }
    for bound in &invocation.commands {
        output::detail(&format!("resolved '{}'", bound.key));
    }
    if !invocation.remaining.is_empty() {
        output::header("remaining");
        output::detail(&invocation.remaining.raw.join(" "));
        for (key, values) in &invocation.remaining.parsed {
            output::detail(&format!("{key} = [{}]", values.join(", ")));
        }
    }
    Ok(())
}

fn run_tokenize(args: &[String]) -> CliResult<()> {
    let tokenized =
        tokenize(args).map_err(|e| CliError::from(InfraError::from(ParseError::from(e))))?;
    for token in tokenized.tokens.tokens() {
        let grouped = if token.grouped { " (grouped)" } else { "" };
        output::info(&format!(
            "{:>3}  {:<15} {}{}",
            token.position,
            format!("{:?}", token.kind),
            token.raw,
            grouped
        ));
    }
    if !tokenized.remaining.is_empty() {
        output::action("remaining", &tokenized.remaining.join(" "));
    }
    Ok(())
}

fn run_tree() -> CliResult<()> {
    let model = demo_model().build().map_err(InfraError::from)?;
    output::info(&model.to_tree_string());
    Ok(())
}

fn run_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&ParserSettings::template(APP)),
        ConfigCommands::Path => match global_config_path(APP) {
            Some(path) => output::action("global", &path.display()),
            None => {
                return Err(CliError::Usage(
                    "no home directory to derive the config path from".to_string(),
                ))
            }
        },
    }
    Ok(())
}
