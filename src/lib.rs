//! Declarative command trees for argument vectors.
//!
//! A host declares branches, commands and their parameters once through
//! [`domain::CommandModelBuilder`]. Each argument vector is then
//! tokenized, walked down the model into a [`application::CommandTree`]
//! and bound into typed settings by the [`application::Binder`].
//!
//! ```
//! use argtree::config::ParserSettings;
//! use argtree::domain::CommandModelBuilder;
//! use argtree::infrastructure::CommandApp;
//!
//! let mut builder = CommandModelBuilder::new();
//! builder.command("greet", |greet| {
//!     greet.argument("<NAME>", "name");
//!     greet.option("-t|--times <N>", "times").of_type("int");
//! });
//! let app = CommandApp::new(&builder, ParserSettings::default()).unwrap();
//!
//! let invocation = app.run(&["greet", "world", "--times", "3"]).unwrap();
//! assert_eq!(invocation.settings.get_str("name"), Some("world"));
//! assert_eq!(invocation.settings.get_int("times"), Some(3));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{Binder, BoundSettings, CommandTreeParser, ParseResult, SettingsTarget};
pub use config::ParserSettings;
pub use domain::{CommandModel, CommandModelBuilder, Value};
pub use infrastructure::{CommandApp, Invocation};
