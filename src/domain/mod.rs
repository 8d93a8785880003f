//! Domain layer: the declared command model
//!
//! Everything here is built once at configuration time and is independent
//! of any particular argument vector.

pub mod arena;
pub mod builder;
pub mod convert;
pub mod error;
pub mod parameter;
pub mod render;
pub mod span;
pub mod template;

pub use arena::{CommandModel, CommandNode, NodeId};
pub use builder::{CommandDeclaration, CommandModelBuilder, ParameterDeclaration};
pub use convert::{
    ConversionError, Converter, ConverterRegistry, DecompositionError, Decomposer, EnumConverter,
    PairSplitter, Value,
};
pub use error::{ConfigResult, ConfigurationError, TemplateError};
pub use parameter::{ParameterDefinition, ParameterKind, TargetShape};
pub use render::TreeNodeConvert;
pub use span::Span;
pub use template::{parse_argument, parse_option, ArgumentTemplate, OptionTemplate, Template};
