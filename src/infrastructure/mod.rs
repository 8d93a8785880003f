//! Infrastructure layer: boundary traits, resolver and application container
//!
//! This layer connects the parsing pipeline to the host: settings
//! instantiation and wiring of model, settings and resolver.

pub mod app;
pub mod error;
pub mod resolver;
pub mod traits;

pub use app::{CommandApp, Invocation};
pub use error::{InfraError, InfraResult};
pub use resolver::SettingsRegistry;
pub use traits::TypeResolver;
