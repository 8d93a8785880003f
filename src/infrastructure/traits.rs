//! Boundary traits for collaborators outside the parsing core
//!
//! Settings instantiation is requested from a resolver keyed by the
//! settings key a command declares, so hosts and tests can plug in their
//! own construction.

use crate::application::SettingsTarget;
use crate::infrastructure::error::InfraResult;

/// Creates settings instances by key.
pub trait TypeResolver: Send + Sync {
    /// A fresh, assignable instance for `key`, or
    /// [`crate::infrastructure::InfraError::CouldNotResolveType`].
    fn resolve(&self, key: &str) -> InfraResult<Box<dyn SettingsTarget>>;
}
