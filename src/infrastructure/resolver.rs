//! In-process settings resolver.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, instrument};

use crate::application::{BoundSettings, SettingsTarget};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::TypeResolver;

type Factory = Box<dyn Fn() -> Box<dyn SettingsTarget> + Send + Sync>;

/// Factories per settings key.
#[derive(Default)]
pub struct SettingsRegistry {
    factories: HashMap<String, Factory>,
    fallback: bool,
}

impl fmt::Debug for SettingsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("SettingsRegistry")
            .field("keys", &keys)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve unregistered keys to an empty [`BoundSettings`].
    pub fn with_fallback() -> Self {
        Self {
            factories: HashMap::new(),
            fallback: true,
        }
    }

    pub fn register<F, T>(&mut self, key: &str, factory: F) -> &mut Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: SettingsTarget + 'static,
    {
        self.factories.insert(
            key.to_string(),
            Box::new(move || Box::new(factory()) as Box<dyn SettingsTarget>),
        );
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }
}

impl TypeResolver for SettingsRegistry {
    #[instrument(level = "trace", skip(self))]
    fn resolve(&self, key: &str) -> InfraResult<Box<dyn SettingsTarget>> {
        if let Some(factory) = self.factories.get(key) {
            return Ok(factory());
        }
        if self.fallback {
            debug!("no factory for '{}', using BoundSettings", key);
            return Ok(Box::new(BoundSettings::new()));
        }
        Err(InfraError::CouldNotResolveType {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unregistered_key_when_resolving_then_fails() {
        let registry = SettingsRegistry::new();
        let result = registry.resolve("dog");
        assert!(matches!(result, Err(InfraError::CouldNotResolveType { key }) if key == "dog"));
    }

    #[test]
    fn given_fallback_when_resolving_unknown_key_then_returns_bound_settings() {
        let registry = SettingsRegistry::with_fallback();
        let target = registry.resolve("anything").unwrap();
        assert!(target.as_any().downcast_ref::<BoundSettings>().is_some());
    }

    #[test]
    fn given_registered_factory_when_resolving_then_creates_fresh_instances() {
        let mut registry = SettingsRegistry::new();
        registry.register("dog", BoundSettings::new);

        let mut first = registry.resolve("dog").unwrap();
        first.assign("age", crate::domain::Value::Int(3)).unwrap();
        let second = registry.resolve("dog").unwrap();

        let second = second.as_any().downcast_ref::<BoundSettings>().unwrap();
        assert!(second.is_empty());
    }
}
