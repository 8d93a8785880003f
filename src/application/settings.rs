//! Targets the binder writes converted values into.

use std::any::Any;
use std::collections::BTreeMap;

use crate::domain::Value;

/// Receives converted values by property name.
///
/// Implemented by host settings types; [`BoundSettings`] is the stock
/// property map.
pub trait SettingsTarget: Send {
    /// Store `value` under `property`; the error text is wrapped into a
    /// bind error naming the property.
    fn assign(&mut self, property: &str, value: Value) -> Result<(), String>;

    fn as_any(&self) -> &dyn Any;
}

/// Property map filled by the binder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundSettings {
    values: BTreeMap<String, Value>,
}

impl BoundSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.values.contains_key(property)
    }

    pub fn get_bool(&self, property: &str) -> Option<bool> {
        self.get(property).and_then(Value::as_bool)
    }

    pub fn get_int(&self, property: &str) -> Option<i64> {
        self.get(property).and_then(Value::as_int)
    }

    pub fn get_str(&self, property: &str) -> Option<&str> {
        self.get(property).and_then(Value::as_str)
    }

    pub fn get_list(&self, property: &str) -> Option<&[Value]> {
        match self.get(property) {
            Some(Value::List(items)) => Some(items),
            _ => None,
        }
    }

    pub fn get_map(&self, property: &str) -> Option<&BTreeMap<String, Value>> {
        match self.get(property) {
            Some(Value::Map(map)) => Some(map),
            _ => None,
        }
    }

    pub fn get_lookup(&self, property: &str) -> Option<&BTreeMap<String, Vec<Value>>> {
        match self.get(property) {
            Some(Value::Lookup(lookup)) => Some(lookup),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl SettingsTarget for BoundSettings {
    fn assign(&mut self, property: &str, value: Value) -> Result<(), String> {
        self.values.insert(property.to_string(), value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let mut settings = BoundSettings::new();
        settings.assign("age", Value::Int(7)).unwrap();
        settings.assign("alive", Value::Bool(true)).unwrap();
        settings
            .assign("tags", Value::List(vec![Value::Str("a".into())]))
            .unwrap();

        assert_eq!(settings.get_int("age"), Some(7));
        assert_eq!(settings.get_bool("alive"), Some(true));
        assert_eq!(settings.get_list("tags").map(<[Value]>::len), Some(1));
        assert_eq!(settings.get_str("age"), None);
        assert!(settings.get_map("tags").is_none());
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let target: Box<dyn SettingsTarget> = Box::new(BoundSettings::new());
        assert!(target.as_any().downcast_ref::<BoundSettings>().is_some());
    }
}
