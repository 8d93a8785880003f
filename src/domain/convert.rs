//! Typed values and the pluggable conversion capabilities.
//!
//! Converters turn one raw captured string into a [`Value`]; decomposers split
//! a raw string into a key/value pair before conversion for mapping targets.
//! Both are registered per target type name in a [`ConverterRegistry`] that
//! is consulted once, while the command model is built.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use itertools::Itertools;
use thiserror::Error;

/// Built-in type names.
pub mod types {
    pub const STRING: &str = "string";
    pub const BOOL: &str = "bool";
    pub const INT: &str = "int";
    pub const UINT: &str = "uint";
    pub const FLOAT: &str = "float";
    pub const CHAR: &str = "char";
    pub const PATH: &str = "path";
}

/// A converted, typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    Path(PathBuf),
    /// Declared spelling of an enum variant
    Enum(String),
    /// Sequence target, arrival order
    List(Vec<Value>),
    /// Mapping target, last write wins per key
    Map(BTreeMap<String, Value>),
    /// Multi-mapping target, every value per key in arrival order
    Lookup(BTreeMap<String, Vec<Value>>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) | Value::Enum(s) => f.write_str(s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Map(map) => write!(
                f,
                "{{{}}}",
                map.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
            ),
            Value::Lookup(map) => write!(
                f,
                "{{{}}}",
                map.iter()
                    .map(|(k, v)| format!("{k}: [{}]", v.iter().join(", ")))
                    .join(", ")
            ),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConversionError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DecompositionError(pub String);

/// String-to-value conversion for one target type.
pub trait Converter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError>;
}

impl<F> Converter for F
where
    F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync,
{
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        self(raw)
    }
}

/// Splits a raw captured value into a key and a raw value.
pub trait Decomposer: Send + Sync {
    fn decompose(&self, raw: &str) -> Result<(String, String), DecompositionError>;
}

/// Default decomposition: split on the first occurrence of `separator`.
#[derive(Debug, Clone, Copy)]
pub struct PairSplitter {
    pub separator: char,
}

impl Default for PairSplitter {
    fn default() -> Self {
        Self { separator: '=' }
    }
}

impl Decomposer for PairSplitter {
    fn decompose(&self, raw: &str) -> Result<(String, String), DecompositionError> {
        raw.split_once(self.separator)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .ok_or_else(|| {
                DecompositionError(format!(
                    "could not parse pair '{}': missing '{}'",
                    raw, self.separator
                ))
            })
    }
}

struct StringConverter;

impl Converter for StringConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::Str(raw.to_string()))
    }
}

struct BoolConverter;

impl Converter for BoolConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(ConversionError(format!("'{raw}' is not a valid boolean"))),
        }
    }
}

struct IntConverter;

impl Converter for IntConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| ConversionError(format!("'{raw}' is not a valid integer: {e}")))
    }
}

struct UIntConverter;

impl Converter for UIntConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.trim()
            .parse::<u64>()
            .map(Value::UInt)
            .map_err(|e| ConversionError(format!("'{raw}' is not a valid unsigned integer: {e}")))
    }
}

struct FloatConverter;

impl Converter for FloatConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        raw.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| ConversionError(format!("'{raw}' is not a valid number: {e}")))
    }
}

struct CharConverter;

impl Converter for CharConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Char(c)),
            _ => Err(ConversionError(format!("'{raw}' is not a single character"))),
        }
    }
}

struct PathConverter;

impl Converter for PathConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::Path(PathBuf::from(raw)))
    }
}

/// Case-insensitive match against a fixed set of variants.
#[derive(Debug, Clone)]
pub struct EnumConverter {
    variants: Vec<String>,
}

impl EnumConverter {
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

impl Converter for EnumConverter {
    fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
        self.variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(raw))
            .map(|v| Value::Enum(v.clone()))
            .ok_or_else(|| {
                ConversionError(format!(
                    "'{}' is not one of: {}",
                    raw,
                    self.variants.iter().join(", ")
                ))
            })
    }
}

/// Lookup table of converters and decomposers keyed by type name.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn Converter>>,
    decomposers: HashMap<String, Arc<dyn Decomposer>>,
    /// Types whose values never split into pairs
    atomic: HashSet<String>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("converters", &self.converters.keys().sorted().collect::<Vec<_>>())
            .field("decomposers", &self.decomposers.keys().sorted().collect::<Vec<_>>())
            .field("atomic", &self.atomic.iter().sorted().collect::<Vec<_>>())
            .finish()
    }
}

impl ConverterRegistry {
    /// Registry pre-populated with the built-in primitive converters.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(types::STRING, StringConverter);
        registry.register(types::BOOL, BoolConverter);
        registry.register(types::INT, IntConverter);
        registry.register(types::UINT, UIntConverter);
        registry.register(types::FLOAT, FloatConverter);
        registry.register(types::CHAR, CharConverter);
        registry.register(types::PATH, PathConverter);
        registry
    }

    /// Registry without any converters.
    pub fn empty() -> Self {
        Self {
            converters: HashMap::new(),
            decomposers: HashMap::new(),
            atomic: HashSet::new(),
        }
    }

    /// Register a converter; mappings of this type split pairs on `=`
    /// unless a decomposer is registered for it.
    pub fn register<C: Converter + 'static>(&mut self, type_name: impl Into<String>, converter: C) {
        let type_name = type_name.into();
        self.atomic.remove(&type_name);
        self.converters.insert(type_name, Arc::new(converter));
    }

    /// Register a converter for a type that cannot be a mapping value
    /// without an explicit decomposer.
    pub fn register_atomic<C: Converter + 'static>(
        &mut self,
        type_name: impl Into<String>,
        converter: C,
    ) {
        let type_name = type_name.into();
        self.converters.insert(type_name.clone(), Arc::new(converter));
        self.atomic.insert(type_name);
    }

    pub fn register_enum<I, S>(&mut self, type_name: impl Into<String>, variants: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(type_name, EnumConverter::new(variants));
    }

    /// Register a decomposer used for mappings whose value type is `type_name`.
    pub fn register_decomposer<D: Decomposer + 'static>(
        &mut self,
        type_name: impl Into<String>,
        decomposer: D,
    ) {
        self.decomposers.insert(type_name.into(), Arc::new(decomposer));
    }

    pub fn converter(&self, type_name: &str) -> Option<Arc<dyn Converter>> {
        self.converters.get(type_name).cloned()
    }

    /// Registered decomposer, or the default `=` splitter for convertible
    /// types that are not atomic.
    pub fn decomposer(&self, type_name: &str) -> Option<Arc<dyn Decomposer>> {
        match self.decomposers.get(type_name) {
            Some(d) => Some(Arc::clone(d)),
            None if self.is_decomposable(type_name) => Some(Arc::new(PairSplitter::default())),
            None => None,
        }
    }

    fn is_decomposable(&self, type_name: &str) -> bool {
        self.converters.contains_key(type_name) && !self.atomic.contains(type_name)
    }
}
