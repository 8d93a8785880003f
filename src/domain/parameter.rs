//! Parameter definitions owned by command nodes.

use std::fmt;
use std::sync::Arc;

use crate::domain::convert::{Converter, Decomposer};

/// Declared shape of the property a parameter binds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetShape {
    /// Exactly one value
    #[default]
    Scalar,
    /// Every occurrence, in arrival order
    Sequence,
    /// Key/value pairs, last write wins per key
    Mapping,
    /// Key/values pairs, every value retained per key
    MultiMapping,
}

impl TargetShape {
    pub fn is_decomposable(&self) -> bool {
        matches!(self, TargetShape::Mapping | TargetShape::MultiMapping)
    }
}

/// Positional argument or named option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Argument {
        /// Zero-based declaration position among the node's arguments
        position: usize,
        value_name: String,
    },
    Option {
        short: Option<char>,
        long: Option<String>,
        value_name: Option<String>,
    },
}

/// A parameter of a command node, fully resolved at build time.
#[derive(Clone)]
pub struct ParameterDefinition {
    /// Settings property the values are assigned to
    pub property: String,
    pub kind: ParameterKind,
    /// Argument: must be supplied. Option: a value must follow the name.
    pub required: bool,
    pub shape: TargetShape,
    /// Registered type name used to look up the converter
    pub value_type: String,
    pub description: Option<String>,
    pub(crate) converter: Arc<dyn Converter>,
    pub(crate) decomposer: Option<Arc<dyn Decomposer>>,
}

impl fmt::Debug for ParameterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterDefinition")
            .field("property", &self.property)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("shape", &self.shape)
            .field("value_type", &self.value_type)
            .field("decomposable", &self.decomposer.is_some())
            .finish()
    }
}

impl ParameterDefinition {
    pub fn is_argument(&self) -> bool {
        matches!(self.kind, ParameterKind::Argument { .. })
    }

    pub fn is_option(&self) -> bool {
        matches!(self.kind, ParameterKind::Option { .. })
    }

    /// Option without a value placeholder.
    pub fn is_flag(&self) -> bool {
        matches!(
            self.kind,
            ParameterKind::Option {
                value_name: None,
                ..
            }
        )
    }

    /// More than one captured value is acceptable.
    pub fn allows_multiple(&self) -> bool {
        self.shape != TargetShape::Scalar
    }

    pub fn short_name(&self) -> Option<char> {
        match &self.kind {
            ParameterKind::Option { short, .. } => *short,
            ParameterKind::Argument { .. } => None,
        }
    }

    pub fn long_name(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Option { long, .. } => long.as_deref(),
            ParameterKind::Argument { .. } => None,
        }
    }

    pub fn matches_short(&self, name: &str, case_sensitive: bool) -> bool {
        match self.short_name() {
            Some(short) => {
                let mut buf = [0u8; 4];
                names_equal(short.encode_utf8(&mut buf), name, case_sensitive)
            }
            None => false,
        }
    }

    pub fn matches_long(&self, name: &str, case_sensitive: bool) -> bool {
        self.long_name()
            .map(|long| names_equal(long, name, case_sensitive))
            .unwrap_or(false)
    }

    /// Name used in diagnostics: value name for arguments, long or short name
    /// for options.
    pub fn display_name(&self) -> String {
        match &self.kind {
            ParameterKind::Argument { value_name, .. } => value_name.clone(),
            ParameterKind::Option { long: Some(long), .. } => long.clone(),
            ParameterKind::Option {
                short: Some(short), ..
            } => short.to_string(),
            ParameterKind::Option { .. } => self.property.clone(),
        }
    }

    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }

    pub fn decomposer(&self) -> Option<&dyn Decomposer> {
        self.decomposer.as_deref()
    }
}

pub(crate) fn names_equal(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
