//! Type-directed coercion of document nodes onto typed setting values.
//!
//! A document node carries a dynamic type ([`NodeType`]); a setting has a
//! static destination type. [`SettingValue`] is the capability that connects
//! the two. Built-in implementations cover booleans, the integer and float
//! primitives, strings, homogeneous arrays and serde-bound objects. Any other
//! type can take part by implementing the trait itself.

mod error;
mod scalar;
mod structured;

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

pub use error::CoercionError;
pub use structured::{Object, OBJECT_PLACEHOLDER};

/// The static destination kind of a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Kind {
    Boolean,
    Integer,
    Unsigned,
    Float,
    String,
    Array(Box<Kind>),
    Object,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Boolean => f.write_str("boolean"),
            Kind::Integer => f.write_str("integer"),
            Kind::Unsigned => f.write_str("unsigned"),
            Kind::Float => f.write_str("float"),
            Kind::String => f.write_str("string"),
            Kind::Array(element) => write!(f, "array<{element}>"),
            Kind::Object => f.write_str("object"),
        }
    }
}

/// The dynamic type tag of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Null,
    Boolean,
    /// A whole number below zero.
    Integer,
    /// A whole number at or above zero.
    Unsigned,
    Float,
    String,
    Array,
    Object,
}

impl NodeType {
    pub fn of(node: &Value) -> Self {
        match node {
            Value::Null => NodeType::Null,
            Value::Bool(_) => NodeType::Boolean,
            Value::Number(n) if n.is_u64() => NodeType::Unsigned,
            Value::Number(n) if n.is_i64() => NodeType::Integer,
            Value::Number(_) => NodeType::Float,
            Value::String(_) => NodeType::String,
            Value::Array(_) => NodeType::Array,
            Value::Object(_) => NodeType::Object,
        }
    }

    /// Whether the loader dispatches nodes of this type to a coercion at all.
    pub fn is_supported(self) -> bool {
        !matches!(self, NodeType::Null)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Null => "null",
            NodeType::Boolean => "boolean",
            NodeType::Integer => "integer",
            NodeType::Unsigned => "unsigned",
            NodeType::Float => "float",
            NodeType::String => "string",
            NodeType::Array => "array",
            NodeType::Object => "object",
        };
        f.write_str(name)
    }
}

/// What an array setting holds after one of its elements fails to coerce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayFailureMode {
    /// The array keeps its full contents from before the assignment.
    #[default]
    KeepPrevious,
    /// The array is cleared and keeps the elements converted before the
    /// failing one.
    KeepConverted,
}

/// A type that a setting can hold and populate from a document node.
///
/// Implement this for your own structured types to bind them as settings.
/// `render` falls back to [`OBJECT_PLACEHOLDER`] when not overridden.
///
/// ## Example
///
/// ```
/// use dragon_settings::{CoercionError, Kind, NodeType, SettingValue};
/// use serde_json::Value;
///
/// struct Port(u16);
///
/// impl SettingValue for Port {
///     fn kind() -> Kind {
///         Kind::Unsigned
///     }
///
///     fn from_node(node: &Value) -> Result<Self, CoercionError> {
///         node.as_u64()
///             .map(|p| Port(p as u16))
///             .ok_or_else(|| CoercionError::mismatch(Self::kind(), node))
///     }
///
///     fn render(&self) -> String {
///         self.0.to_string()
///     }
/// }
///
/// let port = Port::from_node(&serde_json::json!(8080)).unwrap();
/// assert_eq!(port.render(), "8080");
/// assert_eq!(NodeType::of(&serde_json::json!(8080)), NodeType::Unsigned);
/// ```
pub trait SettingValue: Sized + Send + Sync + 'static {
    /// The destination kind, used in diagnostics.
    fn kind() -> Kind;

    /// Builds a fresh value from `node`.
    fn from_node(node: &Value) -> Result<Self, CoercionError>;

    /// Replaces `self` with the value coerced from `node`.
    ///
    /// On error `self` is left unchanged, except for arrays under
    /// [`ArrayFailureMode::KeepConverted`].
    fn assign_node(&mut self, node: &Value, mode: ArrayFailureMode) -> Result<(), CoercionError> {
        let _ = mode;
        *self = Self::from_node(node)?;
        Ok(())
    }

    fn render(&self) -> String {
        OBJECT_PLACEHOLDER.to_string()
    }

    /// A `"<key>: <value>"` line for dumps.
    fn dump_line(&self, key: &str) -> String {
        format!("{key}: {}", self.render())
    }
}
