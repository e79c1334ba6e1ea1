//! Coercions for arrays and objects.

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ArrayFailureMode, CoercionError, Kind, SettingValue};

/// Rendered for objects that have no text form of their own.
pub const OBJECT_PLACEHOLDER: &str = "<object>";

impl<T: SettingValue> SettingValue for Vec<T> {
    fn kind() -> Kind {
        Kind::Array(Box::new(T::kind()))
    }

    fn from_node(node: &Value) -> Result<Self, CoercionError> {
        let Value::Array(items) = node else {
            return Err(CoercionError::mismatch(Self::kind(), node));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| T::from_node(item).map_err(|e| element_error(index, e)))
            .collect()
    }

    fn assign_node(&mut self, node: &Value, mode: ArrayFailureMode) -> Result<(), CoercionError> {
        match mode {
            ArrayFailureMode::KeepPrevious => {
                *self = Self::from_node(node)?;
                Ok(())
            }
            ArrayFailureMode::KeepConverted => {
                let Value::Array(items) = node else {
                    return Err(CoercionError::mismatch(Self::kind(), node));
                };
                self.clear();
                for (index, item) in items.iter().enumerate() {
                    let value = T::from_node(item).map_err(|e| element_error(index, e))?;
                    self.push(value);
                }
                Ok(())
            }
        }
    }

    /// Elements joined by newlines.
    fn render(&self) -> String {
        self.iter()
            .map(T::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One tab-indented line per rendered element line, so nested arrays
    /// stay under the key.
    fn dump_line(&self, key: &str) -> String {
        let mut line = format!("{key}:");
        for item in self {
            line.push_str("\n\t");
            line.push_str(&item.render().replace('\n', "\n\t"));
        }
        line
    }
}

fn element_error(index: usize, source: CoercionError) -> CoercionError {
    CoercionError::Element {
        index,
        source: Box::new(source),
    }
}

/// A structured setting value bound from a document object through serde.
///
/// Renders as compact JSON, or [`OBJECT_PLACEHOLDER`] if `T` fails to
/// serialize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object<T>(pub T);

impl<T> Object<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Object<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Object<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> SettingValue for Object<T>
where
    T: DeserializeOwned + Serialize + Send + Sync + 'static,
{
    fn kind() -> Kind {
        Kind::Object
    }

    fn from_node(node: &Value) -> Result<Self, CoercionError> {
        if !node.is_object() {
            return Err(CoercionError::mismatch(Self::kind(), node));
        }
        Ok(Object(T::deserialize(node)?))
    }

    fn render(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| OBJECT_PLACEHOLDER.to_string())
    }
}

impl SettingValue for Map<String, Value> {
    fn kind() -> Kind {
        Kind::Object
    }

    fn from_node(node: &Value) -> Result<Self, CoercionError> {
        match node {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(CoercionError::mismatch(Self::kind(), node)),
        }
    }

    fn render(&self) -> String {
        Value::Object(self.clone()).to_string()
    }
}
