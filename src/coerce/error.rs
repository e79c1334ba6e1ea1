use serde_json::Value;
use thiserror::Error;

use super::{Kind, NodeType};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoercionError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: Kind, found: NodeType },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<CoercionError>,
    },

    #[error("failed to bind object: {0}")]
    Bind(#[from] serde_json::Error),
}

impl CoercionError {
    /// A type mismatch between `expected` and the dynamic type of `node`.
    pub fn mismatch(expected: Kind, node: &Value) -> Self {
        CoercionError::TypeMismatch {
            expected,
            found: NodeType::of(node),
        }
    }

    /// Whether the node's type has no coercion path to the destination at all,
    /// as opposed to a failure inside a nested element or object.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, CoercionError::TypeMismatch { .. })
    }
}
