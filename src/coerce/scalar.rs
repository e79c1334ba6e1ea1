//! Coercions for the scalar kinds.
//!
//! Numeric destinations accept booleans (as 0/1) and every number variant.
//! Narrowing is a plain `as` cast: floats truncate toward zero and saturate,
//! signed and unsigned values are reinterpreted. No range checks are made.

use serde_json::Value;

use super::{CoercionError, Kind, SettingValue};

/// A numeric reading of a node, before narrowing.
#[derive(Debug, Clone, Copy)]
enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

fn number(node: &Value) -> Option<Number> {
    match node {
        Value::Bool(b) => Some(Number::Unsigned(u64::from(*b))),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(Number::Unsigned(u))
            } else if let Some(i) = n.as_i64() {
                Some(Number::Signed(i))
            } else {
                n.as_f64().map(Number::Float)
            }
        }
        _ => None,
    }
}

impl SettingValue for bool {
    fn kind() -> Kind {
        Kind::Boolean
    }

    fn from_node(node: &Value) -> Result<Self, CoercionError> {
        if let Value::Bool(b) = node {
            return Ok(*b);
        }
        match number(node) {
            Some(Number::Signed(i)) => Ok(i != 0),
            Some(Number::Unsigned(u)) => Ok(u != 0),
            Some(Number::Float(f)) => Ok(f != 0.0),
            None => Err(CoercionError::mismatch(Self::kind(), node)),
        }
    }

    fn render(&self) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }
}

macro_rules! numeric_setting_value {
    ($kind:expr => $($ty:ty),+ $(,)?) => {$(
        impl SettingValue for $ty {
            fn kind() -> Kind {
                $kind
            }

            fn from_node(node: &Value) -> Result<Self, CoercionError> {
                match number(node) {
                    Some(Number::Signed(i)) => Ok(i as $ty),
                    Some(Number::Unsigned(u)) => Ok(u as $ty),
                    Some(Number::Float(f)) => Ok(f as $ty),
                    None => Err(CoercionError::mismatch(Self::kind(), node)),
                }
            }

            fn render(&self) -> String {
                self.to_string()
            }
        }
    )+};
}

numeric_setting_value!(Kind::Integer => i8, i16, i32, i64, isize);
numeric_setting_value!(Kind::Unsigned => u8, u16, u32, u64, usize);
numeric_setting_value!(Kind::Float => f32, f64);

impl SettingValue for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn from_node(node: &Value) -> Result<Self, CoercionError> {
        match node {
            Value::String(s) => Ok(s.clone()),
            _ => Err(CoercionError::mismatch(Self::kind(), node)),
        }
    }

    fn render(&self) -> String {
        self.clone()
    }
}
