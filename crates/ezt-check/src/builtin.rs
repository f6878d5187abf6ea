//! # Built-in Semantic Types
//!
//! Names that are always resolvable, in addition to the six primitive
//! `typeof` tags. They cannot be redefined unless the registry is in
//! overwrite mode, and [`Registry::clear`](crate::Registry::clear) never
//! removes them.
//!
//! `object` accepts anything whose `typeof` is `object`, and that includes
//! `null`. Use a shape requirement to demand a non-null object.

use std::fmt;

use ezt_core::{Kind, Value};
use serde::{Deserialize, Serialize};

/// A built-in semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinType {
    /// A non-negative integer.
    #[serde(rename = "posInt")]
    PosInt,
    /// A number with no fractional part.
    #[serde(rename = "int")]
    Int,
    /// A calendar date/time.
    #[serde(rename = "date")]
    Date,
    /// A sequence.
    #[serde(rename = "array")]
    Array,
    /// Exactly `null`.
    #[serde(rename = "null")]
    Null,
    /// Any non-primitive, `null` included.
    #[serde(rename = "object")]
    Object,
    /// A raw byte sequence.
    #[serde(rename = "buffer")]
    Buffer,
}

impl BuiltinType {
    /// Every built-in.
    pub const ALL: [BuiltinType; 7] = [
        BuiltinType::PosInt,
        BuiltinType::Int,
        BuiltinType::Date,
        BuiltinType::Array,
        BuiltinType::Null,
        BuiltinType::Object,
        BuiltinType::Buffer,
    ];

    /// The name used in type text.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::PosInt => "posInt",
            BuiltinType::Int => "int",
            BuiltinType::Date => "date",
            BuiltinType::Array => "array",
            BuiltinType::Null => "null",
            BuiltinType::Object => "object",
            BuiltinType::Buffer => "buffer",
        }
    }

    /// Look up a built-in by its type-text name.
    pub fn from_name(name: &str) -> Option<BuiltinType> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Apply the built-in's test.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            BuiltinType::PosInt => integral(value).is_some_and(|n| n >= 0.0),
            BuiltinType::Int => integral(value).is_some(),
            BuiltinType::Date => matches!(value, Value::Date(_)),
            BuiltinType::Array => matches!(value, Value::Array(_)),
            BuiltinType::Null => value.is_null(),
            BuiltinType::Object => value.kind() == Kind::Object,
            BuiltinType::Buffer => matches!(value, Value::Buffer(_)),
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `n % 1 === 0`: false for NaN and the infinities.
fn integral(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|n| n.is_finite() && n.fract() == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ezt_core::Map;

    #[test]
    fn test_from_name_roundtrips() {
        for builtin in BuiltinType::ALL {
            assert_eq!(BuiltinType::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(BuiltinType::from_name("PosInt"), None);
        assert_eq!(BuiltinType::from_name("string"), None);
    }

    #[test]
    fn test_int_accepts_negative_and_zero() {
        for n in [0.0, -0.0, 7.0, -13.0, 1e15] {
            assert!(BuiltinType::Int.accepts(&Value::Number(n)), "{n} should be int");
        }
    }

    #[test]
    fn test_int_rejects_fractions_and_non_numbers() {
        for n in [0.5, -12.5, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(!BuiltinType::Int.accepts(&Value::Number(n)), "{n} should not be int");
        }
        assert!(!BuiltinType::Int.accepts(&Value::from("3")));
        assert!(!BuiltinType::Int.accepts(&Value::Null));
    }

    #[test]
    fn test_pos_int_rejects_negatives() {
        assert!(BuiltinType::PosInt.accepts(&Value::from(0)));
        assert!(BuiltinType::PosInt.accepts(&Value::from(42)));
        assert!(!BuiltinType::PosInt.accepts(&Value::from(-1)));
        assert!(!BuiltinType::PosInt.accepts(&Value::from(1.5)));
        assert!(!BuiltinType::PosInt.accepts(&Value::from(true)));
    }

    #[test]
    fn test_object_includes_null() {
        assert!(BuiltinType::Object.accepts(&Value::Null));
        assert!(BuiltinType::Object.accepts(&Value::Object(Map::new())));
        assert!(BuiltinType::Object.accepts(&Value::Array(vec![])));
        assert!(!BuiltinType::Object.accepts(&Value::Undefined));
        assert!(!BuiltinType::Object.accepts(&Value::from("x")));
    }

    #[test]
    fn test_structural_builtins() {
        assert!(BuiltinType::Date.accepts(&Value::Date(Utc::now())));
        assert!(!BuiltinType::Date.accepts(&Value::from("2026-01-01T00:00:00Z")));
        assert!(BuiltinType::Array.accepts(&Value::Array(vec![])));
        assert!(!BuiltinType::Array.accepts(&Value::Buffer(vec![])));
        assert!(BuiltinType::Buffer.accepts(&Value::Buffer(vec![0])));
        assert!(!BuiltinType::Buffer.accepts(&Value::Array(vec![Value::from(0)])));
        assert!(BuiltinType::Null.accepts(&Value::Null));
        assert!(!BuiltinType::Null.accepts(&Value::Undefined));
    }

    #[test]
    fn test_serde_uses_type_text_names() {
        assert_eq!(serde_json::to_string(&BuiltinType::PosInt).unwrap(), "\"posInt\"");
    }
}
