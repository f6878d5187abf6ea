//! # Values
//!
//! [`Value`] is the dynamic value tree every check runs against.
//!
//! ## JSON Rendering
//!
//! The `Serialize` impl follows `JSON.stringify` so that diagnostics read the
//! way a JavaScript developer expects:
//!
//! - `undefined` and functions are dropped from objects and become `null`
//!   inside arrays.
//! - Integral numbers print without a fractional part; `NaN` and the
//!   infinities print as `null`.
//! - Dates print as ISO-8601 with millisecond precision and a `Z` suffix.
//! - Buffers print as `{"type": "Buffer", "data": [..]}`.
//! - Instances print as their own fields.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::class::{Function, Instance};
use crate::error::ValueError;
use crate::kind::Kind;

/// Field map of plain objects and instances.
pub type Map = BTreeMap<String, Value>;

/// Largest magnitude below which every integer is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Undefined,
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. All numbers are doubles.
    Number(f64),
    /// A string.
    String(String),
    /// A sequence.
    Array(Vec<Value>),
    /// A plain object.
    Object(Map),
    /// A calendar date/time.
    Date(DateTime<Utc>),
    /// A raw byte sequence.
    Buffer(Vec<u8>),
    /// A callable.
    Function(Function),
    /// An object constructed by a [`Class`](crate::Class).
    Instance(Instance),
}

impl Value {
    /// Parse an RFC 3339 date/time into a [`Value::Date`]. Any offset is
    /// accepted and converted to UTC.
    pub fn date_from_rfc3339(s: &str) -> Result<Self, ValueError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Value::Date(dt.with_timezone(&Utc)))
            .map_err(|e| ValueError::InvalidDate {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }

    /// The `typeof` of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Undefined => Kind::Undefined,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Function(_) => Kind::Function,
            Value::Null
            | Value::Array(_)
            | Value::Object(_)
            | Value::Date(_)
            | Value::Buffer(_)
            | Value::Instance(_) => Kind::Object,
        }
    }

    /// True for `undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// True for `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The number, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The own fields of a map-like value (plain objects and instances).
    pub fn fields(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            Value::Instance(inst) => Some(inst.fields()),
            _ => None,
        }
    }

    /// Read a named field. Values that are not map-like have no fields.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields().and_then(|m| m.get(name))
    }

    /// Render as JSON. Returns `None` where `JSON.stringify` would return
    /// `undefined`: for `undefined` itself and for functions.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Undefined | Value::Function(_) => None,
            other => serde_json::to_value(other).ok(),
        }
    }

    fn is_unrepresentable(&self) -> bool {
        matches!(self, Value::Undefined | Value::Function(_))
    }
}

fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !n.is_finite() {
        serializer.serialize_none()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

fn serialize_fields<S: Serializer>(map: &Map, serializer: S) -> Result<S::Ok, S::Error> {
    let mut out = serializer.serialize_map(None)?;
    for (k, v) in map.iter().filter(|(_, v)| !v.is_unrepresentable()) {
        out.serialize_entry(k, v)?;
    }
    out.end()
}

struct BufferData<'a>(&'a [u8]);

impl Serialize for BufferData<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for byte in self.0 {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serialize_number(*n, serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => serialize_fields(map, serializer),
            Value::Date(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Buffer(bytes) => {
                let mut out = serializer.serialize_map(Some(2))?;
                out.serialize_entry("type", "Buffer")?;
                out.serialize_entry("data", &BufferData(bytes))?;
                out.end()
            }
            Value::Instance(inst) => serialize_fields(inst.fields(), serializer),
        }
    }
}

// ─── Conversions ────────────────────────────────────────────────────

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

macro_rules! from_lossless_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Number(f64::from(n))
                }
            }
        )*
    };
}

from_lossless_number!(i8, i16, i32, u8, u16, u32, f32);

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Date(dt)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Instance(inst)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Undefined, Into::into)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().collect())
    }
}
