//! # Primitive Kinds
//!
//! The six results of JavaScript's `typeof` operator. These are the literal
//! primitive tags accepted by type requirements (`"string"`, `"number"`,
//! `"boolean"`, `"function"`, `"object"`, `"undefined"`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// The primitive kind of a [`Value`](crate::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// `undefined`.
    Undefined,
    /// `null`, arrays, plain objects, dates, buffers and class instances.
    Object,
    /// `true` / `false`.
    Boolean,
    /// IEEE-754 doubles, including `NaN` and the infinities.
    Number,
    /// UTF-8 text.
    String,
    /// Callable values.
    Function,
}

impl Kind {
    /// Every kind, in `typeof` documentation order.
    pub const ALL: [Kind; 6] = [
        Kind::Undefined,
        Kind::Object,
        Kind::Boolean,
        Kind::Number,
        Kind::String,
        Kind::Function,
    ];

    /// The tag as `typeof` spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Undefined => "undefined",
            Kind::Object => "object",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Function => "function",
        }
    }

    /// Parse a primitive tag. Returns `None` for anything that is not one
    /// of the six `typeof` results.
    pub fn from_tag(tag: &str) -> Option<Kind> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
