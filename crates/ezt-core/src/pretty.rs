//! # Diagnostic Pretty Printing
//!
//! Renders values (and requirement descriptions) for failure messages.
//! Output is 2-space indented JSON. Rendering never fails: values that
//! cannot be rendered print as [`PLACEHOLDER`].

use crate::value::Value;

/// Text used when a value cannot be serialized.
pub const PLACEHOLDER: &str = "object";

/// Values nested deeper than this print as [`PLACEHOLDER`].
pub const MAX_PRETTY_DEPTH: usize = 128;

/// Render a value for a diagnostic message.
///
/// Top-level `undefined` and functions, which have no JSON form, print as
/// `undefined`.
pub fn pretty(value: &Value) -> String {
    if exceeds_depth(value, MAX_PRETTY_DEPTH) {
        return PLACEHOLDER.to_string();
    }
    match value.to_json() {
        Some(json) => pretty_json(&json),
        None => "undefined".to_string(),
    }
}

/// Render an already-built JSON value.
pub fn pretty_json(json: &serde_json::Value) -> String {
    serde_json::to_string_pretty(json).unwrap_or_else(|_| PLACEHOLDER.to_string())
}

/// Bounded depth probe: never recurses past `budget` levels.
fn exceeds_depth(value: &Value, budget: usize) -> bool {
    let children: Box<dyn Iterator<Item = &Value> + '_> = match value {
        Value::Array(items) => Box::new(items.iter()),
        other => match other.fields() {
            Some(map) => Box::new(map.values()),
            None => return false,
        },
    };
    let mut children = children.peekable();
    if children.peek().is_none() {
        return false;
    }
    budget == 0 || children.any(|child| exceeds_depth(child, budget - 1))
}
