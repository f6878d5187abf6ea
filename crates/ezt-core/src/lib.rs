//! # ezt-core — Dynamic Values for Runtime Type Checking
//!
//! This crate defines the value model that `ezt-check` inspects. Values
//! crossing a boundary (function arguments, deserialized payloads,
//! configuration objects) are represented as a [`Value`] tree whose variants
//! mirror the JavaScript data model: `undefined`, `null`, booleans, numbers,
//! strings, arrays, plain objects, dates, byte buffers, functions, and
//! instances of user-defined classes.
//!
//! ## Key Design Principles
//!
//! 1. **One value type.** Every check operates on [`Value`]. JSON payloads
//!    convert losslessly through `From<serde_json::Value>`.
//!
//! 2. **`typeof` is a closed enum.** [`Kind`] has exactly six variants, and
//!    [`Value::kind()`] maps every value onto one of them. `null` is an
//!    `object`, as it is in JavaScript.
//!
//! 3. **Class identity, not class names.** A [`Class`] is compared by
//!    identity. Two classes named `Point` are different classes, and an
//!    [`Instance`] is an instance of its class and of every ancestor.
//!
//! 4. **Diagnostics never fail.** [`pretty()`] always produces text, falling
//!    back to [`PLACEHOLDER`] when a value cannot be rendered.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ezt-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod class;
pub mod error;
pub mod kind;
pub mod pretty;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use class::{Class, Function, Instance};
pub use error::ValueError;
pub use kind::Kind;
pub use pretty::{pretty, pretty_json, MAX_PRETTY_DEPTH, PLACEHOLDER};
pub use value::{Map, Value};
