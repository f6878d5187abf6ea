//! # ezt-check — Runtime Structural Type Checking
//!
//! Checks [`ezt_core::Value`] trees against requirements: primitive
//! `typeof` tags, built-in semantic types (`int`, `posInt`, `date`, ...),
//! array forms (`"[T]"`), optional forms (`"T?"`), structural shapes,
//! predicates, and class constructors. Named types live in a [`Registry`];
//! a process-wide registry backs the free functions.
//!
//! ## Components
//!
//! - [`registry`]: name to requirement table, with duplicate protection,
//!   an opt-in overwrite mode, and the process-wide instance.
//! - [`matcher`]: the recursive conformance walk. Returns a
//!   [`MatchOutcome`] for conformance and `Err` only for configuration
//!   problems.
//! - [`check`](mod@check): the `check(value).is(..)` / `.is_not(..)` facade.
//!
//! ## Key Design Principles
//!
//! 1. **Conformance is data.** A failed match is a [`Failure`] value with a
//!    kind, a JSON-pointer path, and rendered value/requirement. Only the
//!    facade turns it into an error.
//!
//! 2. **Misuse is not failure.** A malformed type name, an unknown array
//!    element type, or runaway recursion is a [`ConfigurationError`], kept
//!    apart from "the value does not conform".
//!
//! 3. **Names resolve at check time.** Shapes may refer to themselves or
//!    to types registered later.
//!
//! ## Crate Policy
//!
//! - Depends only on `ezt-core` internally.
//! - Synchronous. Matching never mutates the registry.
//! - No `.unwrap()` outside tests.

pub mod builtin;
pub mod check;
pub mod error;
pub mod failure;
pub mod matcher;
pub mod registry;
pub mod requirement;

#[cfg(test)]
mod test_support;

pub use builtin::BuiltinType;
pub use check::{
    add_type, add_types, allow_overwriting_types, check, clear_types, registered_type, Check,
    GlobalTypes,
};
pub use error::{CheckError, ConfigurationError, ValidationError};
pub use failure::{Failure, FailureKind, MatchOutcome, PathSegment};
pub use matcher::{matches, Matcher};
pub use registry::{
    Lookup, Registry, RegistryConfig, Resolution, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NESTING,
};
pub use requirement::{
    IntoRequirement, IntoVerdict, Predicate, Requirement, Shape, TypeExpr, TypeExprKind, Verdict,
};
