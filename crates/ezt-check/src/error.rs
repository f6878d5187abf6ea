//! # Error Types
//!
//! Two families:
//!
//! - [`ConfigurationError`]: the *requirement* is wrong: malformed type
//!   text, a duplicate registration, an array over an unknown element type,
//!   a runaway recursive definition. These are programmer mistakes and are
//!   returned as soon as they are detected.
//! - [`ValidationError`]: the *value* is wrong. Produced only by the check
//!   facade, from a structured [`Failure`].
//!
//! [`CheckError`] is the union returned by `is` / `is_not`.

use thiserror::Error;

use crate::failure::Failure;

/// A malformed requirement or registry operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The name is already defined and overwrite mode is off.
    #[error("type {name:?} is already defined; overwriting existing types is not allowed")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// The name cannot be used as a registry key.
    #[error("invalid type name {name:?}: {reason}")]
    InvalidTypeName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// `"[]"`: an array requirement without an element type.
    #[error("empty type array in {text:?}, should be \"[type]\"")]
    EmptyArrayType {
        /// The offending type text.
        text: String,
    },

    /// Type text that does not follow the `name`, `name?`, `[T]` grammar.
    #[error("malformed type {text:?}: {reason}")]
    MalformedTypeName {
        /// The offending type text.
        text: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// An array requirement whose element type does not resolve.
    #[error("nonexistent type {name:?} in array requirement {requirement:?}")]
    UnknownElementType {
        /// The unresolved element type name.
        name: String,
        /// The full array requirement.
        requirement: String,
    },

    /// A declarative requirement of a kind that cannot be interpreted.
    #[error("not a valid requirement: {found}")]
    UnsupportedRequirement {
        /// Rendering of what was supplied instead.
        found: String,
    },

    /// Name resolution went round without ever stepping into the value.
    #[error("requirement nesting exceeded {limit} levels (is a named type defined in terms of itself?)")]
    DepthExceeded {
        /// The configured `max_depth`.
        limit: usize,
    },

    /// The value is nested deeper than the matcher will follow.
    #[error("value nesting exceeded {limit} levels")]
    NestingExceeded {
        /// The configured `max_nesting`.
        limit: usize,
    },
}

/// A value that did not satisfy a requirement, as raised by the facade.
///
/// The message is either the caller's override or a default naming the
/// value and the requirement. The structured failure is attached when one
/// exists (a failed `is`); a failed `is_not` has none.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    failure: Option<Failure>,
}

impl ValidationError {
    pub(crate) fn new(message: String, failure: Option<Failure>) -> Self {
        Self { message, failure }
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The matcher's structured failure, if the check was an `is`.
    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }
}

/// Error returned by [`Check::is`](crate::Check::is) and friends.
#[derive(Error, Debug, Clone)]
pub enum CheckError {
    /// The value failed the check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requirement itself is unusable.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl CheckError {
    /// The validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CheckError::Validation(e) => Some(e),
            CheckError::Configuration(_) => None,
        }
    }

    /// True if the value (not the requirement) was at fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, CheckError::Validation(_))
    }
}
