//! # Conformance Failures
//!
//! A [`Failure`] is the structured reason a value did not satisfy a
//! requirement: what went wrong ([`FailureKind`]), where in the value
//! (a JSON-pointer path), the offending value and the requirement it
//! failed, both rendered for humans.

use std::fmt;

use ezt_core::{pretty, Kind, Value};
use serde::Serialize;

use crate::builtin::BuiltinType;

/// Why a value failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// `typeof` mismatch against a primitive tag.
    WrongPrimitiveKind {
        /// The tag required.
        expected: Kind,
        /// The value's `typeof`.
        actual: Kind,
    },
    /// A built-in semantic type rejected the value.
    BuiltinRejected {
        /// The built-in that rejected it.
        builtin: BuiltinType,
    },
    /// An array requirement met a non-array.
    NotSequence,
    /// A shape met a primitive.
    NotObject {
        /// The value's `typeof`.
        actual: Kind,
    },
    /// A shape met `null`.
    NullValue,
    /// A required field is absent.
    MissingField {
        /// The absent field.
        field: String,
    },
    /// A predicate returned `false` or reported an error.
    PredicateRejected {
        /// The predicate's error, when it reported one.
        detail: Option<String>,
    },
    /// A constructor requirement met a non-instance.
    NotInstance {
        /// Name of the required class.
        class: String,
    },
    /// The name is not registered, built in, or a primitive tag.
    UnknownTypeName {
        /// The unresolved name.
        name: String,
    },
}

/// One step into a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array element.
    Index(usize),
    /// Object field.
    Field(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{i}"),
            PathSegment::Field(name) => f.write_str(&name.replace('~', "~0").replace('/', "~1")),
        }
    }
}

/// A structured conformance failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    kind: FailureKind,
    value: String,
    requirement: String,
    path: Vec<PathSegment>,
}

impl Failure {
    pub(crate) fn new(kind: FailureKind, value: &Value, requirement: impl fmt::Display) -> Self {
        Self {
            kind,
            value: pretty(value),
            requirement: requirement.to_string(),
            path: Vec::new(),
        }
    }

    /// Prefix the path with the step that led to this failure.
    pub(crate) fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// What went wrong.
    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    /// The offending value, pretty-printed.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The requirement the value failed, rendered.
    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    /// Steps from the checked value down to the offending one.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// The path as a JSON pointer (`""` at the root, `/k/2` below it).
    pub fn pointer(&self) -> String {
        self.path.iter().map(|s| format!("/{s}")).collect()
    }

    /// The innermost array index on the path, if any.
    pub fn index(&self) -> Option<usize> {
        self.path.iter().rev().find_map(|s| match s {
            PathSegment::Index(i) => Some(*i),
            PathSegment::Field(_) => None,
        })
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str("(root): ")?;
        } else {
            write!(f, "{}: ", self.pointer())?;
        }
        let value = &self.value;
        let requirement = &self.requirement;
        match &self.kind {
            FailureKind::WrongPrimitiveKind { expected, actual } => {
                write!(f, "{value} should be a(n) {expected}, not {actual}")
            }
            FailureKind::BuiltinRejected { builtin } => {
                write!(f, "{value} should be a \"{builtin}\"")
            }
            FailureKind::NotSequence => write!(f, "{value} should be an array matching {requirement}"),
            FailureKind::NotObject { actual } => {
                write!(f, "{value} should be an object, not {actual}")
            }
            FailureKind::NullValue => write!(f, "{value} is not of type {requirement}"),
            FailureKind::MissingField { field } => {
                write!(f, "{value} does not contain field {field} for requirement {requirement}")
            }
            FailureKind::PredicateRejected { detail: Some(detail) } => {
                write!(f, "{value} failed {requirement}: {detail}")
            }
            FailureKind::PredicateRejected { detail: None } => {
                write!(f, "{value} failed {requirement}")
            }
            FailureKind::NotInstance { class } => {
                write!(f, "{value} is not an instance of {class}")
            }
            FailureKind::UnknownTypeName { name } => {
                write!(f, "{value} cannot be checked against unknown type {name:?}")
            }
        }
    }
}

/// Result of matching a value against a requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The value satisfies the requirement.
    Conforms,
    /// The value does not.
    Fails(Failure),
}

impl MatchOutcome {
    /// True for `Conforms`.
    pub fn is_conforming(&self) -> bool {
        matches!(self, MatchOutcome::Conforms)
    }

    /// The failure, if any.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            MatchOutcome::Conforms => None,
            MatchOutcome::Fails(failure) => Some(failure),
        }
    }

    /// `Ok(())` for `Conforms`.
    pub fn into_result(self) -> Result<(), Failure> {
        match self {
            MatchOutcome::Conforms => Ok(()),
            MatchOutcome::Fails(failure) => Err(failure),
        }
    }
}
