//! # Check Facade
//!
//! Assertion-style entry point:
//!
//! ```
//! use ezt_check::Registry;
//! use serde_json::json;
//!
//! let mut types = Registry::new();
//! types.add_type("point", json!({"x": "number", "y": "number"})).unwrap();
//!
//! types.check(json!({"x": 1, "y": 2})).is("point").unwrap();
//! types.check(json!({"x": 1})).is_not("point").unwrap();
//! assert!(types.check(json!([1, "2"])).is("[number]").is_err());
//! ```
//!
//! The free functions ([`check`], [`add_type`], [`add_types`],
//! [`clear_types`], [`allow_overwriting_types`]) operate on the
//! process-wide registry.
//!
//! ## Diagnostics
//!
//! When `is` fails, the matcher's detailed failure is emitted as a
//! `tracing` warning (target `ezt::check`) before the error is returned.
//! The returned error carries the caller's override message if one was
//! given, else a default naming the value and requirement. Match on the
//! error, not on the log output.

use std::ops::Deref;
use std::sync::Arc;

use ezt_core::{pretty, Value};

use crate::error::{CheckError, ConfigurationError, ValidationError};
use crate::failure::MatchOutcome;
use crate::matcher::matches;
use crate::registry::{self, Registry};
use crate::requirement::{IntoRequirement, Requirement};

enum RegistryHandle<'r> {
    Borrowed(&'r Registry),
    Snapshot(Arc<Registry>),
}

impl Deref for RegistryHandle<'_> {
    type Target = Registry;

    fn deref(&self) -> &Registry {
        match self {
            RegistryHandle::Borrowed(registry) => registry,
            RegistryHandle::Snapshot(registry) => registry,
        }
    }
}

/// A value wrapped for checking.
pub struct Check<'r> {
    value: Value,
    registry: RegistryHandle<'r>,
}

/// Wrap `value` for checking against the process-wide registry as it is
/// now. Types registered afterwards are not visible to this `Check`.
pub fn check(value: impl Into<Value>) -> Check<'static> {
    Check {
        value: value.into(),
        registry: RegistryHandle::Snapshot(registry::global()),
    }
}

impl Registry {
    /// Wrap `value` for checking against this registry.
    pub fn check(&self, value: impl Into<Value>) -> Check<'_> {
        Check {
            value: value.into(),
            registry: RegistryHandle::Borrowed(self),
        }
    }
}

impl Check<'_> {
    /// The wrapped value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Non-raising query: does the value conform?
    ///
    /// # Errors
    ///
    /// Only configuration errors.
    pub fn conforms(&self, requirement: impl IntoRequirement) -> Result<bool, ConfigurationError> {
        let requirement = requirement.into_requirement()?;
        Ok(matches(&self.value, &requirement, &self.registry)?.is_conforming())
    }

    /// Succeed if the value conforms.
    ///
    /// # Errors
    ///
    /// `CheckError::Validation` with a default message if it does not;
    /// `CheckError::Configuration` if the requirement is unusable.
    pub fn is(&self, requirement: impl IntoRequirement) -> Result<(), CheckError> {
        self.assert_is(requirement, None)
    }

    /// [`is`](Self::is), raising with exactly `message` on failure.
    pub fn is_with_message(
        &self,
        requirement: impl IntoRequirement,
        message: impl Into<String>,
    ) -> Result<(), CheckError> {
        self.assert_is(requirement, Some(message.into()))
    }

    /// Succeed if the value does **not** conform.
    ///
    /// A requirement that cannot be used at all (malformed text, unknown
    /// array element type, runaway recursion) counts as "does not conform".
    ///
    /// # Errors
    ///
    /// `CheckError::Validation` if the value conforms.
    pub fn is_not(&self, requirement: impl IntoRequirement) -> Result<(), CheckError> {
        self.assert_is_not(requirement, None)
    }

    /// [`is_not`](Self::is_not), raising with exactly `message` on failure.
    pub fn is_not_with_message(
        &self,
        requirement: impl IntoRequirement,
        message: impl Into<String>,
    ) -> Result<(), CheckError> {
        self.assert_is_not(requirement, Some(message.into()))
    }

    fn assert_is(
        &self,
        requirement: impl IntoRequirement,
        message: Option<String>,
    ) -> Result<(), CheckError> {
        let requirement = requirement.into_requirement()?;
        match matches(&self.value, &requirement, &self.registry)? {
            MatchOutcome::Conforms => Ok(()),
            MatchOutcome::Fails(failure) => {
                tracing::warn!(
                    target: "ezt::check",
                    value = %failure.value(),
                    path = %failure.pointer(),
                    requirement = %failure.requirement(),
                    reason = %failure,
                    "value failed type check"
                );
                let message = message
                    .unwrap_or_else(|| format!("{} is NOT {}", pretty(&self.value), requirement));
                Err(ValidationError::new(message, Some(failure)).into())
            }
        }
    }

    fn assert_is_not(
        &self,
        requirement: impl IntoRequirement,
        message: Option<String>,
    ) -> Result<(), CheckError> {
        let outcome = requirement
            .into_requirement()
            .and_then(|r| Ok((matches(&self.value, &r, &self.registry)?, r)));
        match outcome {
            Ok((MatchOutcome::Conforms, requirement)) => {
                let message = message
                    .unwrap_or_else(|| format!("{} IS {}", pretty(&self.value), requirement));
                Err(ValidationError::new(message, None).into())
            }
            Ok((MatchOutcome::Fails(_), _)) => Ok(()),
            Err(error) => {
                tracing::debug!(
                    target: "ezt::check",
                    error = %error,
                    "unusable requirement treated as non-conforming"
                );
                Ok(())
            }
        }
    }
}

// ─── Process-wide registry passthroughs ─────────────────────────────

/// Handle on the process-wide registry, returned by the registration
/// passthroughs so calls can be chained:
///
/// ```
/// use ezt_check::{add_type, Predicate};
/// use ezt_core::Value;
///
/// add_type("docs_even", Predicate::new(|v: &Value| v.as_f64().map(|n| n % 2.0 == 0.0)))
///     .unwrap()
///     .add_type("docs_evens", "[docs_even]")
///     .unwrap()
///     .check(serde_json::json!([2, 4]))
///     .is("docs_evens")
///     .unwrap();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalTypes;

impl GlobalTypes {
    /// Register a type in the process-wide registry.
    pub fn add_type(
        self,
        name: impl Into<String>,
        requirement: impl IntoRequirement,
    ) -> Result<Self, ConfigurationError> {
        registry::update_global(|r| r.register(name, requirement))?;
        Ok(self)
    }

    /// Register several types in the process-wide registry, all or nothing.
    pub fn add_types<I, K, R>(self, entries: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: IntoRequirement,
    {
        registry::update_global(|r| r.register_batch(entries))?;
        Ok(self)
    }

    /// [`check`] against the process-wide registry.
    pub fn check(self, value: impl Into<Value>) -> Check<'static> {
        check(value)
    }
}

/// Register a type in the process-wide registry.
pub fn add_type(
    name: impl Into<String>,
    requirement: impl IntoRequirement,
) -> Result<GlobalTypes, ConfigurationError> {
    GlobalTypes.add_type(name, requirement)
}

/// Register several types in the process-wide registry, all or nothing.
pub fn add_types<I, K, R>(entries: I) -> Result<GlobalTypes, ConfigurationError>
where
    I: IntoIterator<Item = (K, R)>,
    K: Into<String>,
    R: IntoRequirement,
{
    GlobalTypes.add_types(entries)
}

/// Remove every user type from the process-wide registry.
pub fn clear_types() {
    registry::update_global(Registry::clear);
}

/// Turn on overwrite mode for the process-wide registry, for the rest of
/// the process.
pub fn allow_overwriting_types() {
    registry::update_global(Registry::allow_overwriting);
}

/// Look up a requirement by name in the process-wide registry.
pub fn registered_type(name: &str) -> Option<Requirement> {
    registry::global().get(name).cloned()
}
