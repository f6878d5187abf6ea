//! # Type Registry
//!
//! Maps type names to requirements so they can be reused by name, and
//! resolves names at check time. Resolution order:
//!
//! 1. user-registered types,
//! 2. built-in semantic types ([`BuiltinType`]),
//! 3. primitive `typeof` tags ([`Kind`]).
//!
//! Built-in and primitive names are reserved: registering one fails with
//! `DuplicateName` like any other taken name, unless overwrite mode is on,
//! in which case the user entry shadows the built-in.
//!
//! ## Injected vs. Global
//!
//! A [`Registry`] is an ordinary value. Build one per test or per
//! subsystem and check against it with [`Registry::check`]. For
//! convenience there is also one process-wide registry, reached through
//! [`global`] and [`update_global`], which backs the free functions in
//! [`crate::check`](mod@crate::check).
//!
//! The global registry is held as an `Arc` snapshot behind a
//! `parking_lot::RwLock`. Checks clone the snapshot and release the lock
//! before matching, so predicates are free to run nested checks; updates
//! copy-on-write the snapshot.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, OnceLock};

use ezt_core::Kind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::builtin::BuiltinType;
use crate::error::ConfigurationError;
use crate::requirement::{check_name, IntoRequirement, Requirement};

/// Default bound on consecutive name resolutions that do not move into
/// the value.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default bound on how deeply nested a checked value may be.
pub const DEFAULT_MAX_NESTING: usize = 4096;

/// Registry settings.
///
/// Deserializable so a registry can be configured from a JSON settings
/// object; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Allow redefining taken names, built-ins included.
    pub allow_overwrite: bool,
    /// How many names the matcher may resolve in a row without stepping
    /// into an element or field. Only a cyclic chain of aliases reaches it.
    pub max_depth: usize,
    /// How many elements and fields deep the matcher will follow a value.
    pub max_nesting: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            allow_overwrite: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// What a name resolved to.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A user-registered requirement.
    User(Arc<Requirement>),
    /// A built-in semantic type.
    Builtin(BuiltinType),
    /// A primitive `typeof` tag.
    Primitive(Kind),
}

/// Result of [`Registry::resolve`].
#[derive(Debug, Clone)]
pub struct Lookup<'n> {
    /// The name with any trailing `?` removed.
    pub name: &'n str,
    /// True if the looked-up text ended in `?`.
    pub optional: bool,
    /// `None` if the name is unknown.
    pub target: Option<Resolution>,
}

/// A set of named types.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    config: RegistryConfig,
    types: BTreeMap<String, Arc<Requirement>>,
}

impl Registry {
    /// An empty registry with default settings. Built-ins are always
    /// available.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry with the given settings.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            types: BTreeMap::new(),
        }
    }

    /// The registry's settings.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Turn on overwrite mode. There is no way to turn it off again.
    pub fn allow_overwriting(&mut self) {
        if !self.config.allow_overwrite {
            tracing::debug!("type overwriting enabled");
        }
        self.config.allow_overwrite = true;
    }

    /// True if overwrite mode is on.
    pub fn overwrite_allowed(&self) -> bool {
        self.config.allow_overwrite
    }

    /// Register a named type.
    ///
    /// # Errors
    ///
    /// - `InvalidTypeName` if `name` is empty, padded, or contains `?`, `[`
    ///   or `]`.
    /// - `DuplicateName` if `name` is taken (user type, built-in or
    ///   primitive tag) and overwrite mode is off.
    /// - Any error converting `requirement`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        requirement: impl IntoRequirement,
    ) -> Result<(), ConfigurationError> {
        let name = name.into();
        let requirement = requirement.into_requirement()?;
        self.admit(&name)?;
        self.insert(name, requirement);
        Ok(())
    }

    /// Register several named types, all or nothing.
    ///
    /// Every entry is converted and validated, against the registry and
    /// against the rest of the batch, before anything is inserted. If any
    /// entry is rejected the registry is left unchanged.
    pub fn register_batch<I, K, R>(&mut self, entries: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: IntoRequirement,
    {
        let mut staged = Vec::new();
        let mut seen = HashSet::new();
        for (name, requirement) in entries {
            let name = name.into();
            let requirement = requirement.into_requirement()?;
            self.admit(&name)?;
            if !seen.insert(name.clone()) && !self.config.allow_overwrite {
                return Err(ConfigurationError::DuplicateName { name });
            }
            staged.push((name, requirement));
        }
        for (name, requirement) in staged {
            self.insert(name, requirement);
        }
        Ok(())
    }

    /// Chaining form of [`register`](Self::register).
    pub fn add_type(
        &mut self,
        name: impl Into<String>,
        requirement: impl IntoRequirement,
    ) -> Result<&mut Self, ConfigurationError> {
        self.register(name, requirement)?;
        Ok(self)
    }

    /// Chaining form of [`register_batch`](Self::register_batch).
    pub fn add_types<I, K, R>(&mut self, entries: I) -> Result<&mut Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: IntoRequirement,
    {
        self.register_batch(entries)?;
        Ok(self)
    }

    /// Remove every user-registered type. Built-ins are unaffected, and
    /// overwrite mode stays as it was.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.types.len(), "clearing registered types");
        self.types.clear();
    }

    /// Resolve type text to its definition. A trailing `?` is stripped and
    /// reported as `optional`. Pure lookup.
    pub fn resolve<'n>(&self, name: &'n str) -> Lookup<'n> {
        let (base, optional) = match name.strip_suffix('?') {
            Some(base) => (base, true),
            None => (name, false),
        };
        Lookup {
            name: base,
            optional,
            target: self.lookup(base),
        }
    }

    /// Resolve a bare name (no marker).
    pub fn lookup(&self, name: &str) -> Option<Resolution> {
        if let Some(requirement) = self.types.get(name) {
            return Some(Resolution::User(Arc::clone(requirement)));
        }
        if let Some(builtin) = BuiltinType::from_name(name) {
            return Some(Resolution::Builtin(builtin));
        }
        Kind::from_tag(name).map(Resolution::Primitive)
    }

    /// True if `name` resolves to anything.
    pub fn knows(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// True if `name` is a user-registered type.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The user-registered requirement for `name`.
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.types.get(name).map(|r| r.as_ref())
    }

    /// User-registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Number of user-registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True if no user types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn is_taken(&self, name: &str) -> bool {
        self.types.contains_key(name)
            || BuiltinType::from_name(name).is_some()
            || Kind::from_tag(name).is_some()
    }

    fn admit(&self, name: &str) -> Result<(), ConfigurationError> {
        check_name(name).map_err(|reason| ConfigurationError::InvalidTypeName {
            name: name.to_string(),
            reason,
        })?;
        if !self.config.allow_overwrite && self.is_taken(name) {
            return Err(ConfigurationError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, name: String, requirement: Requirement) {
        let replaced = self
            .types
            .insert(name.clone(), Arc::new(requirement))
            .is_some();
        tracing::debug!(name = %name, replaced, "registered type");
    }
}

// ─── Process-wide registry ──────────────────────────────────────────

static GLOBAL: OnceLock<RwLock<Arc<Registry>>> = OnceLock::new();

fn global_cell() -> &'static RwLock<Arc<Registry>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(Registry::new())))
}

/// A snapshot of the process-wide registry. Later updates are not visible
/// through it.
pub fn global() -> Arc<Registry> {
    Arc::clone(&*global_cell().read())
}

/// Mutate the process-wide registry. Snapshots taken before the update
/// keep seeing the old contents.
pub fn update_global<T>(f: impl FnOnce(&mut Registry) -> T) -> T {
    let mut guard = global_cell().write();
    f(Arc::make_mut(&mut *guard))
}
