//! # Requirements
//!
//! A [`Requirement`] describes what a value must look like. Its kind is
//! fixed when it is built, never re-inferred while matching:
//!
//! | Variant | Built from | Meaning |
//! |---------|-----------|---------|
//! | `Predicate` | [`Predicate::new`] | arbitrary test function |
//! | `Constructor` | [`Class`] | `instanceof` test |
//! | `Type` | type text (`"int"`, `"[string?]"`) | named / primitive / array type |
//! | `Shape` | [`Shape`] or a JSON object | structural object shape |
//!
//! ## Type Text Grammar
//!
//! ```text
//! expr  := inner '?'?
//! inner := '[' expr ']' | name
//! name  := one or more characters, none of '[', ']', '?', no surrounding whitespace
//! ```
//!
//! A trailing `?` permits `undefined`. `[T]` is an array whose elements
//! satisfy `T`; `[T?]` allows `undefined` elements; `[[T]]` nests.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ezt_core::{pretty_json, Class, Value};

use crate::error::ConfigurationError;

// ─── Predicates ─────────────────────────────────────────────────────

/// The outcome of running a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value conforms.
    Pass,
    /// The predicate returned an explicit `false`.
    Fail,
    /// The predicate reported an error; the value does not conform.
    Error(String),
}

/// Return types a predicate may produce.
///
/// Only an explicit `false` or an `Err` rejects the value. `true`, `()`
/// and `None` all conform.
pub trait IntoVerdict {
    /// Interpret the predicate's return value.
    fn into_verdict(self) -> Verdict;
}

impl IntoVerdict for Verdict {
    fn into_verdict(self) -> Verdict {
        self
    }
}

impl IntoVerdict for bool {
    fn into_verdict(self) -> Verdict {
        if self {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl IntoVerdict for () {
    fn into_verdict(self) -> Verdict {
        Verdict::Pass
    }
}

impl IntoVerdict for Option<bool> {
    fn into_verdict(self) -> Verdict {
        self.map_or(Verdict::Pass, IntoVerdict::into_verdict)
    }
}

impl<T: IntoVerdict, E: fmt::Display> IntoVerdict for Result<T, E> {
    fn into_verdict(self) -> Verdict {
        match self {
            Ok(v) => v.into_verdict(),
            Err(e) => Verdict::Error(e.to_string()),
        }
    }
}

type PredicateFn = dyn Fn(&Value) -> Verdict + Send + Sync;

/// A test function over values.
#[derive(Clone)]
pub struct Predicate {
    name: Option<String>,
    test: Arc<PredicateFn>,
}

impl Predicate {
    /// Wrap an anonymous test function.
    pub fn new<F, R>(test: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        Self {
            name: None,
            test: Arc::new(move |v: &Value| test(v).into_verdict()),
        }
    }

    /// Wrap a named test function. The name appears in failure messages.
    pub fn named<F, R>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: IntoVerdict,
    {
        Self {
            name: Some(name.into()),
            ..Self::new(test)
        }
    }

    /// The predicate's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Run the predicate.
    pub fn evaluate(&self, value: &Value) -> Verdict {
        (self.test)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Predicate({name})"),
            None => f.write_str("Predicate(<anonymous>)"),
        }
    }
}

// ─── Type expressions ───────────────────────────────────────────────

/// The shape of a parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExprKind {
    /// A primitive tag, built-in semantic type, or registered name.
    Named(String),
    /// `[T]`.
    ArrayOf(Box<TypeExpr>),
}

/// Parsed type text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeExpr {
    kind: TypeExprKind,
    optional: bool,
}

impl TypeExpr {
    /// Parse type text such as `"int"`, `"otherObj?"` or `"[[boolean]]"`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::EmptyArrayType` for `"[]"` and
    /// `ConfigurationError::MalformedTypeName` for unbalanced brackets,
    /// stray `?` markers and empty or padded names.
    pub fn parse(text: &str) -> Result<Self, ConfigurationError> {
        let (body, optional) = match text.strip_suffix('?') {
            Some(body) => (body, true),
            None => (text, false),
        };

        let kind = if let Some(open) = body.strip_prefix('[') {
            let inner = open
                .strip_suffix(']')
                .ok_or_else(|| malformed(text, "unbalanced '['"))?;
            if inner.is_empty() {
                return Err(ConfigurationError::EmptyArrayType {
                    text: text.to_string(),
                });
            }
            let element = Self::parse(inner).map_err(|e| match e {
                ConfigurationError::MalformedTypeName { reason, .. } => malformed(text, reason),
                other => other,
            })?;
            TypeExprKind::ArrayOf(Box::new(element))
        } else {
            check_name(body).map_err(|reason| malformed(text, reason))?;
            TypeExprKind::Named(body.to_string())
        };

        Ok(Self { kind, optional })
    }

    /// Named or array.
    pub fn kind(&self) -> &TypeExprKind {
        &self.kind
    }

    /// True if a trailing `?` permits `undefined`.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The innermost name, with every array layer and marker stripped.
    pub fn base_name(&self) -> &str {
        match &self.kind {
            TypeExprKind::Named(name) => name,
            TypeExprKind::ArrayOf(element) => element.base_name(),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Named(name) => f.write_str(name)?,
            TypeExprKind::ArrayOf(element) => write!(f, "[{element}]")?,
        }
        if self.optional {
            f.write_str("?")?;
        }
        Ok(())
    }
}

fn malformed(text: &str, reason: &'static str) -> ConfigurationError {
    ConfigurationError::MalformedTypeName {
        text: text.to_string(),
        reason,
    }
}

/// Validate a bare type name (no markers, no brackets).
pub(crate) fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        Err("name is empty")
    } else if name.trim() != name {
        Err("name has surrounding whitespace")
    } else if name.contains('?') {
        Err("'?' is only allowed once, at the end")
    } else if name.contains('[') || name.contains(']') {
        Err("unbalanced brackets")
    } else {
        Ok(())
    }
}

// ─── Shapes ─────────────────────────────────────────────────────────

/// A structural object requirement: declared fields must conform, other
/// fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    fields: Vec<(String, Requirement)>,
}

impl Shape {
    /// An empty shape. It accepts every non-null object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field. Redeclaring a field replaces its requirement.
    pub fn field(
        mut self,
        name: impl Into<String>,
        requirement: impl IntoRequirement,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let requirement = requirement.into_requirement()?;
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = requirement,
            None => self.fields.push((name, requirement)),
        }
        Ok(self)
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Requirement)> {
        self.fields.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// The requirement declared for `name`.
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ─── Requirement ────────────────────────────────────────────────────

/// What a value must look like.
#[derive(Debug, Clone)]
pub enum Requirement {
    /// Arbitrary test function.
    Predicate(Predicate),
    /// Instance-of test. Non-instances fall through to `fallback` when one
    /// is given, and fail otherwise.
    Constructor {
        /// The class the value must be an instance of.
        class: Class,
        /// Test applied to values that are not instances.
        fallback: Option<Predicate>,
    },
    /// Named, primitive or array type.
    Type(TypeExpr),
    /// Structural object shape.
    Shape(Shape),
}

impl Requirement {
    /// Parse type text into a `Requirement::Type`.
    pub fn parse(text: &str) -> Result<Self, ConfigurationError> {
        TypeExpr::parse(text).map(Requirement::Type)
    }

    /// An instance-of requirement.
    pub fn instance_of(class: &Class) -> Self {
        Requirement::Constructor {
            class: class.clone(),
            fallback: None,
        }
    }

    /// An instance-of requirement whose non-instances are handed to
    /// `fallback`.
    pub fn instance_of_or(class: &Class, fallback: Predicate) -> Self {
        Requirement::Constructor {
            class: class.clone(),
            fallback: Some(fallback),
        }
    }

    /// Build a requirement from a declarative JSON description: strings are
    /// type text, objects are shapes (recursively).
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnsupportedRequirement` for any other
    /// JSON value, and parse errors for malformed type text.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ConfigurationError> {
        match json {
            serde_json::Value::String(text) => Self::parse(text),
            serde_json::Value::Object(map) => map
                .iter()
                .try_fold(Shape::new(), |shape, (name, field)| {
                    shape.field(name.as_str(), Self::from_json(field)?)
                })
                .map(Requirement::Shape),
            other => Err(ConfigurationError::UnsupportedRequirement {
                found: pretty_json(other),
            }),
        }
    }

    /// True for type expressions carrying the `?` marker. This looks at the
    /// text only: a name registered as an alias of an optional type (e.g.
    /// `maybe` for `"int?"`) is not optional here, though the matcher lets
    /// a shape field with that requirement be absent after resolving it.
    pub fn is_optional(&self) -> bool {
        matches!(self, Requirement::Type(expr) if expr.is_optional())
    }

    /// A JSON description used in diagnostics.
    pub fn describe(&self) -> serde_json::Value {
        match self {
            Requirement::Predicate(p) => match p.name() {
                Some(name) => format!("[predicate {name}]").into(),
                None => "[predicate]".into(),
            },
            Requirement::Constructor { class, .. } => format!("[class {}]", class.name()).into(),
            Requirement::Type(expr) => expr.to_string().into(),
            Requirement::Shape(shape) => serde_json::Value::Object(
                shape
                    .fields()
                    .map(|(name, r)| (name.to_string(), r.describe()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&pretty_json(&self.describe()))
    }
}

impl FromStr for Requirement {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─── Conversions ────────────────────────────────────────────────────

/// Anything that can be turned into a [`Requirement`]. Conversion from text
/// or JSON can fail, so this is fallible.
pub trait IntoRequirement {
    /// Convert, reporting malformed input as a configuration error.
    fn into_requirement(self) -> Result<Requirement, ConfigurationError>;
}

impl IntoRequirement for Requirement {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Ok(self)
    }
}

impl IntoRequirement for &Requirement {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Ok(self.clone())
    }
}

impl IntoRequirement for &str {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Requirement::parse(self)
    }
}

impl IntoRequirement for String {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Requirement::parse(&self)
    }
}

impl IntoRequirement for &String {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Requirement::parse(self)
    }
}

impl IntoRequirement for TypeExpr {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Ok(Requirement::Type(self))
    }
}

impl IntoRequirement for Shape {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Ok(Requirement::Shape(self))
    }
}

impl IntoRequirement for Predicate {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Ok(Requirement::Predicate(self))
    }
}

impl IntoRequirement for Class {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Ok(Requirement::Constructor {
            class: self,
            fallback: None,
        })
    }
}

impl IntoRequirement for &Class {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Ok(Requirement::instance_of(self))
    }
}

impl IntoRequirement for &serde_json::Value {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Requirement::from_json(self)
    }
}

impl IntoRequirement for serde_json::Value {
    fn into_requirement(self) -> Result<Requirement, ConfigurationError> {
        Requirement::from_json(&self)
    }
}
