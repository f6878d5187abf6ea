//! # Requirement Matcher
//!
//! The recursive walk of a requirement against a value.
//!
//! ## Dispatch
//!
//! 1. **Predicate**: only `false` or an `Err` rejects (strict-`false`
//!    policy). **Constructor**: conforms for instances of the class or a
//!    descendant; anything else goes to the fallback predicate, or fails.
//! 2. **Optional marker**: `undefined` satisfies `T?` outright.
//! 3. **Named type**: user types recurse; built-ins and primitive tags are
//!    tested directly; unknown names fail with `UnknownTypeName`.
//! 4. **Array**: non-arrays fail with `NotSequence`; empty arrays conform;
//!    otherwise the element type must resolve (a configuration error if it
//!    does not) and every element must match it. The first bad element is
//!    reported with its index. For `[[T]]` only the outer level resolves
//!    `[T]`; `T` is resolved when a non-empty inner array is reached.
//! 5. **Shape**: `null` fails with `NullValue`, primitives with
//!    `NotObject`. Declared fields are checked in declaration order; a
//!    field that is absent (missing or `undefined`) is a `MissingField`
//!    unless its requirement is optional, either by its own `?` marker or
//!    by naming a type that resolves to one. Undeclared fields are never
//!    looked at.
//!
//! ## Termination
//!
//! Named types are looked up when they are reached, never expanded ahead
//! of time, so self-referential types terminate on any finite value. Two
//! bounds apply:
//!
//! - [`RegistryConfig::max_depth`](crate::RegistryConfig) counts name
//!   resolutions since the walk last stepped into an element or field. A
//!   definition that recurses without descending into the value (e.g. `a`
//!   defined as `"b"` and `b` as `"a"`) reaches it and fails with
//!   `ConfigurationError::DepthExceeded`.
//! - [`RegistryConfig::max_nesting`](crate::RegistryConfig) counts elements
//!   and fields entered. It only bounds the call stack, and fails with
//!   `ConfigurationError::NestingExceeded`.
//!
//! ## Errors vs. Failures
//!
//! Conformance problems come back as `Ok(MatchOutcome::Fails(..))`. Only
//! configuration problems are `Err`.

use ezt_core::{Kind, Value};

use crate::error::ConfigurationError;
use crate::failure::{Failure, FailureKind, MatchOutcome, PathSegment};
use crate::registry::{Registry, Resolution};
use crate::requirement::{Predicate, Requirement, Shape, TypeExpr, TypeExprKind, Verdict};

/// Match `value` against `requirement`, resolving names in `registry`.
///
/// # Errors
///
/// Returns a `ConfigurationError` only for unusable requirements: an array
/// over an element type that does not resolve, a cycle of aliases, or a
/// value nested past the registry's `max_nesting`.
pub fn matches(
    value: &Value,
    requirement: &Requirement,
    registry: &Registry,
) -> Result<MatchOutcome, ConfigurationError> {
    Matcher::new(registry).run(value, requirement)
}

/// A matcher bound to a registry.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'r> {
    registry: &'r Registry,
    max_depth: usize,
    max_nesting: usize,
}

/// Where the walk is: alias steps taken since the last descent, and how
/// many elements and fields deep.
#[derive(Debug, Clone, Copy, Default)]
struct Depth {
    steps: usize,
    nesting: usize,
}

impl Depth {
    fn resolve(self) -> Self {
        Self {
            steps: self.steps + 1,
            ..self
        }
    }

    fn descend(self) -> Self {
        Self {
            steps: 0,
            nesting: self.nesting + 1,
        }
    }
}

impl<'r> Matcher<'r> {
    /// Bind to `registry`, taking its bounds.
    pub fn new(registry: &'r Registry) -> Self {
        let config = registry.config();
        Self {
            registry,
            max_depth: config.max_depth,
            max_nesting: config.max_nesting,
        }
    }

    /// Match `value` against `requirement`.
    pub fn run(
        &self,
        value: &Value,
        requirement: &Requirement,
    ) -> Result<MatchOutcome, ConfigurationError> {
        self.walk(value, requirement, Depth::default())
    }

    fn walk(
        &self,
        value: &Value,
        requirement: &Requirement,
        depth: Depth,
    ) -> Result<MatchOutcome, ConfigurationError> {
        self.enter(depth)?;
        match requirement {
            Requirement::Predicate(predicate) => Ok(apply_predicate(value, predicate, requirement)),
            Requirement::Constructor { class, fallback } => {
                if let Value::Instance(instance) = value {
                    if instance.is_instance_of(class) {
                        return Ok(MatchOutcome::Conforms);
                    }
                }
                Ok(match fallback {
                    Some(predicate) => apply_predicate(value, predicate, requirement),
                    None => fails(
                        FailureKind::NotInstance {
                            class: class.name().to_string(),
                        },
                        value,
                        requirement,
                    ),
                })
            }
            Requirement::Type(expr) => self.walk_type(value, expr, depth),
            Requirement::Shape(shape) => self.walk_shape(value, shape, requirement, depth),
        }
    }

    fn walk_type(
        &self,
        value: &Value,
        expr: &TypeExpr,
        depth: Depth,
    ) -> Result<MatchOutcome, ConfigurationError> {
        self.enter(depth)?;
        if expr.is_optional() && value.is_undefined() {
            return Ok(MatchOutcome::Conforms);
        }
        match expr.kind() {
            TypeExprKind::Named(name) => self.walk_named(value, name, expr, depth),
            TypeExprKind::ArrayOf(element) => self.walk_array(value, element, expr, depth),
        }
    }

    fn walk_named(
        &self,
        value: &Value,
        name: &str,
        expr: &TypeExpr,
        depth: Depth,
    ) -> Result<MatchOutcome, ConfigurationError> {
        let rendered = || render(expr);
        Ok(match self.registry.lookup(name) {
            Some(Resolution::User(requirement)) => {
                return self.walk(value, &requirement, depth.resolve())
            }
            Some(Resolution::Builtin(builtin)) if builtin.accepts(value) => MatchOutcome::Conforms,
            Some(Resolution::Builtin(builtin)) => {
                fails(FailureKind::BuiltinRejected { builtin }, value, rendered())
            }
            Some(Resolution::Primitive(expected)) if value.kind() == expected => {
                MatchOutcome::Conforms
            }
            Some(Resolution::Primitive(expected)) => fails(
                FailureKind::WrongPrimitiveKind {
                    expected,
                    actual: value.kind(),
                },
                value,
                rendered(),
            ),
            None => fails(
                FailureKind::UnknownTypeName {
                    name: name.to_string(),
                },
                value,
                rendered(),
            ),
        })
    }

    fn walk_array(
        &self,
        value: &Value,
        element: &TypeExpr,
        expr: &TypeExpr,
        depth: Depth,
    ) -> Result<MatchOutcome, ConfigurationError> {
        let Some(items) = value.as_array() else {
            return Ok(fails(FailureKind::NotSequence, value, render(expr)));
        };
        if items.is_empty() {
            return Ok(MatchOutcome::Conforms);
        }
        if let TypeExprKind::Named(name) = element.kind() {
            if !self.registry.knows(name) {
                return Err(ConfigurationError::UnknownElementType {
                    name: name.to_string(),
                    requirement: expr.to_string(),
                });
            }
        }
        for (index, item) in items.iter().enumerate() {
            if let MatchOutcome::Fails(failure) = self.walk_type(item, element, depth.descend())? {
                return Ok(MatchOutcome::Fails(failure.within(PathSegment::Index(index))));
            }
        }
        Ok(MatchOutcome::Conforms)
    }

    fn walk_shape(
        &self,
        value: &Value,
        shape: &Shape,
        requirement: &Requirement,
        depth: Depth,
    ) -> Result<MatchOutcome, ConfigurationError> {
        if value.is_null() {
            return Ok(fails(FailureKind::NullValue, value, requirement));
        }
        if value.kind() != Kind::Object {
            return Ok(fails(
                FailureKind::NotObject {
                    actual: value.kind(),
                },
                value,
                requirement,
            ));
        }
        for (name, field_requirement) in shape.fields() {
            match value.field(name).filter(|v| !v.is_undefined()) {
                Some(field) => {
                    if let MatchOutcome::Fails(failure) =
                        self.walk(field, field_requirement, depth.descend())?
                    {
                        let segment = PathSegment::Field(name.to_string());
                        return Ok(MatchOutcome::Fails(failure.within(segment)));
                    }
                }
                None if self.admits_absence(field_requirement, depth)? => {}
                None => {
                    return Ok(fails(
                        FailureKind::MissingField {
                            field: name.to_string(),
                        },
                        value,
                        requirement,
                    ));
                }
            }
        }
        Ok(MatchOutcome::Conforms)
    }

    /// True if a field with this requirement may be left out: the
    /// requirement carries `?`, or names a user type that does.
    fn admits_absence(
        &self,
        requirement: &Requirement,
        depth: Depth,
    ) -> Result<bool, ConfigurationError> {
        self.enter(depth)?;
        let Requirement::Type(expr) = requirement else {
            return Ok(false);
        };
        if expr.is_optional() {
            return Ok(true);
        }
        match expr.kind() {
            TypeExprKind::Named(name) => match self.registry.lookup(name) {
                Some(Resolution::User(aliased)) => self.admits_absence(&aliased, depth.resolve()),
                _ => Ok(false),
            },
            TypeExprKind::ArrayOf(_) => Ok(false),
        }
    }

    fn enter(&self, depth: Depth) -> Result<(), ConfigurationError> {
        if depth.steps > self.max_depth {
            return Err(ConfigurationError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        if depth.nesting > self.max_nesting {
            return Err(ConfigurationError::NestingExceeded {
                limit: self.max_nesting,
            });
        }
        Ok(())
    }
}

fn apply_predicate(value: &Value, predicate: &Predicate, requirement: &Requirement) -> MatchOutcome {
    match predicate.evaluate(value) {
        Verdict::Pass => MatchOutcome::Conforms,
        Verdict::Fail => fails(FailureKind::PredicateRejected { detail: None }, value, requirement),
        Verdict::Error(detail) => fails(
            FailureKind::PredicateRejected {
                detail: Some(detail),
            },
            value,
            requirement,
        ),
    }
}

fn fails(kind: FailureKind, value: &Value, requirement: impl std::fmt::Display) -> MatchOutcome {
    MatchOutcome::Fails(Failure::new(kind, value, requirement))
}

/// Type text rendered the way requirements are: as a JSON string.
fn render(expr: &TypeExpr) -> String {
    Requirement::Type(expr.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryConfig;
    use crate::test_support::{linked_list, on_large_stack};
    use ezt_core::{Class, Map};
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn req(text: &str) -> Requirement {
        Requirement::parse(text).unwrap()
    }

    fn outcome(value: &Value, requirement: &Requirement, registry: &Registry) -> MatchOutcome {
        matches(value, requirement, registry).unwrap()
    }

    fn conforms(value: &Value, requirement: &Requirement, registry: &Registry) -> bool {
        outcome(value, requirement, registry).is_conforming()
    }

    fn failure(value: &Value, requirement: &Requirement, registry: &Registry) -> Failure {
        match outcome(value, requirement, registry) {
            MatchOutcome::Fails(f) => f,
            MatchOutcome::Conforms => panic!("{value:?} unexpectedly conforms"),
        }
    }

    // ---- primitives ----

    #[test]
    fn test_primitive_tags() {
        let r = Registry::new();
        let cases = [
            (Value::from("s"), "string"),
            (Value::from(1.5), "number"),
            (Value::from(false), "boolean"),
            (Value::Undefined, "undefined"),
            (Value::Null, "object"),
            (
                Value::Function(ezt_core::Function::anonymous(|_| Value::Undefined)),
                "function",
            ),
        ];
        for (value, tag) in &cases {
            for (_, other) in &cases {
                let expected = value.kind().as_str() == *other;
                assert_eq!(
                    conforms(value, &req(other), &r),
                    expected,
                    "{value:?} against {other}"
                );
            }
            assert!(conforms(value, &req(tag), &r));
        }
    }

    #[test]
    fn test_wrong_primitive_kind_reported() {
        let f = failure(&v(json!("x")), &req("number"), &Registry::new());
        assert_eq!(
            f.kind(),
            &FailureKind::WrongPrimitiveKind {
                expected: Kind::Number,
                actual: Kind::String
            }
        );
        assert_eq!(f.value(), "\"x\"");
        assert_eq!(f.requirement(), "\"number\"");
    }

    #[test]
    fn test_unknown_name_is_a_failure_not_an_error() {
        let f = failure(&v(json!(1)), &req("nonsense"), &Registry::new());
        assert_eq!(
            f.kind(),
            &FailureKind::UnknownTypeName {
                name: "nonsense".into()
            }
        );
    }

    // ---- optional ----

    #[test]
    fn test_optional_marker() {
        let r = Registry::new();
        assert!(conforms(&Value::Undefined, &req("number?"), &r));
        assert!(!conforms(&Value::Undefined, &req("number"), &r));
        assert!(conforms(&v(json!(3)), &req("number?"), &r));
        assert!(!conforms(&v(json!("3")), &req("number?"), &r));
        assert!(!conforms(&Value::Null, &req("number?"), &r));
    }

    // ---- builtins ----

    #[test]
    fn test_builtin_rejection() {
        let f = failure(&v(json!(-1)), &req("posInt"), &Registry::new());
        assert!(matches!(
            f.kind(),
            FailureKind::BuiltinRejected { builtin } if builtin.name() == "posInt"
        ));
    }

    // ---- arrays ----

    #[test]
    fn test_empty_array_always_conforms() {
        let r = Registry::new();
        assert!(conforms(&v(json!([])), &req("[anything]"), &r));
        assert!(conforms(&v(json!([])), &req("[[number]]"), &r));
    }

    #[test]
    fn test_array_reports_first_bad_index() {
        let f = failure(&v(json!([1, 2, "x", "y"])), &req("[number]"), &Registry::new());
        assert_eq!(f.index(), Some(2));
        assert_eq!(f.pointer(), "/2");
        assert_eq!(f.value(), "\"x\"");
    }

    #[test]
    fn test_array_requires_sequence() {
        let f = failure(&v(json!({"0": 1})), &req("[number]"), &Registry::new());
        assert_eq!(f.kind(), &FailureKind::NotSequence);
        let f = failure(&Value::Buffer(vec![1]), &req("[int]"), &Registry::new());
        assert_eq!(f.kind(), &FailureKind::NotSequence);
    }

    #[test]
    fn test_array_unknown_element_is_configuration_error() {
        let err = matches(&v(json!([1])), &req("[nothing]"), &Registry::new()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownElementType {
                name: "nothing".into(),
                requirement: "[nothing]".into()
            }
        );
    }

    #[test]
    fn test_nested_empty_array_skips_inner_resolution() {
        let r = Registry::new();
        assert!(conforms(&v(json!([[]])), &req("[[nothing]]"), &r));
        assert!(conforms(&v(json!([[], []])), &req("[[nothing]?]"), &r));
        let err = matches(&v(json!([[], [1]])), &req("[[nothing]]"), &r).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownElementType {
                name: "nothing".into(),
                requirement: "[nothing]".into()
            }
        );
    }

    #[test]
    fn test_array_of_optional_elements() {
        let r = Registry::new();
        let value = Value::Array(vec![Value::from("abc"), Value::Undefined, Value::from("def")]);
        assert!(conforms(&value, &req("[string?]"), &r));
        assert!(!conforms(&value, &req("[string]"), &r));
        let f = failure(&Value::Array(vec![Value::Null]), &req("[string?]"), &r);
        assert_eq!(f.index(), Some(0));
    }

    #[test]
    fn test_optional_array() {
        let r = Registry::new();
        assert!(conforms(&Value::Undefined, &req("[int]?"), &r));
        assert!(conforms(&v(json!([1, 2])), &req("[int]?"), &r));
        assert!(!conforms(&v(json!([1.5])), &req("[int]?"), &r));
    }

    #[test]
    fn test_nested_arrays() {
        let r = Registry::new();
        assert!(conforms(&v(json!([[true], [false]])), &req("[[boolean]]"), &r));
        let f = failure(&v(json!([[true], [1]])), &req("[[boolean]]"), &r);
        assert_eq!(f.path(), [PathSegment::Index(1), PathSegment::Index(0)]);
        let f = failure(&v(json!([[true], true])), &req("[[boolean]]"), &r);
        assert_eq!(f.kind(), &FailureKind::NotSequence);
        assert_eq!(f.index(), Some(1));
    }

    #[test]
    fn test_array_of_user_type() {
        let mut r = Registry::new();
        r.register("otherObj", json!({"a": "int", "b": "otherObj?"})).unwrap();
        let good = v(json!([{"a": 1}, {"a": 2, "b": {"a": 3}}]));
        assert!(conforms(&good, &req("[otherObj]"), &r));
        let bad = v(json!([{"a": 1}, {"a": 2, "b": {"a": 3.5}}]));
        let f = failure(&bad, &req("[otherObj]"), &r);
        assert_eq!(f.pointer(), "/1/b/a");
    }

    // ---- shapes ----

    #[test]
    fn test_shape_is_structural() {
        let r = Registry::new();
        let shape = Requirement::from_json(&json!({"a": "number"})).unwrap();
        assert!(conforms(&v(json!({"a": 1, "extra": true})), &shape, &r));
    }

    #[test]
    fn test_shape_missing_field() {
        let shape = Requirement::from_json(&json!({"a": "number"})).unwrap();
        let f = failure(&v(json!({})), &shape, &Registry::new());
        assert_eq!(f.kind(), &FailureKind::MissingField { field: "a".into() });
        assert_eq!(f.pointer(), "");
    }

    #[test]
    fn test_shape_optional_field_may_be_absent() {
        let r = Registry::new();
        let shape = Requirement::from_json(&json!({"a": "number", "b": "string?"})).unwrap();
        assert!(conforms(&v(json!({"a": 1})), &shape, &r));
        assert!(conforms(&v(json!({"a": 1, "b": "x"})), &shape, &r));
        assert!(!conforms(&v(json!({"a": 1, "b": 2})), &shape, &r));
    }

    #[test]
    fn test_alias_of_optional_type_may_be_absent() {
        let mut r = Registry::new();
        r.register("maybe", "int?").unwrap();
        r.register("maybeAgain", "maybe").unwrap();
        r.register("required", "int").unwrap();
        let shape = Requirement::from_json(&json!({"x": "maybe", "y": "maybeAgain"})).unwrap();
        assert!(conforms(&Value::Undefined, &req("maybe"), &r));
        assert!(conforms(&v(json!({})), &shape, &r));
        assert!(conforms(&v(json!({"x": 1, "y": 2})), &shape, &r));
        assert_eq!(failure(&v(json!({"x": "1"})), &shape, &r).pointer(), "/x");

        let strict = Requirement::from_json(&json!({"z": "required"})).unwrap();
        let f = failure(&v(json!({})), &strict, &r);
        assert_eq!(f.kind(), &FailureKind::MissingField { field: "z".into() });
    }

    #[test]
    fn test_shape_undefined_field_counts_as_absent() {
        let shape = Requirement::from_json(&json!({"a": "number"})).unwrap();
        let mut map = Map::new();
        map.insert("a".into(), Value::Undefined);
        let f = failure(&Value::Object(map), &shape, &Registry::new());
        assert_eq!(f.kind(), &FailureKind::MissingField { field: "a".into() });
    }

    #[test]
    fn test_shape_rejects_null_and_primitives() {
        let r = Registry::new();
        let shape = Requirement::Shape(Shape::new());
        assert_eq!(failure(&Value::Null, &shape, &r).kind(), &FailureKind::NullValue);
        assert_eq!(
            failure(&v(json!(5)), &shape, &r).kind(),
            &FailureKind::NotObject {
                actual: Kind::Number
            }
        );
        assert_eq!(
            failure(&Value::Undefined, &shape, &r).kind(),
            &FailureKind::NotObject {
                actual: Kind::Undefined
            }
        );
        assert!(conforms(&v(json!([])), &shape, &r));
    }

    #[test]
    fn test_shape_reports_nested_path() {
        let shape = Requirement::from_json(&json!({"outer": {"inner": "[int]"}})).unwrap();
        let f = failure(&v(json!({"outer": {"inner": [1, 2.5]}})), &shape, &Registry::new());
        assert_eq!(f.pointer(), "/outer/inner/1");
    }

    #[test]
    fn test_shape_over_instance_fields() {
        let class = Class::new("Point");
        let mut fields = Map::new();
        fields.insert("x".into(), Value::from(1));
        let shape = Requirement::from_json(&json!({"x": "int"})).unwrap();
        assert!(conforms(&class.instantiate(fields), &shape, &Registry::new()));
    }

    // ---- recursive types ----

    #[test]
    fn test_self_referential_list() {
        let mut r = Registry::new();
        r.register("node", json!({"value": "int", "next": "node?"})).unwrap();
        let list = v(json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}}));
        assert!(conforms(&list, &req("node"), &r));

        let broken = v(json!({"value": 1, "next": {"value": 2, "next": {"value": "3"}}}));
        assert_eq!(failure(&broken, &req("node"), &r).pointer(), "/next/next/value");
    }

    fn node_registry() -> Registry {
        let mut r = Registry::new();
        r.register("node", json!({"value": "int", "next": "node?"})).unwrap();
        r
    }

    #[test]
    fn test_long_self_referential_list() {
        on_large_stack(|| {
            let r = node_registry();
            let values = (0..1000u64).map(Value::from).collect();
            assert!(conforms(&linked_list(values), &req("node"), &r));

            let mut values: Vec<Value> = (0..1000u64).map(Value::from).collect();
            values[999] = Value::from("last");
            let f = failure(&linked_list(values), &req("node"), &r);
            assert_eq!(f.path().len(), 1000);
            assert!(f.pointer().ends_with("/next/value"));
        });
    }

    #[test]
    fn test_value_nesting_bound() {
        let mut r = Registry::with_config(RegistryConfig {
            max_nesting: 10,
            ..RegistryConfig::default()
        });
        r.register("node", json!({"value": "int", "next": "node?"})).unwrap();
        let short = linked_list((0..5u64).map(Value::from).collect());
        assert!(conforms(&short, &req("node"), &r));
        let long = linked_list((0..20u64).map(Value::from).collect());
        assert_eq!(
            matches(&long, &req("node"), &r),
            Err(ConfigurationError::NestingExceeded { limit: 10 })
        );
    }

    #[test]
    fn test_depth_bound_ignores_value_nesting() {
        let mut r = Registry::with_config(RegistryConfig {
            max_depth: 4,
            ..RegistryConfig::default()
        });
        r.register("node", json!({"value": "int", "next": "node?"})).unwrap();
        let list = linked_list((0..50u64).map(Value::from).collect());
        assert!(conforms(&list, &req("node"), &r));
    }

    #[test]
    fn test_self_referential_bottoms_out_on_null() {
        let mut r = Registry::new();
        r.register("tree", json!({"label": "string", "children": "[tree]"}))
            .unwrap();
        let tree = v(json!({
            "label": "root",
            "children": [{"label": "a", "children": []}, {"label": "b", "children": [{"label": "c", "children": []}]}]
        }));
        assert!(conforms(&tree, &req("tree"), &r));

        let mut r = Registry::new();
        r.register("link", json!({"next": "link"})).unwrap();
        let chain = v(json!({"next": {"next": null}}));
        let f = failure(&chain, &req("link"), &r);
        assert_eq!(f.kind(), &FailureKind::NullValue);
        assert_eq!(f.pointer(), "/next/next");
    }

    #[test]
    fn test_alias_cycle_hits_depth_limit() {
        let mut r = Registry::with_config(RegistryConfig {
            max_depth: 32,
            ..RegistryConfig::default()
        });
        r.register("a", "b").unwrap();
        r.register("b", "a").unwrap();
        assert_eq!(
            matches(&v(json!(1)), &req("a"), &r),
            Err(ConfigurationError::DepthExceeded { limit: 32 })
        );
    }

    #[test]
    fn test_names_resolve_at_check_time() {
        let mut r = Registry::new();
        r.register("later", json!({"x": "int"})).unwrap();
        let shape = Requirement::from_json(&json!({"item": "later"})).unwrap();
        assert!(conforms(&v(json!({"item": {"x": 1}})), &shape, &r));
        r.allow_overwriting();
        r.register("later", json!({"x": "string"})).unwrap();
        assert!(!conforms(&v(json!({"item": {"x": 1}})), &shape, &r));
    }

    // ---- predicates & constructors ----

    #[test]
    fn test_predicate_strict_false() {
        let r = Registry::new();
        let is_42 = Requirement::Predicate(Predicate::named("is42", |v: &Value| {
            v.as_f64() == Some(42.0)
        }));
        assert!(conforms(&v(json!(42)), &is_42, &r));
        let f = failure(&v(json!(41)), &is_42, &r);
        assert_eq!(f.kind(), &FailureKind::PredicateRejected { detail: None });
        assert_eq!(f.requirement(), "\"[predicate is42]\"");

        let silent = Requirement::Predicate(Predicate::new(|_: &Value| {}));
        assert!(conforms(&v(json!(0)), &silent, &r));
    }

    #[test]
    fn test_predicate_error_is_failure_with_detail() {
        let picky = Requirement::Predicate(Predicate::new(|v: &Value| -> Result<bool, String> {
            v.as_str().map(|_| true).ok_or_else(|| "not text".to_string())
        }));
        let f = failure(&v(json!(1)), &picky, &Registry::new());
        assert_eq!(
            f.kind(),
            &FailureKind::PredicateRejected {
                detail: Some("not text".into())
            }
        );
    }

    #[test]
    fn test_constructor_instance_check() {
        let r = Registry::new();
        let base = Class::new("Base");
        let derived = Class::extends("Derived", &base);
        let requirement = Requirement::instance_of(&base);
        assert!(conforms(&derived.instantiate(Map::new()), &requirement, &r));
        assert!(conforms(&base.instantiate(Map::new()), &requirement, &r));

        let stranger = Class::new("Base").instantiate(Map::new());
        let f = failure(&stranger, &requirement, &r);
        assert_eq!(f.kind(), &FailureKind::NotInstance { class: "Base".into() });
        assert!(!conforms(&v(json!({})), &requirement, &r));
    }

    #[test]
    fn test_constructor_falls_back_to_predicate() {
        let r = Registry::new();
        let class = Class::new("Money");
        let requirement = Requirement::instance_of_or(
            &class,
            Predicate::new(|v: &Value| v.as_str().is_some_and(|s| s.starts_with('$'))),
        );
        assert!(conforms(&class.instantiate(Map::new()), &requirement, &r));
        assert!(conforms(&v(json!("$5")), &requirement, &r));
        assert!(!conforms(&v(json!("5")), &requirement, &r));
    }

    #[test]
    fn test_user_type_can_be_predicate() {
        let mut r = Registry::new();
        r.register("even", Predicate::new(|v: &Value| v.as_f64().map(|n| n % 2.0 == 0.0)))
            .unwrap();
        assert!(conforms(&v(json!([2, 4])), &req("[even]"), &r));
        assert_eq!(failure(&v(json!([2, 3])), &req("[even]"), &r).index(), Some(1));
        // A predicate returning `None` does not reject.
        assert!(conforms(&v(json!("x")), &req("even"), &r));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// `int` is exactly "finite with no fractional part".
        #[test]
        fn int_matches_integral_numbers(n in any::<f64>()) {
            let r = Registry::new();
            let requirement = Requirement::parse("int").unwrap();
            let ok = matches(&Value::Number(n), &requirement, &r).unwrap().is_conforming();
            prop_assert_eq!(ok, n.is_finite() && n.fract() == 0.0);
        }

        /// `posInt` is `int` restricted to non-negative numbers.
        #[test]
        fn pos_int_is_non_negative_int(n in -1.0e6f64..1.0e6) {
            let r = Registry::new();
            let pos = Requirement::parse("posInt").unwrap();
            let int = Requirement::parse("int").unwrap();
            let value = Value::Number(n);
            let is_pos = matches(&value, &pos, &r).unwrap().is_conforming();
            let is_int = matches(&value, &int, &r).unwrap().is_conforming();
            prop_assert_eq!(is_pos, is_int && n >= 0.0);
        }

        /// The failure for a homogeneous array with one bad element points at it.
        #[test]
        fn array_failure_points_at_bad_element(len in 1usize..20, bad in 0usize..20) {
            prop_assume!(bad < len);
            let items: Vec<Value> = (0..len)
                .map(|i| if i == bad { Value::from("x") } else { Value::from(i as f64) })
                .collect();
            let r = Registry::new();
            let requirement = Requirement::parse("[number]").unwrap();
            let outcome = matches(&Value::Array(items), &requirement, &r).unwrap();
            prop_assert_eq!(outcome.failure().and_then(Failure::index), Some(bad));
        }
    }
}
