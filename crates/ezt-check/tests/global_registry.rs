//! The process-wide registry. Everything runs inside one test because the
//! registry is shared by every test in this binary.

use ezt_check::{
    add_type, add_types, allow_overwriting_types, check, clear_types, registered_type,
    ConfigurationError, Predicate,
};
use ezt_core::Value;
use serde_json::json;

#[test]
fn test_global_registry_lifecycle() {
    clear_types();

    // Registration and chaining.
    add_type("even", Predicate::named("even", |v: &Value| {
        v.as_f64().is_some_and(|n| n % 2.0 == 0.0)
    }))
    .unwrap()
    .add_type("evens", "[even]")
    .unwrap()
    .check(json!([2, 4, 6]))
    .is("evens")
    .unwrap();
    assert!(check(json!([2, 3])).is("evens").is_err());
    assert!(registered_type("evens").is_some());

    // Self-referential shape.
    add_types([("node", json!({"value": "int", "next": "node?"}))]).unwrap();
    check(json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}}))
        .is("node")
        .unwrap();
    assert!(check(json!({"value": 1, "next": {"value": "2"}}))
        .is_not("node")
        .is_ok());

    // Duplicates are refused until overwrite mode is on.
    assert_eq!(
        add_type("even", "int").unwrap_err(),
        ConfigurationError::DuplicateName { name: "even".into() }
    );
    assert!(matches!(
        add_type("int", "string"),
        Err(ConfigurationError::DuplicateName { .. })
    ));
    assert!(add_types([("fresh", "string"), ("even", "int")]).is_err());
    assert!(registered_type("fresh").is_none(), "failed batch must not apply");

    // A check taken before a change keeps its snapshot.
    let before = check(json!(3));

    allow_overwriting_types();
    add_type("even", "int").unwrap();
    check(json!(3)).is("even").unwrap();
    assert!(before.is("even").is_err());

    // Clearing removes user types but not built-ins, and overwrite mode
    // stays on.
    clear_types();
    assert!(registered_type("even").is_none());
    assert!(check(json!(3)).is("even").is_err());
    check(json!(3)).is("int").unwrap();
    add_type("node", "string").unwrap();
    add_type("node", "number").unwrap();
    check(json!(1)).is("node").unwrap();

    clear_types();
}
