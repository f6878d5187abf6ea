//! Helpers shared by unit tests.

use ezt_core::{Map, Value};

/// A singly linked list of `{"value": .., "next": ..}` nodes, outermost
/// first. The last node has no `next`.
pub(crate) fn linked_list(values: Vec<Value>) -> Value {
    let mut next = None;
    for value in values.into_iter().rev() {
        let mut node = Map::new();
        node.insert("value".into(), value);
        if let Some(tail) = next.take() {
            node.insert("next".into(), tail);
        }
        next = Some(Value::Object(node));
    }
    next.unwrap_or_default()
}

/// Run `f` on a thread with room for deeply nested walks.
pub(crate) fn on_large_stack<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    std::thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(f)
        .expect("spawn test thread")
        .join()
        .expect("test thread panicked")
}
