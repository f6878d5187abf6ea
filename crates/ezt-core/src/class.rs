//! # Classes, Instances and Functions
//!
//! Constructor-style values. A [`Class`] is a reference-counted identity:
//! cloning a class yields the same class, while two calls to
//! [`Class::new`] with the same name yield two unrelated classes. This is
//! what makes `instanceof`-style checks identity based rather than name
//! based.

use std::fmt;
use std::sync::Arc;

use crate::value::{Map, Value};

struct ClassInner {
    name: String,
    parent: Option<Class>,
}

/// A constructor reference with identity and an optional parent class.
#[derive(Clone)]
pub struct Class(Arc<ClassInner>);

impl Class {
    /// Declare a new root class.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(ClassInner {
            name: name.into(),
            parent: None,
        }))
    }

    /// Declare a class that inherits from `parent`. Instances of the new
    /// class are also instances of `parent` and all of its ancestors.
    pub fn extends(name: impl Into<String>, parent: &Class) -> Self {
        Self(Arc::new(ClassInner {
            name: name.into(),
            parent: Some(parent.clone()),
        }))
    }

    /// The declared class name. Not unique.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The direct parent class, if any.
    pub fn parent(&self) -> Option<&Class> {
        self.0.parent.as_ref()
    }

    /// Iterate over this class and its ancestors, nearest first.
    pub fn lineage(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |c| c.parent())
    }

    /// Construct an instance of this class carrying `fields`.
    pub fn instantiate(&self, fields: Map) -> Value {
        Value::Instance(Instance {
            class: self.clone(),
            fields,
        })
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.0.name)
    }
}

/// An object produced by a [`Class`].
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: Class,
    fields: Map,
}

impl Instance {
    /// The class this instance was constructed by.
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// The instance's own fields.
    pub fn fields(&self) -> &Map {
        &self.fields
    }

    /// `instanceof`: true if `class` is this instance's class or one of its
    /// ancestors.
    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.class.lineage().any(|c| c == class)
    }
}

type NativeFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A callable value. Its `typeof` is `function`.
#[derive(Clone)]
pub struct Function {
    name: Option<String>,
    body: Arc<NativeFn>,
}

impl Function {
    /// Wrap a named native function.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            body: Arc::new(body),
        }
    }

    /// Wrap an anonymous native function.
    pub fn anonymous<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: None,
            body: Arc::new(body),
        }
    }

    /// The function's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.body)(args)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.body) as *const (),
            Arc::as_ptr(&other.body) as *const (),
        )
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Function({name})"),
            None => f.write_str("Function(<anonymous>)"),
        }
    }
}
