// ABOUTME: Lexical scopes: parent-chained symbol tables with in-scope-only definition

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{Symbol, Value};

pub struct Scope {
    bindings: RefCell<HashMap<Symbol, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    /// Creates a new root scope with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child scope beneath `parent`.
    pub fn with_parent(parent: Rc<Scope>) -> Rc<Self> {
        Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `name` in THIS scope only; `=` never walks the parent chain to
    /// mutate an outer binding (spec.md §4.5.2).
    pub fn define(&self, name: Symbol, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks up `name` in this scope, then each parent in turn.
    pub fn lookup(&self, name: &Symbol) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::intern;

    #[test]
    fn define_and_lookup() {
        let scope = Scope::new();
        scope.define(intern("x"), Value::Int(42));
        assert_eq!(scope.lookup(&intern("x")).unwrap().as_int(), Some(42));
    }

    #[test]
    fn undefined_symbol_is_none() {
        let scope = Scope::new();
        assert!(scope.lookup(&intern("undefined")).is_none());
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Scope::new();
        parent.define(intern("x"), Value::Int(1));
        let child = Scope::with_parent(parent.clone());
        child.define(intern("x"), Value::Int(2));

        assert_eq!(child.lookup(&intern("x")).unwrap().as_int(), Some(2));
        assert_eq!(parent.lookup(&intern("x")).unwrap().as_int(), Some(1));
    }

    #[test]
    fn child_sees_parent_binding() {
        let parent = Scope::new();
        parent.define(intern("x"), Value::Int(7));
        let child = Scope::with_parent(parent);
        assert_eq!(child.lookup(&intern("x")).unwrap().as_int(), Some(7));
    }

    #[test]
    fn multiple_levels_all_visible() {
        let grandparent = Scope::new();
        grandparent.define(intern("a"), Value::Int(1));
        let parent = Scope::with_parent(grandparent);
        parent.define(intern("b"), Value::Int(2));
        let child = Scope::with_parent(parent);
        child.define(intern("c"), Value::Int(3));

        assert_eq!(child.lookup(&intern("a")).unwrap().as_int(), Some(1));
        assert_eq!(child.lookup(&intern("b")).unwrap().as_int(), Some(2));
        assert_eq!(child.lookup(&intern("c")).unwrap().as_int(), Some(3));
    }
}
