//! # Built-in Functions Module
//!
//! Core built-in functions for the language, organized into six categories.
//!
//! - **[arithmetic]**: `+`
//! - **[core]**: `=`, `quote`, `eval`, `inspect`, `inspect-direct`, `let`, `lambda`, `def`, `def-direct`
//! - **[lists]**: `first`, `rest`, `atom?`
//! - **[console]**: `print`
//! - **[records]**: `record-type`, `make`, `get-key`
//! - **[methods]**: `def-method`, `@`

use std::rc::Rc;

use crate::env::Scope;
use crate::value::{intern, FunctionData, FunctionKind, MaxArity, NativeFn, Value};

pub mod arithmetic;
pub mod console;
pub mod core;
pub mod lists;
pub mod methods;
pub mod records;

/// Registers every builtin category into the (shared, read-only) builtins scope.
pub fn register(scope: &Rc<Scope>) {
    arithmetic::register(scope);
    core::register(scope);
    lists::register(scope);
    console::register(scope);
    records::register(scope);
    methods::register(scope);
}

/// Defines a native function value named `name` directly in `scope`.
pub(crate) fn define(
    scope: &Rc<Scope>,
    name: &str,
    min_arity: usize,
    max_arity: MaxArity,
    is_direct: bool,
    f: NativeFn,
) {
    let func = Value::Function(Rc::new(FunctionData {
        name: name.to_string(),
        min_arity,
        max_arity,
        is_direct,
        kind: FunctionKind::Native(f),
    }));
    scope.define(intern(name), func);
}
