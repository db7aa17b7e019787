//! List-inspection builtins: `first`, `rest`, `atom?`.

use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalError;
use crate::eval::Context;
use crate::value::Value;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "first", 1, Some(1), false, builtin_first);
    super::define(scope, "rest", 1, Some(1), false, builtin_rest);
    super::define(scope, "atom?", 1, Some(1), false, builtin_atom_p);
}

/// `(first cell)`: the left of a cell.
fn builtin_first(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    match args[0].as_cell() {
        Some(cell) => Ok(cell.left.borrow().clone()),
        // resolved open question: first/rest on nil return nil rather than failing.
        None if args[0].is_nil() => Ok(Value::Nil),
        None => ctx.fail(EvalError::invalid_argument("first", "cell or nil", &args[0], 1)),
    }
}

/// `(rest cell)`: the right of a cell; `nil` if the argument is `nil`.
fn builtin_rest(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    match args[0].as_cell() {
        Some(cell) => Ok(cell.right.borrow().clone()),
        None if args[0].is_nil() => Ok(Value::Nil),
        None => ctx.fail(EvalError::invalid_argument("rest", "cell or nil", &args[0], 1)),
    }
}

/// `(atom? v)`: `1` if `v` is atomic, else `nil`.
fn builtin_atom_p(_ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    Ok(if args[0].is_atomic() {
        Value::Int(1)
    } else {
        Value::Nil
    })
}
