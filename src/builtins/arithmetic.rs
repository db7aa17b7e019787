//! Arithmetic builtins: `+`.

use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalError;
use crate::eval::Context;
use crate::value::Value;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "+", 1, None, false, builtin_add);
}

/// `(+ v1 v2 …)` sums its (already-evaluated) integer arguments.
///
/// A non-int argument is a user-supplied type mismatch, recoverable at the
/// REPL boundary like any other call error, matching the teacher's
/// `builtin_add`'s `Err(EvalError::TypeError)` return rather than a panic.
fn builtin_add(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let mut sum: i64 = 0;
    for (i, v) in args.iter().enumerate() {
        match v.as_int() {
            Some(n) => sum += n,
            None => return ctx.fail(EvalError::invalid_argument("+", "int", v, i + 1)),
        }
    }
    Ok(Value::Int(sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_all_arguments() {
        let mut ctx = Context::new();
        let result = builtin_add(&mut ctx, &[Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap();
        assert_eq!(result.as_int(), Some(6));
    }

    #[test]
    fn single_argument_is_identity() {
        let mut ctx = Context::new();
        let result = builtin_add(&mut ctx, &[Value::Int(5)]).unwrap();
        assert_eq!(result.as_int(), Some(5));
    }

    #[test]
    fn non_int_argument_is_invalid_call() {
        let mut ctx = Context::new();
        let err = builtin_add(&mut ctx, &[Value::Int(1), Value::string("x")]).unwrap_err();
        assert_eq!(err.kind(), "invalid-call");
    }
}
