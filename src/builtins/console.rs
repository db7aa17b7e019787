//! Console output: `print`.

use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalError;
use crate::eval::Context;
use crate::value::Value;

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "print", 0, None, false, builtin_print);
}

/// `(print v1 v2 …)`: inspects each argument, space-separated, newline-terminated.
fn builtin_print(_ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let rendered: Vec<String> = args.iter().map(Value::inspect).collect();
    println!("{}", rendered.join(" "));
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_returns_nil() {
        let mut ctx = Context::new();
        let result = builtin_print(&mut ctx, &[Value::Int(1), Value::string("x")]).unwrap();
        assert!(result.is_nil());
    }
}
