//! Core special forms: binding, quotation, function construction.

use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalError;
use crate::eval::{self, Context};
use crate::list;
use crate::value::{FunctionData, FunctionKind, Symbol, Value};

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "=", 2, Some(2), true, builtin_set);
    super::define(scope, "quote", 1, Some(1), true, builtin_quote);
    super::define(scope, "eval", 1, Some(1), false, builtin_eval);
    super::define(scope, "inspect", 1, Some(1), false, builtin_inspect);
    super::define(scope, "inspect-direct", 1, Some(1), true, builtin_inspect);
    super::define(scope, "let", 2, Some(2), true, builtin_let);
    super::define(scope, "lambda", 2, Some(2), true, builtin_lambda);
    super::define(scope, "def", 3, Some(3), true, builtin_def);
    super::define(scope, "def-direct", 3, Some(3), true, builtin_def_direct);
}

/// `(= name value)`: evaluate `value` and bind `name` in the current scope.
fn builtin_set(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let name = args[0]
        .as_symbol()
        .expect("=: first argument is not a symbol")
        .clone();
    let value = eval::eval(ctx, args[1].clone())?;
    ctx.scope.define(name, value.clone());
    Ok(value)
}

/// `(quote form)`: return the argument unevaluated.
fn builtin_quote(_ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    Ok(args[0].clone())
}

/// `(eval form)`: re-evaluate the (already-evaluated) argument as a form.
fn builtin_eval(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    eval::eval(ctx, args[0].clone())
}

/// `(inspect v)` / `(inspect-direct form)`: the argument's `inspect` rendering.
fn builtin_inspect(_ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::string(args[0].inspect()))
}

/// `(let {bindings} body)`: a fresh scope where each `(name value)` binding
/// is evaluated in source order, visible to subsequent bindings in the same
/// `let` but not to each other's siblings outside this scope.
fn builtin_let(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let let_scope = Scope::with_parent(ctx.scope.clone());
    let saved = std::mem::replace(&mut ctx.scope, let_scope);

    for binding in list::iter(&args[0]) {
        let mut parts = list::iter(&binding);
        let name = parts
            .next()
            .and_then(|v| v.as_symbol().cloned())
            .expect("let: binding is missing a name");
        let value_form = parts.next().expect("let: binding is missing a value");
        let value = match eval::eval(ctx, value_form) {
            Ok(v) => v,
            Err(err) => {
                ctx.scope = saved;
                return Err(err);
            }
        };
        ctx.scope.define(name, value);
    }

    let result = eval::eval(ctx, args[1].clone());
    ctx.scope = saved;
    result
}

fn parse_params(params_form: &Value) -> Vec<Symbol> {
    list::iter(params_form)
        .map(|v| {
            v.as_symbol()
                .cloned()
                .expect("function parameter list contains a non-symbol")
        })
        .collect()
}

/// `(lambda (params) body)`: a function value capturing the current scope.
fn builtin_lambda(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let params = parse_params(&args[0]);
    Ok(Value::Function(Rc::new(FunctionData {
        name: "lambda".to_string(),
        min_arity: params.len(),
        max_arity: Some(params.len()),
        is_direct: false,
        kind: FunctionKind::Source {
            params,
            body: args[1].clone(),
            captured: ctx.scope.clone(),
        },
    })))
}

fn def_impl(ctx: &mut Context, args: &[Value], is_direct: bool) -> Result<Value, EvalError> {
    let name = args[0]
        .as_symbol()
        .expect("def: first argument is not a symbol")
        .clone();
    let params = parse_params(&args[1]);
    let func = Value::Function(Rc::new(FunctionData {
        name: name.as_str().to_string(),
        min_arity: params.len(),
        max_arity: Some(params.len()),
        is_direct,
        kind: FunctionKind::Source {
            params,
            body: args[2].clone(),
            captured: ctx.scope.clone(),
        },
    }));
    ctx.scope.define(name, func.clone());
    Ok(func)
}

/// `(def name (params) body)`: binds a normal (argument-evaluating) function.
fn builtin_def(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    def_impl(ctx, args, false)
}

/// `(def-direct name (params) body)`: as `def`, but the bound function is direct.
fn builtin_def_direct(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    def_impl(ctx, args, true)
}
