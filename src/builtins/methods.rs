//! Type-keyed method dispatch: `def-method`, `@`.

use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalError;
use crate::eval::{self, Context};
use crate::list;
use crate::value::{FunctionData, FunctionKind, Symbol, Value};

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "def-method", 4, Some(4), true, builtin_def_method);
    super::define(scope, "@", 2, None, true, builtin_at);
}

fn parse_params(params_form: &Value) -> Vec<Symbol> {
    list::iter(params_form)
        .map(|v| {
            v.as_symbol()
                .cloned()
                .expect("def-method: parameter list contains a non-symbol")
        })
        .collect()
}

/// `(def-method type name (params) body)`: registers a function in the
/// method table keyed by `(type-identity, interned method name)`.
fn builtin_def_method(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let type_tag = eval::resolve_type_tag(ctx, &args[0])?;
    let name = args[1]
        .as_symbol()
        .expect("def-method: second argument is not a symbol")
        .clone();
    let params = parse_params(&args[2]);
    let func = Value::Function(Rc::new(FunctionData {
        name: name.as_str().to_string(),
        min_arity: params.len(),
        max_arity: Some(params.len()),
        is_direct: false,
        kind: FunctionKind::Source {
            params,
            body: args[3].clone(),
            captured: ctx.scope.clone(),
        },
    }));
    log::trace!("def-method {}", name.as_str());
    ctx.define_method(type_tag, name, func.clone());
    Ok(func)
}

fn self_type_name(self_val: &Value) -> String {
    match self_val.as_record() {
        Some(record) => record.record_type.name.as_str().to_string(),
        None => self_val.type_name().to_string(),
    }
}

/// `(@ self name arg…)`: evaluates `self`, looks up `(type(self), name)` in
/// the method table, and calls it with `self` (quoted, so the dispatched
/// function's own argument evaluation does not re-evaluate it) prepended to
/// the remaining unevaluated argument forms.
fn builtin_at(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let self_val = eval::eval(ctx, args[0].clone())?;
    let name = args[1]
        .as_symbol()
        .expect("@: method name is not a symbol")
        .clone();

    if self_val.is_nil() {
        return ctx.fail(EvalError::bad_self(name.as_str()));
    }

    let type_tag = eval::type_of(&self_val);
    let method = match ctx.lookup_method(&type_tag, &name) {
        Some(method) => method,
        None => {
            return ctx.fail(EvalError::undefined_method(
                &self_type_name(&self_val),
                name.as_str(),
            ))
        }
    };
    let method = method
        .as_function()
        .expect("method table entry is not a function")
        .clone();

    let mut call_forms = vec![Value::quoted(self_val)];
    call_forms.extend(args[2..].iter().cloned());
    let call_args = list::from_values(call_forms);
    eval::apply(ctx, &method, call_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::intern;

    #[test]
    fn dispatch_calls_registered_method() {
        let mut ctx = Context::new();
        let type_form = Value::Symbol(intern("string"));
        let params = Value::cell(Value::Symbol(intern("self")), Value::Nil);
        let body = Value::Symbol(intern("self"));
        builtin_def_method(
            &mut ctx,
            &[type_form, Value::Symbol(intern("identity")), params, body],
        )
        .unwrap();

        let self_form = Value::string("hi");
        let result = builtin_at(
            &mut ctx,
            &[self_form, Value::Symbol(intern("identity"))],
        )
        .unwrap();
        assert_eq!(result.inspect(), "\"hi\"");
    }

    #[test]
    fn dispatch_on_nil_self_is_bad_self() {
        let mut ctx = Context::new();
        let err = builtin_at(&mut ctx, &[Value::Nil, Value::Symbol(intern("greet"))]).unwrap_err();
        assert_eq!(err.kind(), "bad-self");
    }

    #[test]
    fn missing_method_is_undefined_method() {
        let mut ctx = Context::new();
        let err = builtin_at(
            &mut ctx,
            &[Value::Int(1), Value::Symbol(intern("nope"))],
        )
        .unwrap_err();
        assert_eq!(err.kind(), "undefined-method");
    }
}
