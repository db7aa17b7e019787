//! Record construction and access: `record-type`, `make`, `get-key`.

use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalError;
use crate::eval::{self, Context};
use crate::list;
use crate::value::{RecordData, RecordTypeData, Symbol, Value};

pub fn register(scope: &Rc<Scope>) {
    super::define(scope, "record-type", 2, Some(2), true, builtin_record_type);
    super::define(scope, "make", 1, None, false, builtin_make);
    super::define(scope, "get-key", 2, Some(2), true, builtin_get_key);
}

/// `(record-type name (keys))`: creates a record type and binds it to `name`.
fn builtin_record_type(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let name = args[0]
        .as_symbol()
        .expect("record-type: first argument is not a symbol")
        .clone();
    let keys: Vec<Symbol> = list::iter(&args[1])
        .map(|v| {
            v.as_symbol()
                .cloned()
                .expect("record-type: key list contains a non-symbol")
        })
        .collect();
    let record_type = Value::RecordType(Rc::new(RecordTypeData {
        name: name.clone(),
        keys,
    }));
    ctx.scope.define(name, record_type.clone());
    Ok(record_type)
}

/// `(make type v1 v2 …)`: builds a record of `type` from the given values.
/// The value count must exactly match the type's key count.
fn builtin_make(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let record_type = match args[0].as_record_type() {
        Some(t) => t.clone(),
        None => {
            return ctx.fail(EvalError::invalid_argument(
                "make",
                "record-type",
                &args[0],
                1,
            ))
        }
    };
    let values = args[1..].to_vec();
    if values.len() != record_type.keys.len() {
        return ctx.fail(EvalError::invalid_make(format!(
            "{} expects {} value(s), got {}",
            record_type.name.as_str(),
            record_type.keys.len(),
            values.len()
        )));
    }
    Ok(Value::Record(Rc::new(RecordData {
        record_type,
        values,
    })))
}

/// `(get-key record key)`: evaluates `record`; `key` names a field by
/// identifier, matched directly against the record type's key list.
fn builtin_get_key(ctx: &mut Context, args: &[Value]) -> Result<Value, EvalError> {
    let record = eval::eval(ctx, args[0].clone())?;
    let record = match record.as_record() {
        Some(r) => r.clone(),
        None => {
            let key = args[1].as_symbol().map(Symbol::as_str).unwrap_or("?");
            return ctx.fail(EvalError::bad_field(record.type_name(), key));
        }
    };
    let key = args[1]
        .as_symbol()
        .expect("get-key: key is not a symbol")
        .as_str();
    match record.record_type.keys.iter().position(|k| k.as_str() == key) {
        Some(index) => Ok(record.values[index].clone()),
        None => ctx.fail(EvalError::unknown_key(record.record_type.name.as_str(), key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::intern;

    #[test]
    fn record_round_trips_through_make_and_get_key() {
        let mut ctx = Context::new();
        let keys = Value::cell(
            Value::Symbol(intern("x")),
            Value::cell(Value::Symbol(intern("y")), Value::Nil),
        );
        let record_type =
            builtin_record_type(&mut ctx, &[Value::Symbol(intern("Pt")), keys]).unwrap();

        let record = builtin_make(&mut ctx, &[record_type, Value::Int(3), Value::Int(4)]).unwrap();

        ctx.scope.define(intern("p"), record);
        let p_form = Value::Symbol(intern("p"));
        let x = builtin_get_key(&mut ctx, &[p_form, Value::Symbol(intern("x"))]).unwrap();
        assert_eq!(x.as_int(), Some(3));
    }

    #[test]
    fn make_with_wrong_value_count_is_invalid_make() {
        let mut ctx = Context::new();
        let keys = Value::cell(Value::Symbol(intern("x")), Value::Nil);
        let record_type =
            builtin_record_type(&mut ctx, &[Value::Symbol(intern("One")), keys]).unwrap();
        let err = builtin_make(&mut ctx, &[record_type]).unwrap_err();
        assert_eq!(err.kind(), "invalid-make");
    }

    #[test]
    fn make_with_non_record_type_is_invalid_call() {
        let mut ctx = Context::new();
        let err = builtin_make(&mut ctx, &[Value::Int(5), Value::Int(1)]).unwrap_err();
        assert_eq!(err.kind(), "invalid-call");
    }

    #[test]
    fn get_key_on_non_record_is_bad_field() {
        let mut ctx = Context::new();
        ctx.scope.define(intern("n"), Value::Int(5));
        let n_form = Value::Symbol(intern("n"));
        let err =
            builtin_get_key(&mut ctx, &[n_form, Value::Symbol(intern("x"))]).unwrap_err();
        assert_eq!(err.kind(), "bad-field");
    }

    #[test]
    fn unknown_key_fails() {
        let mut ctx = Context::new();
        let keys = Value::cell(Value::Symbol(intern("x")), Value::Nil);
        let record_type =
            builtin_record_type(&mut ctx, &[Value::Symbol(intern("One")), keys]).unwrap();
        let record = builtin_make(&mut ctx, &[record_type, Value::Int(1)]).unwrap();
        ctx.scope.define(intern("r"), record);
        let r_form = Value::Symbol(intern("r"));
        let err =
            builtin_get_key(&mut ctx, &[r_form, Value::Symbol(intern("missing"))]).unwrap_err();
        assert_eq!(err.kind(), "unknown-key");
    }
}
