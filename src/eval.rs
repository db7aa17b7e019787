// ABOUTME: The evaluator: scope-chained Context, self-evaluation rules, and function application

use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::env::Scope;
use crate::error::EvalError;
use crate::list;
use crate::value::{FunctionData, FunctionKind, Symbol, Value};

/// A dispatch key for method lookup: either a built-in type name or a
/// specific record type, identified by its `Rc` address (every `make-type`
/// call allocates a fresh `RecordTypeData`, so the address is a stable,
/// process-lifetime identity for that type).
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Builtin(&'static str),
    Record(usize),
}

const BUILTIN_TYPE_NAMES: &[&str] = &[
    "nil",
    "int",
    "string",
    "symbol",
    "cell",
    "quoted",
    "function",
    "record-type",
];

/// The type tag used as a method-table key for `self`'s runtime type.
pub fn type_of(v: &Value) -> TypeTag {
    match v {
        Value::Nil => TypeTag::Builtin("nil"),
        Value::Int(_) => TypeTag::Builtin("int"),
        Value::String(_) => TypeTag::Builtin("string"),
        Value::Symbol(_) => TypeTag::Builtin("symbol"),
        Value::Cell(_) => TypeTag::Builtin("cell"),
        Value::Quoted(_) => TypeTag::Builtin("quoted"),
        Value::Function(_) => TypeTag::Builtin("function"),
        Value::RecordType(_) => TypeTag::Builtin("record-type"),
        Value::Record(r) => TypeTag::Record(Rc::as_ptr(&r.record_type) as usize),
    }
}

/// Resolves `def-method`'s `type` argument: a literal built-in type name is
/// matched directly; anything else is evaluated in the current scope and
/// must produce a record-type value (spec.md §4.5, SPEC_FULL.md §4.5).
pub fn resolve_type_tag(ctx: &mut Context, form: &Value) -> Result<TypeTag, EvalError> {
    if let Some(sym) = form.as_symbol() {
        if let Some(name) = BUILTIN_TYPE_NAMES.iter().find(|n| **n == sym.as_str()) {
            return Ok(TypeTag::Builtin(name));
        }
    }
    let evaluated = eval(ctx, form.clone())?;
    match evaluated.as_record_type() {
        Some(rt) => Ok(TypeTag::Record(Rc::as_ptr(rt) as usize)),
        None => Err(EvalError::invalid_make(
            "def-method's type argument must be a built-in type name or a record-type value",
        )),
    }
}

thread_local! {
    static BUILTINS_SCOPE: OnceCell<Rc<Scope>> = OnceCell::new();
}

/// Returns this thread's builtins scope, building it the first time it is
/// asked for. Every `Context` on this thread shares the same instance as its
/// scope chain's root, matching spec.md §5's one-shot-per-thread init gate.
pub fn builtins_scope() -> Rc<Scope> {
    BUILTINS_SCOPE.with(|cell| {
        cell.get_or_init(|| {
            log::debug!("initializing builtins scope for this thread");
            let scope = Scope::new();
            crate::builtins::register(&scope);
            scope
        })
        .clone()
    })
}

/// Everything one evaluation needs: the active and global scopes, the most
/// recently raised error (for introspection), and the method dispatch table.
pub struct Context {
    pub global_scope: Rc<Scope>,
    pub scope: Rc<Scope>,
    pub error: Option<Value>,
    pub methods: HashMap<(TypeTag, Symbol), Value>,
}

impl Context {
    pub fn new() -> Self {
        let global = Scope::with_parent(builtins_scope());
        Context {
            global_scope: global.clone(),
            scope: global,
            error: None,
            methods: HashMap::new(),
        }
    }

    /// Records `err` as the context's current error and returns it, so the
    /// call site can both propagate via `?` and leave the error slot
    /// up to date at the point it was actually raised.
    pub fn fail<T>(&mut self, err: EvalError) -> Result<T, EvalError> {
        self.error = Some(err.to_value());
        Err(err)
    }

    pub fn define_method(&mut self, type_tag: TypeTag, name: Symbol, func: Value) {
        self.methods.insert((type_tag, name), func);
    }

    pub fn lookup_method(&self, type_tag: &TypeTag, name: &Symbol) -> Option<Value> {
        self.methods.get(&(type_tag.clone(), name.clone())).cloned()
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

/// Evaluates one form against `ctx.scope`, per spec.md §4.5.3:
/// - atomic values (nil, int, string, function, record-type, record) self-evaluate
/// - symbols resolve through the scope chain, or fail `undefined-variable`
/// - a quoted value returns its inner value unevaluated
/// - a cell evaluates its head; a function head is applied to the unevaluated
///   tail, a single-element non-function head echoes itself, and a
///   multi-element non-function head fails `not-func`
pub fn eval(ctx: &mut Context, form: Value) -> Result<Value, EvalError> {
    match &form {
        Value::Symbol(sym) => ctx
            .scope
            .lookup(sym)
            .ok_or_else(|| EvalError::undefined_variable(sym.as_str()))
            .or_else(|err| ctx.fail(err)),
        Value::Quoted(inner) => Ok((**inner).clone()),
        Value::Cell(cell) => {
            let head_form = cell.left.borrow().clone();
            let head = eval(ctx, head_form)?;
            let tail = cell.right.borrow().clone();
            if let Some(func) = head.as_function().cloned() {
                apply(ctx, &func, tail)
            } else if tail.is_nil() {
                Ok(head)
            } else {
                ctx.fail(EvalError::not_func(&head))
            }
        }
        _ => Ok(form),
    }
}

/// Applies `func` to the forms in `args`, per spec.md §4.5.4:
/// arguments are evaluated left to right unless `func` is direct, the
/// resulting count is checked against `func`'s arity range, and a
/// source-defined function runs its body in a fresh scope parented on the
/// closure it captured.
pub fn apply(ctx: &mut Context, func: &Rc<FunctionData>, args: Value) -> Result<Value, EvalError> {
    let forms: Vec<Value> = list::iter(&args).collect();
    let argv: Vec<Value> = if func.is_direct {
        forms
    } else {
        forms
            .into_iter()
            .map(|form| eval(ctx, form))
            .collect::<Result<_, _>>()?
    };

    let n = argv.len();
    if n < func.min_arity || func.max_arity.is_some_and(|max| n > max) {
        return ctx.fail(EvalError::invalid_call(
            &func.name,
            func.min_arity,
            func.max_arity,
            n,
        ));
    }

    match &func.kind {
        FunctionKind::Native(native) => native(ctx, &argv),
        FunctionKind::Source {
            params,
            body,
            captured,
        } => {
            log::trace!("calling {}", func.name);
            let call_scope = Scope::with_parent(captured.clone());
            for (param, value) in params.iter().zip(argv) {
                call_scope.define(param.clone(), value);
            }
            let saved = std::mem::replace(&mut ctx.scope, call_scope);
            let result = eval(ctx, body.clone());
            ctx.scope = saved;
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::intern;

    fn native(name: &str, min: usize, max: Option<usize>, f: crate::value::NativeFn) -> Value {
        Value::Function(Rc::new(FunctionData {
            name: name.to_string(),
            min_arity: min,
            max_arity: max,
            is_direct: false,
            kind: FunctionKind::Native(f),
        }))
    }

    #[test]
    fn atoms_self_evaluate() {
        let mut ctx = Context::new();
        assert_eq!(eval(&mut ctx, Value::Int(5)).unwrap().as_int(), Some(5));
        assert!(eval(&mut ctx, Value::Nil).unwrap().is_nil());
    }

    #[test]
    fn quoted_value_is_returned_unevaluated() {
        let mut ctx = Context::new();
        let quoted = Value::quoted(Value::Symbol(intern("undefined-thing")));
        let result = eval(&mut ctx, quoted).unwrap();
        assert_eq!(result.as_symbol().unwrap().as_str(), "undefined-thing");
    }

    #[test]
    fn undefined_symbol_fails() {
        let mut ctx = Context::new();
        let err = eval(&mut ctx, Value::Symbol(intern("nope"))).unwrap_err();
        assert_eq!(err.kind(), "undefined-variable");
        assert!(ctx.error.is_some());
    }

    #[test]
    fn single_element_non_function_head_echoes_itself() {
        let mut ctx = Context::new();
        let form = Value::cell(Value::Int(9), Value::Nil);
        assert_eq!(eval(&mut ctx, form).unwrap().as_int(), Some(9));
    }

    #[test]
    fn multi_element_non_function_head_is_not_func() {
        let mut ctx = Context::new();
        let form = Value::cell(Value::Int(9), Value::cell(Value::Int(1), Value::Nil));
        let err = eval(&mut ctx, form).unwrap_err();
        assert_eq!(err.kind(), "not-func");
    }

    #[test]
    fn applying_a_function_evaluates_args_and_checks_arity() {
        let mut ctx = Context::new();
        ctx.scope.define(
            intern("succ"),
            native("succ", 1, Some(1), |_ctx, args| {
                Ok(Value::Int(args[0].as_int().unwrap() + 1))
            }),
        );
        let form = Value::cell(
            Value::Symbol(intern("succ")),
            Value::cell(Value::Int(41), Value::Nil),
        );
        assert_eq!(eval(&mut ctx, form).unwrap().as_int(), Some(42));
    }

    #[test]
    fn arity_violation_is_invalid_call() {
        let mut ctx = Context::new();
        ctx.scope.define(
            intern("succ"),
            native("succ", 1, Some(1), |_ctx, args| Ok(args[0].clone())),
        );
        let form = Value::cell(Value::Symbol(intern("succ")), Value::Nil);
        let err = eval(&mut ctx, form).unwrap_err();
        assert_eq!(err.kind(), "invalid-call");
    }
}
