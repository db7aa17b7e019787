// ABOUTME: Error types for tokenizing, parsing, and evaluation failures

use thiserror::Error;

use crate::value::{intern, Value};

/// The four syntax-error kinds the tokenizer/parser can raise, matching
/// `KhSyntaxError` in the original (the three parser-callback-only kinds are
/// not reachable from this core and are omitted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    UnexpectedChar,
    MissingDelimiter,
    Malformed,
    BadLiteral,
}

impl SyntaxErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            SyntaxErrorKind::UnexpectedChar => "unexpected-char",
            SyntaxErrorKind::MissingDelimiter => "missing-delimiter",
            SyntaxErrorKind::Malformed => "malformed",
            SyntaxErrorKind::BadLiteral => "bad-literal",
        }
    }
}

/// A tokenizer or parser failure, carrying enough position information to
/// render `"<message> in <filename>, line <line>, column <column>"`, matching
/// the original's `_error`/`_set_error` format string.
#[derive(Error, Debug, Clone)]
#[error("{message} in {filename}, line {line}, column {col}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub filename: String,
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl SyntaxError {
    /// Builds the first-class `(symbol kind, string message, nil)` error
    /// value spec.md §4.5.2/§7 describes — a proper two-element list, not a
    /// dotted pair.
    pub fn to_value(&self) -> Value {
        Value::cell(
            Value::Symbol(intern(self.kind.as_str())),
            Value::cell(Value::string(self.to_string()), Value::Nil),
        )
    }
}

/// The evaluator's error taxonomy. Every variant corresponds to one of the
/// first-class `(symbol kind, string message)` error values spec.md §7
/// describes; `kind()` gives the exact symbol name raised at the error site.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("not a function: {0}")]
    NotFunc(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    InvalidCall {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    InvalidArgument {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    #[error("undefined method {method} for type {type_name}")]
    UndefinedMethod { type_name: String, method: String },

    #[error("cannot set field {field} on {type_name}")]
    BadField { type_name: String, field: String },

    #[error("cannot dispatch method {method} on nil self")]
    BadSelf { method: String },

    #[error("unknown key {key} for record type {type_name}")]
    UnknownKey { type_name: String, key: String },

    #[error("invalid arguments to make: {0}")]
    InvalidMake(String),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl EvalError {
    pub fn undefined_variable(name: &str) -> Self {
        EvalError::UndefinedVariable(name.to_string())
    }

    pub fn not_func(form: &Value) -> Self {
        EvalError::NotFunc(form.inspect())
    }

    /// Builds the exact three arity-error message shapes spec.md §4.5.4
    /// describes: an exact count, an unbounded "N or more", or a bounded
    /// "between X and Y" range.
    pub fn invalid_call(function: &str, min: usize, max: Option<usize>, actual: usize) -> Self {
        let expected = match max {
            None if min == 0 => "any number of".to_string(),
            None => format!("{min} or more"),
            Some(max) if max == min => format!("{min}"),
            Some(max) => format!("between {min} and {max}"),
        };
        EvalError::InvalidCall {
            function: function.to_string(),
            expected,
            actual,
        }
    }

    /// A user-supplied argument didn't match the type a builtin requires
    /// (e.g. a non-int passed to `+`). Reported under the same `invalid-call`
    /// kind as an arity mismatch — both are "this call was invalid" — rather
    /// than inventing a kind spec.md's fixed taxonomy doesn't name, matching
    /// the teacher's `EvalError::type_error` constructor.
    pub fn invalid_argument(function: &str, expected: &str, actual: &Value, position: usize) -> Self {
        EvalError::InvalidArgument {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
            position,
        }
    }

    pub fn undefined_method(type_name: &str, method: &str) -> Self {
        EvalError::UndefinedMethod {
            type_name: type_name.to_string(),
            method: method.to_string(),
        }
    }

    pub fn bad_field(type_name: &str, field: &str) -> Self {
        EvalError::BadField {
            type_name: type_name.to_string(),
            field: field.to_string(),
        }
    }

    pub fn bad_self(method: &str) -> Self {
        EvalError::BadSelf {
            method: method.to_string(),
        }
    }

    pub fn unknown_key(type_name: &str, key: &str) -> Self {
        EvalError::UnknownKey {
            type_name: type_name.to_string(),
            key: key.to_string(),
        }
    }

    pub fn invalid_make(message: impl Into<String>) -> Self {
        EvalError::InvalidMake(message.into())
    }

    /// The error's kind symbol, used both as the user-visible tag and as the
    /// left element of the first-class error cell `to_value` builds.
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::UndefinedVariable(_) => "undefined-variable",
            EvalError::NotFunc(_) => "not-func",
            EvalError::InvalidCall { .. } => "invalid-call",
            EvalError::InvalidArgument { .. } => "invalid-call",
            EvalError::UndefinedMethod { .. } => "undefined-method",
            EvalError::BadField { .. } => "bad-field",
            EvalError::BadSelf { .. } => "bad-self",
            EvalError::UnknownKey { .. } => "unknown-key",
            EvalError::InvalidMake(_) => "invalid-make",
            EvalError::Syntax(_) => "syntax-error",
        }
    }

    /// The message payload carried in the second element of the error cell.
    /// This is the bare datum the error "carries" (a name, an inspected
    /// form, an arity description) rather than `Display`'s full sentence,
    /// which stays human-oriented for logs and `eprintln!`.
    fn payload_message(&self) -> String {
        match self {
            EvalError::UndefinedVariable(name) => name.clone(),
            EvalError::NotFunc(inspected) => inspected.clone(),
            EvalError::InvalidCall {
                function,
                expected,
                actual,
            } => {
                let plural = if expected == "1" { "" } else { "s" };
                format!("{function}: expected {expected} argument{plural}, got {actual}")
            }
            EvalError::InvalidArgument {
                function,
                expected,
                actual,
                position,
            } => format!("{function}: expected {expected}, got {actual} at argument {position}"),
            EvalError::UndefinedMethod { type_name, method } => {
                format!("{method} for type {type_name}")
            }
            EvalError::BadField { type_name, field } => format!("{field} on {type_name}"),
            EvalError::BadSelf { method } => method.clone(),
            EvalError::UnknownKey { type_name, key } => {
                format!("{key} for record type {type_name}")
            }
            EvalError::InvalidMake(message) => message.clone(),
            EvalError::Syntax(e) => e.message.clone(),
        }
    }

    /// Builds the first-class `(symbol kind, string message, nil)` error
    /// value spec.md §4.5.2/§7 describes — a proper two-element list, not
    /// the dotted pair `(kind . message)` that would render wrong at the
    /// REPL (matching the original's `KH_ERROR` macro,
    /// `kh_cell_new(sym, kh_cell_new(str, kh_nil))`).
    pub fn to_value(&self) -> Value {
        Value::cell(
            Value::Symbol(intern(self.kind())),
            Value::cell(Value::string(self.payload_message()), Value::Nil),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_call_exact_arity_message() {
        let err = EvalError::invalid_call("+", 1, Some(1), 0);
        assert_eq!(err.to_string(), "+: expected 1 argument, got 0");
    }

    #[test]
    fn invalid_call_range_arity_message() {
        let err = EvalError::invalid_call("let", 2, Some(3), 4);
        assert_eq!(err.to_string(), "let: expected between 2 and 3 arguments, got 4");
    }

    #[test]
    fn invalid_call_unbounded_arity_message() {
        let err = EvalError::invalid_call("+", 1, None, 0);
        assert_eq!(err.to_string(), "+: expected 1 or more arguments, got 0");
    }

    #[test]
    fn to_value_builds_error_cell() {
        let err = EvalError::undefined_variable("x");
        let cell = err.to_value();
        let inner = cell.as_cell().unwrap();
        assert_eq!(
            inner.left.borrow().as_symbol().unwrap().as_str(),
            "undefined-variable"
        );
        assert_eq!(err.to_value().inspect(), "(undefined-variable \"x\")");
    }

    #[test]
    fn syntax_error_message_matches_original_format() {
        let err = SyntaxError {
            kind: SyntaxErrorKind::Malformed,
            filename: "<repl>".to_string(),
            line: 3,
            col: 7,
            message: "Non-matching operator + in operator list".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Non-matching operator + in operator list in <repl>, line 3, column 7"
        );
    }
}
