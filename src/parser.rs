// ABOUTME: Recursive-descent parser with one-token lookahead, producing a value tree from tokens

use crate::error::{EvalError, SyntaxError, SyntaxErrorKind};
use crate::list;
use crate::token::{token_starts_value, Token, TokenKind, Tokenizer};
use crate::value::{intern, Value};

/// Where a list-like production stops: a specific punctuation character, or
/// end of input (only the top-level program production ends there).
#[derive(Clone, Copy, PartialEq)]
enum End {
    Punct(char),
    Eof,
}

impl End {
    fn matches(self, kind: &TokenKind) -> bool {
        match self {
            End::Punct(c) => *kind == TokenKind::Punct(c),
            End::Eof => *kind == TokenKind::Eof,
        }
    }

    fn describe(self) -> String {
        match self {
            End::Punct(c) => format!("'{c}'"),
            End::Eof => "end of input".to_string(),
        }
    }
}

pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    peeked: Option<Token>,
    filename: String,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Parser {
            tokenizer: Tokenizer::new(source, filename.clone()),
            peeked: None,
            filename,
        }
    }

    fn peek(&mut self) -> Result<&Token, EvalError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.tokenizer.next_token()?);
        }
        Ok(self.peeked.as_ref().expect("just filled"))
    }

    fn consume(&mut self) -> Result<Token, EvalError> {
        if let Some(tok) = self.peeked.take() {
            return Ok(tok);
        }
        Ok(self.tokenizer.next_token()?)
    }

    fn malformed(&self, line: usize, col: usize, message: impl Into<String>) -> EvalError {
        EvalError::Syntax(SyntaxError {
            kind: SyntaxErrorKind::Malformed,
            filename: self.filename.clone(),
            line,
            col,
            message: message.into(),
        })
    }

    fn bad_literal(&self, line: usize, col: usize, message: impl Into<String>) -> EvalError {
        EvalError::Syntax(SyntaxError {
            kind: SyntaxErrorKind::BadLiteral,
            filename: self.filename.clone(),
            line,
            col,
            message: message.into(),
        })
    }

    fn describe(tok: &Token) -> String {
        match &tok.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Punct(c) => format!("'{c}'"),
            TokenKind::Identifier => format!("identifier '{}'", tok.text),
            TokenKind::Number => format!("number '{}'", tok.text),
            TokenKind::String => "a string literal".to_string(),
        }
    }

    fn expect_end(&mut self, end: End) -> Result<(), EvalError> {
        let tok = self.peek()?.clone();
        if end.matches(&tok.kind) {
            self.consume()?;
            Ok(())
        } else {
            Err(self.malformed(
                tok.line,
                tok.col,
                format!(
                    "Unexpected {}, expected one of: {}",
                    Self::describe(&tok),
                    end.describe()
                ),
            ))
        }
    }

    fn at_end(&mut self, end: End) -> Result<bool, EvalError> {
        Ok(end.matches(&self.peek()?.kind))
    }

    fn is_separator(&mut self) -> Result<bool, EvalError> {
        Ok(matches!(self.peek()?.kind, TokenKind::Punct(',') | TokenKind::Punct('\n')))
    }

    fn skip_separators(&mut self) -> Result<(), EvalError> {
        while self.is_separator()? {
            self.consume()?;
        }
        Ok(())
    }

    /// Skips newlines that are purely layout, not statement separators —
    /// the ones that can appear freely inside `(…)` and `[…]`.
    fn skip_inert_newlines(&mut self) -> Result<(), EvalError> {
        while matches!(self.peek()?.kind, TokenKind::Punct('\n')) {
            self.consume()?;
        }
        Ok(())
    }

    /// `VALUE := ['] ATOM_OR_LIST`
    fn parse_value(&mut self) -> Result<Value, EvalError> {
        if matches!(self.peek()?.kind, TokenKind::Punct('\'')) {
            let quote_tok = self.consume()?;
            if !token_starts_value(&self.peek()?.kind) {
                let next = self.peek()?.clone();
                return Err(self.malformed(
                    quote_tok.line,
                    quote_tok.col,
                    format!("Unexpected {}, expected a value", Self::describe(&next)),
                ));
            }
            let inner = self.parse_value()?;
            return Ok(Value::quoted(inner));
        }
        self.parse_atom_or_list()
    }

    fn parse_atom_or_list(&mut self) -> Result<Value, EvalError> {
        let tok = self.peek()?.clone();
        match &tok.kind {
            TokenKind::Number => {
                self.consume()?;
                let n: i64 = tok.text.parse().map_err(|_| {
                    self.bad_literal(tok.line, tok.col, format!("invalid integer literal '{}'", tok.text))
                })?;
                Ok(Value::Int(n))
            }
            TokenKind::String => {
                self.consume()?;
                Ok(Value::string(tok.text))
            }
            TokenKind::Identifier => {
                self.consume()?;
                if tok.text == "nil" {
                    Ok(Value::Nil)
                } else {
                    Ok(Value::Symbol(intern(&tok.text)))
                }
            }
            TokenKind::Punct('(') => {
                self.consume()?;
                let inner = self.parse_paren_list()?;
                self.expect_end(End::Punct(')'))?;
                Ok(inner)
            }
            TokenKind::Punct('[') => {
                self.consume()?;
                let inner = self.parse_operator_list()?;
                self.expect_end(End::Punct(']'))?;
                Ok(inner)
            }
            TokenKind::Punct('{') => {
                self.consume()?;
                let inner = self.parse_open_list(End::Punct('}'))?;
                self.expect_end(End::Punct('}'))?;
                Ok(inner)
            }
            _ => Err(self.malformed(
                tok.line,
                tok.col,
                format!("Unexpected {}, expected a value", Self::describe(&tok)),
            )),
        }
    }

    /// `( … )`: whitespace-separated values; newlines are pure layout here
    /// and never terminate the list early.
    fn parse_paren_list(&mut self) -> Result<Value, EvalError> {
        let mut values = Vec::new();
        loop {
            self.skip_inert_newlines()?;
            if !token_starts_value(&self.peek()?.kind) {
                break;
            }
            values.push(self.parse_value()?);
        }
        Ok(list::from_values(values))
    }

    /// One statement inside an open list: values up to the next separator
    /// (`,` or newline) or the list's own terminator; a run of zero values
    /// is a legal empty statement (e.g. a comment-only line).
    fn parse_statement(&mut self) -> Result<Value, EvalError> {
        let mut values = Vec::new();
        while token_starts_value(&self.peek()?.kind) {
            values.push(self.parse_value()?);
        }
        Ok(list::from_values(values))
    }

    /// `{ … }`: a sequence of statements separated by `,` or newline.
    fn parse_open_list(&mut self, end: End) -> Result<Value, EvalError> {
        self.skip_separators()?;
        if self.at_end(end)? {
            return Ok(Value::Nil);
        }
        let mut statements = Vec::new();
        loop {
            statements.push(self.parse_statement()?);
            if self.at_end(end)? {
                break;
            }
            if !self.is_separator()? {
                let tok = self.peek()?.clone();
                return Err(self.malformed(
                    tok.line,
                    tok.col,
                    format!(
                        "Unexpected {}, expected one of: ',', newline, {}",
                        Self::describe(&tok),
                        end.describe()
                    ),
                ));
            }
            self.skip_separators()?;
            if self.at_end(end)? {
                break;
            }
        }
        Ok(list::from_values(statements))
    }

    /// `[ … ]`: values separated by a single repeated identifier operator,
    /// rewritten to prefix form `(op v1 v2 …)`. A lone operand with no
    /// operator is returned unwrapped (there is no operator to rewrite to).
    fn parse_operator_list(&mut self) -> Result<Value, EvalError> {
        self.skip_inert_newlines()?;
        if self.at_end(End::Punct(']'))? {
            return Ok(Value::Nil);
        }
        let first = self.parse_value()?;
        self.skip_inert_newlines()?;
        if self.at_end(End::Punct(']'))? {
            return Ok(first);
        }

        let op_tok = self.expect_identifier("an operator")?;
        let op = intern(&op_tok.text);
        let mut operands = vec![first];
        loop {
            self.skip_inert_newlines()?;
            operands.push(self.parse_value()?);
            self.skip_inert_newlines()?;
            if self.at_end(End::Punct(']'))? {
                break;
            }
            let next_op = self.expect_identifier("the list's operator")?;
            if next_op.text != op.as_str() {
                return Err(self.malformed(
                    next_op.line,
                    next_op.col,
                    format!("Non-matching operator {} in operator list", next_op.text),
                ));
            }
        }
        Ok(Value::cell(Value::Symbol(op), list::from_values(operands)))
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Token, EvalError> {
        let tok = self.peek()?.clone();
        if tok.kind == TokenKind::Identifier {
            self.consume()?;
            Ok(tok)
        } else {
            Err(self.malformed(
                tok.line,
                tok.col,
                format!("Unexpected {}, expected {what}", Self::describe(&tok)),
            ))
        }
    }

    /// `PROGRAM := OPEN_LIST(EOF)`: the whole source is one open list of
    /// top-level statements, each itself a closed list of forms.
    pub fn parse_program(&mut self) -> Result<Value, EvalError> {
        let program = self.parse_open_list(End::Eof)?;
        self.expect_end(End::Eof)?;
        Ok(program)
    }
}

/// Parses `source` (attributed to `filename` in error messages) as a
/// complete program: an open list of top-level statements.
pub fn parse_string(source: &str, filename: impl Into<String>) -> Result<Value, EvalError> {
    Parser::new(source, filename).parse_program()
}
