// ABOUTME: Hand-rolled tokenizer producing a stream of positioned tokens from source text

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{SyntaxError, SyntaxErrorKind};

/// Punctuation characters that always stand on their own as a token, per
/// `KH_TOKENIZER_SPECIAL_PUNCT` in the original tokenizer.
const SPECIAL_PUNCT: &[char] = &[',', '\'', '{', '}', '(', ')', '[', ']', '\n'];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// One of the characters in `SPECIAL_PUNCT`, including a synthesized
    /// `\n` for both literal newlines and `#`-comments.
    Punct(char),
    Identifier,
    Number,
    String,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub col: usize,
}

/// A value-position token is any token that can begin a value production:
/// everything except EOF and the structural punctuation used purely as
/// delimiters (`,` `{` `}` `(` `)` `[` `]`, and newline).
pub fn token_starts_value(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Punct('\'')
    )
}

pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
    filename: String,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, filename: impl Into<String>) -> Self {
        Tokenizer {
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
            filename: filename.into(),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn read_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, col: usize, kind: SyntaxErrorKind, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            kind,
            filename: self.filename.clone(),
            line,
            col,
            message: message.into(),
        }
    }

    fn is_identifier_char(c: char) -> bool {
        !c.is_whitespace() && !SPECIAL_PUNCT.contains(&c) && c != '#' && c != '"' && c != '`'
    }

    fn tokenize_number(&mut self, start_line: usize, start_col: usize, leading_minus: bool) -> Token {
        let mut text = String::new();
        if leading_minus {
            text.push('-');
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                text.push(c);
                self.read_char();
            } else {
                break;
            }
        }
        // Consume and discard a trailing alphanumeric suffix, truncating the
        // token's text at the digit boundary (matches `_tokenize_number`).
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' {
                self.read_char();
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Number,
            text,
            line: start_line,
            col: start_col,
        }
    }

    fn tokenize_identifier(&mut self, start_line: usize, start_col: usize, first: char) -> Token {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.peek_char() {
            if Self::is_identifier_char(c) {
                text.push(c);
                self.read_char();
            } else {
                break;
            }
        }
        Token {
            kind: TokenKind::Identifier,
            text,
            line: start_line,
            col: start_col,
        }
    }

    fn tokenize_string(
        &mut self,
        start_line: usize,
        start_col: usize,
    ) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        loop {
            match self.read_char() {
                None => {
                    return Err(self.error(
                        start_line,
                        start_col,
                        SyntaxErrorKind::MissingDelimiter,
                        "unterminated string literal",
                    ))
                }
                Some('"') => break,
                Some('\\') => {
                    // A backslash-newline (optionally preceded by \r) continuation
                    // collapses to a single '\n' and swallows leading whitespace
                    // on the next line, matching `_tokenize_string`.
                    let mut next = self.read_char();
                    if next == Some('\r') {
                        next = self.read_char();
                    }
                    match next {
                        Some('\n') => {
                            text.push('\n');
                            while matches!(self.peek_char(), Some(' ') | Some('\t')) {
                                self.read_char();
                            }
                        }
                        Some('n') => text.push('\n'),
                        Some('r') => text.push('\r'),
                        Some('t') => text.push('\t'),
                        Some('"') => text.push('"'),
                        Some('\'') => text.push('\''),
                        Some('\\') => text.push('\\'),
                        Some(other) => text.push(other),
                        None => {
                            return Err(self.error(
                                start_line,
                                start_col,
                                SyntaxErrorKind::MissingDelimiter,
                                "unterminated string literal",
                            ))
                        }
                    }
                }
                Some(c) => text.push(c),
            }
        }
        Ok(Token {
            kind: TokenKind::String,
            text,
            line: start_line,
            col: start_col,
        })
    }

    /// Raw strings: no escape processing, and a bare `\r` is dropped rather
    /// than copied, matching `_tokenize_backquote_string`.
    fn tokenize_backquote_string(
        &mut self,
        start_line: usize,
        start_col: usize,
    ) -> Result<Token, SyntaxError> {
        let mut text = String::new();
        loop {
            match self.read_char() {
                None => {
                    return Err(self.error(
                        start_line,
                        start_col,
                        SyntaxErrorKind::MissingDelimiter,
                        "unterminated backquote string",
                    ))
                }
                Some('`') => break,
                Some('\r') => {}
                Some(c) => text.push(c),
            }
        }
        Ok(Token {
            kind: TokenKind::String,
            text,
            line: start_line,
            col: start_col,
        })
    }

    /// Reads and returns the next token, or `Eof` once input is exhausted.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        loop {
            let (line, col) = (self.line, self.col);
            let c = match self.peek_char() {
                None => {
                    return Ok(Token {
                        kind: TokenKind::Eof,
                        text: String::new(),
                        line,
                        col,
                    })
                }
                Some(c) => c,
            };

            if c == ' ' || c == '\t' || c == '\r' {
                self.read_char();
                continue;
            }

            if c == '#' {
                // A comment runs to (but not including) the next newline or EOF,
                // and still yields a '\n' token so it terminates a statement.
                while let Some(c) = self.peek_char() {
                    if c == '\n' {
                        break;
                    }
                    self.read_char();
                }
                if self.peek_char().is_none() {
                    return Ok(Token {
                        kind: TokenKind::Eof,
                        text: String::new(),
                        line: self.line,
                        col: self.col,
                    });
                }
                self.read_char();
                return Ok(Token {
                    kind: TokenKind::Punct('\n'),
                    text: "\n".to_string(),
                    line,
                    col,
                });
            }

            if SPECIAL_PUNCT.contains(&c) {
                self.read_char();
                return Ok(Token {
                    kind: TokenKind::Punct(c),
                    text: c.to_string(),
                    line,
                    col,
                });
            }

            if c.is_ascii_digit() {
                self.read_char();
                return Ok(self.tokenize_number(line, col, false));
            }

            if c == '-' {
                self.read_char();
                if matches!(self.peek_char(), Some(d) if d.is_ascii_digit()) {
                    return Ok(self.tokenize_number(line, col, true));
                }
                return Ok(self.tokenize_identifier(line, col, '-'));
            }

            if c == '"' {
                self.read_char();
                return self.tokenize_string(line, col);
            }

            if c == '`' {
                self.read_char();
                return self.tokenize_backquote_string(line, col);
            }

            if Self::is_identifier_char(c) {
                self.read_char();
                return Ok(self.tokenize_identifier(line, col, c));
            }

            self.read_char();
            return Err(self.error(
                line,
                col,
                SyntaxErrorKind::UnexpectedChar,
                format!("unexpected character '{}'", c),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<TokenKind> {
        let mut tok = Tokenizer::new(source, "<test>");
        let mut out = Vec::new();
        loop {
            let t = tok.next_token().expect("tokenizes cleanly");
            let done = t.kind == TokenKind::Eof;
            out.push(t.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn empty_source_is_eof() {
        assert_eq!(tokens(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn comment_yields_newline_then_eof() {
        assert_eq!(
            tokens("# a comment"),
            vec![TokenKind::Punct('\n'), TokenKind::Eof]
        );
    }

    #[test]
    fn identifier_and_number() {
        assert_eq!(
            tokens("foo 42"),
            vec![TokenKind::Identifier, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn negative_number_vs_minus_identifier() {
        let mut tok = Tokenizer::new("-5 -foo", "<test>");
        let first = tok.next_token().unwrap();
        assert_eq!(first.kind, TokenKind::Number);
        assert_eq!(first.text, "-5");
        tok.next_token().unwrap(); // skip nothing, just advance past space implicitly
    }

    #[test]
    fn number_suffix_is_discarded_from_text() {
        let mut tok = Tokenizer::new("123abc", "<test>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Number);
        assert_eq!(t.text, "123");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn string_escapes() {
        let mut tok = Tokenizer::new(r#""a\nb\tc""#, "<test>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::String);
        assert_eq!(t.text, "a\nb\tc");
    }

    #[test]
    fn unterminated_string_is_missing_delimiter() {
        let mut tok = Tokenizer::new("\"abc", "<test>");
        let err = tok.next_token().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MissingDelimiter);
    }

    #[test]
    fn backquote_string_is_raw() {
        let mut tok = Tokenizer::new("`a\\nb`", "<test>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.text, "a\\nb");
    }

    #[test]
    fn special_punct_are_individual_tokens() {
        assert_eq!(
            tokens("({[,]})"),
            vec![
                TokenKind::Punct('('),
                TokenKind::Punct('{'),
                TokenKind::Punct('['),
                TokenKind::Punct(','),
                TokenKind::Punct(']'),
                TokenKind::Punct('}'),
                TokenKind::Punct(')'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unexpected_char_errors() {
        // form feed is whitespace but not one of the skipped whitespace chars,
        // so it falls through to the catch-all error branch.
        let mut tok = Tokenizer::new("\u{0c}", "<test>");
        let err = tok.next_token().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedChar);
    }

    #[test]
    fn at_sign_is_a_valid_identifier() {
        let mut tok = Tokenizer::new("@", "<test>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Identifier);
        assert_eq!(t.text, "@");
    }
}
