//! Pull-based token stream over a [`Read`] source.

use super::reader::BufferedTokenReader;
use super::tokenizer::{Scan, Token, Tokenizer};
use super::traits::{ParseError, TokenKind};
use serde_json::{Map, Number, Value};
use std::io::Read;

/// Tokens pulled one at a time from a byte source.
///
/// Only the current token (and whatever raw bytes follow it in the buffer)
/// is held in memory.
pub struct TokenStream<R> {
    reader: BufferedTokenReader<R>,
    tokenizer: Tokenizer,
    /// Index of the next unscanned byte in the reader's buffer
    pos: usize,
    peeked: Option<Token>,
    finished: bool,
}

impl<R: Read> TokenStream<R> {
    /// Wrap an already configured reader.
    pub fn new(reader: BufferedTokenReader<R>) -> Self {
        Self {
            reader,
            tokenizer: Tokenizer::new(),
            pos: 0,
            peeked: None,
            finished: false,
        }
    }

    /// Absolute offset of the next unscanned byte.
    pub fn offset(&self) -> u64 {
        self.reader.offset() + self.pos as u64
    }

    /// Current buffer capacity, exposed for diagnostics.
    pub fn buffer_capacity(&self) -> usize {
        self.reader.capacity()
    }

    /// Pull the next token, or `None` once the document is complete.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        if self.finished {
            return Ok(None);
        }

        loop {
            let data = &self.reader.data()[self.pos..];
            let base = self.reader.offset() + self.pos as u64;
            let is_final = self.reader.is_eof();
            match self.tokenizer.scan(data, is_final, base)? {
                Scan::Token(token, consumed) => {
                    self.pos += consumed;
                    return Ok(Some(token));
                }
                Scan::EndOfDocument(consumed) => {
                    self.pos += consumed;
                    self.finished = true;
                    return Ok(None);
                }
                Scan::NeedMoreData => {
                    self.reader.fill(self.pos)?;
                    self.pos = 0;
                }
            }
        }
    }

    /// Pull the next token, treating end of document as an error.
    pub fn require_token(&mut self) -> Result<Token, ParseError> {
        let offset = self.offset();
        self.next_token()?
            .ok_or(ParseError::UnexpectedEndOfStream { offset })
    }

    /// Pull the next token and check its kind.
    pub fn expect_token(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.require_token()?;
        if token.kind != kind {
            return Err(ParseError::unexpected(token.offset, kind.to_string(), token.kind));
        }
        Ok(token)
    }

    /// Look at the kind of the next token without consuming it.
    pub fn peek_kind(&mut self) -> Result<Option<TokenKind>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.next_token()?;
        }
        Ok(self.peeked.as_ref().map(|t| t.kind))
    }

    /// Materialize the value that starts with `first`.
    pub fn read_value(&mut self, first: Token) -> Result<Value, ParseError> {
        match first.kind {
            TokenKind::StartObject => {
                let mut map = Map::new();
                loop {
                    let token = self.require_token()?;
                    match token.kind {
                        TokenKind::EndObject => return Ok(Value::Object(map)),
                        TokenKind::PropertyName => {
                            let name = token.text.unwrap_or_default();
                            let first = self.require_token()?;
                            let value = self.read_value(first)?;
                            map.insert(name, value);
                        }
                        other => {
                            return Err(ParseError::unexpected(
                                token.offset,
                                "PropertyName or EndObject",
                                other,
                            ));
                        }
                    }
                }
            }
            TokenKind::StartArray => {
                let mut items = Vec::new();
                loop {
                    let token = self.require_token()?;
                    if token.kind == TokenKind::EndArray {
                        return Ok(Value::Array(items));
                    }
                    items.push(self.read_value(token)?);
                }
            }
            TokenKind::String => Ok(Value::String(first.text.unwrap_or_default())),
            TokenKind::Number => number_value(first),
            TokenKind::True => Ok(Value::Bool(true)),
            TokenKind::False => Ok(Value::Bool(false)),
            TokenKind::Null => Ok(Value::Null),
            other => Err(ParseError::unexpected(first.offset, "a value", other)),
        }
    }

    /// Skip the value that starts with `first` without materializing it.
    pub fn skip_value(&mut self, first: Token) -> Result<(), ParseError> {
        let mut depth = match first.kind {
            TokenKind::StartObject | TokenKind::StartArray => 1usize,
            kind if kind.starts_value() => return Ok(()),
            other => return Err(ParseError::unexpected(first.offset, "a value", other)),
        };
        while depth > 0 {
            match self.require_token()?.kind {
                TokenKind::StartObject | TokenKind::StartArray => depth += 1,
                TokenKind::EndObject | TokenKind::EndArray => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}

fn number_value(token: Token) -> Result<Value, ParseError> {
    let text = token.text.unwrap_or_default();
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::Number(i.into()));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Ok(Value::Number(u.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ParseError::InvalidJson {
            offset: token.offset,
            message: format!("number '{text}' is out of range"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn stream(input: &str, buffer: usize) -> TokenStream<Cursor<Vec<u8>>> {
        TokenStream::new(BufferedTokenReader::with_capacity(
            Cursor::new(input.as_bytes().to_vec()),
            buffer,
        ))
    }

    #[test]
    fn test_read_value_with_tiny_buffer() {
        let input = r#"{"name": "a-long-package-name", "n": [1, -2, 3.5], "ok": true, "x": null}"#;
        let mut s = stream(input, 4);
        let first = s.require_token().unwrap();
        let value = s.read_value(first).unwrap();
        assert_eq!(
            value,
            json!({"name": "a-long-package-name", "n": [1, -2, 3.5], "ok": true, "x": null})
        );
        assert!(s.next_token().unwrap().is_none());
        assert!(s.buffer_capacity() >= 32);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut s = stream("[1]", 16);
        assert_eq!(s.peek_kind().unwrap(), Some(TokenKind::StartArray));
        assert_eq!(s.peek_kind().unwrap(), Some(TokenKind::StartArray));
        assert_eq!(s.require_token().unwrap().kind, TokenKind::StartArray);
        assert_eq!(s.require_token().unwrap().kind, TokenKind::Number);
    }

    #[test]
    fn test_skip_value() {
        let mut s = stream(r#"[{"a": [1, {"b": 2}]}, "next"]"#, 8);
        s.expect_token(TokenKind::StartArray).unwrap();
        let first = s.require_token().unwrap();
        s.skip_value(first).unwrap();
        let token = s.require_token().unwrap();
        assert_eq!(token.text.as_deref(), Some("next"));
    }

    #[test]
    fn test_expect_token_mismatch() {
        let mut s = stream("[1]", 16);
        let err = s.expect_token(TokenKind::StartObject).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                offset: 0,
                actual: TokenKind::StartArray,
                ..
            }
        ));
    }

    #[test]
    fn test_large_unsigned_number() {
        let mut s = stream("[18446744073709551615]", 64);
        let first = s.require_token().unwrap();
        let value = s.read_value(first).unwrap();
        assert_eq!(value, json!([18_446_744_073_709_551_615u64]));
    }

    #[test]
    fn test_truncated_document() {
        let mut s = stream(r#"{"a": [1, 2"#, 4);
        let first = s.require_token().unwrap();
        let err = s.read_value(first).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEndOfStream { .. }));
    }
}
