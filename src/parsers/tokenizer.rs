//! Resumable JSON tokenizer.
//!
//! [`Tokenizer::scan`] looks at the bytes currently buffered and either
//! produces one complete token or reports that it needs more input. State
//! (the container stack and what may come next) is only committed when a
//! token completes, so a `NeedMoreData` result can be retried from the same
//! position after the buffer has been refilled.

use super::traits::{ParseError, TokenKind};

/// A single JSON token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Decoded text for property names and strings, raw text for numbers.
    pub text: Option<String>,
    /// Absolute byte offset of the token's first byte.
    pub offset: u64,
}

impl Token {
    fn new(kind: TokenKind, offset: u64) -> Self {
        Self {
            kind,
            text: None,
            offset,
        }
    }

    fn with_text(kind: TokenKind, text: String, offset: u64) -> Self {
        Self {
            kind,
            text: Some(text),
            offset,
        }
    }
}

/// Outcome of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// A complete token and the number of bytes it consumed
    Token(Token, usize),
    /// The buffered bytes end inside a token
    NeedMoreData,
    /// The root value is closed; the count covers trailing whitespace
    EndOfDocument(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    RootValue,
    Value,
    ValueOrEnd,
    PropertyOrEnd,
    Property,
    Colon,
    CommaOrEnd,
    Done,
}

enum Partial<T> {
    Complete(T),
    Incomplete,
}

/// Incremental tokenizer state.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stack: Vec<Container>,
    expect: Expect,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stack: Vec::new(),
            expect: Expect::RootValue,
        }
    }

    /// Current container nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether the root value has been fully read.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.expect == Expect::Done
    }

    /// Scan the next token from `bytes`.
    ///
    /// `is_final` tells the tokenizer no further bytes will follow, which
    /// turns an incomplete token into an error. `base` is the absolute
    /// offset of `bytes[0]` and is only used for positions in tokens and
    /// errors.
    pub fn scan(&mut self, bytes: &[u8], is_final: bool, base: u64) -> Result<Scan, ParseError> {
        let mut pos = 0;
        let mut expect = self.expect;

        loop {
            pos = skip_whitespace(bytes, pos);
            let at = base + pos as u64;
            if pos >= bytes.len() {
                if !is_final {
                    return Ok(Scan::NeedMoreData);
                }
                if expect == Expect::Done {
                    return Ok(Scan::EndOfDocument(pos));
                }
                return Err(ParseError::UnexpectedEndOfStream { offset: at });
            }

            let byte = bytes[pos];
            match expect {
                Expect::Done => {
                    return Err(invalid(at, "unexpected data after the end of the document"));
                }
                Expect::Colon => {
                    if byte != b':' {
                        return Err(invalid(at, format!("expected ':' but found {}", describe(byte))));
                    }
                    pos += 1;
                    expect = Expect::Value;
                }
                Expect::CommaOrEnd => match (byte, self.stack.last()) {
                    (b',', Some(Container::Object)) => {
                        pos += 1;
                        expect = Expect::Property;
                    }
                    (b',', Some(Container::Array)) => {
                        pos += 1;
                        expect = Expect::Value;
                    }
                    (b'}', Some(Container::Object)) | (b']', Some(Container::Array)) => {
                        return Ok(self.close(pos, at));
                    }
                    _ => {
                        return Err(invalid(
                            at,
                            format!("expected ',' or a closing bracket but found {}", describe(byte)),
                        ));
                    }
                },
                Expect::PropertyOrEnd | Expect::Property => {
                    if byte == b'}' && expect == Expect::PropertyOrEnd {
                        return Ok(self.close(pos, at));
                    }
                    if byte != b'"' {
                        return Err(invalid(
                            at,
                            format!("expected a property name but found {}", describe(byte)),
                        ));
                    }
                    return match scan_string(bytes, pos + 1, base)? {
                        Partial::Complete((name, end)) => {
                            self.expect = Expect::Colon;
                            Ok(Scan::Token(
                                Token::with_text(TokenKind::PropertyName, name, at),
                                end,
                            ))
                        }
                        Partial::Incomplete => incomplete(is_final, base + bytes.len() as u64),
                    };
                }
                Expect::ValueOrEnd if byte == b']' => {
                    return Ok(self.close(pos, at));
                }
                Expect::RootValue | Expect::Value | Expect::ValueOrEnd => {
                    return self.scan_value(bytes, pos, is_final, base);
                }
            }
        }
    }

    fn close(&mut self, pos: usize, at: u64) -> Scan {
        let kind = match self.stack.pop() {
            Some(Container::Object) => TokenKind::EndObject,
            _ => TokenKind::EndArray,
        };
        self.expect = self.after_value();
        Scan::Token(Token::new(kind, at), pos + 1)
    }

    fn after_value(&self) -> Expect {
        if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        }
    }

    fn scan_value(
        &mut self,
        bytes: &[u8],
        pos: usize,
        is_final: bool,
        base: u64,
    ) -> Result<Scan, ParseError> {
        let at = base + pos as u64;
        let end_offset = base + bytes.len() as u64;
        match bytes[pos] {
            b'{' => {
                self.stack.push(Container::Object);
                self.expect = Expect::PropertyOrEnd;
                Ok(Scan::Token(Token::new(TokenKind::StartObject, at), pos + 1))
            }
            b'[' => {
                self.stack.push(Container::Array);
                self.expect = Expect::ValueOrEnd;
                Ok(Scan::Token(Token::new(TokenKind::StartArray, at), pos + 1))
            }
            b'"' => match scan_string(bytes, pos + 1, base)? {
                Partial::Complete((text, end)) => {
                    self.expect = self.after_value();
                    Ok(Scan::Token(Token::with_text(TokenKind::String, text, at), end))
                }
                Partial::Incomplete => incomplete(is_final, end_offset),
            },
            b't' => self.scan_literal(bytes, pos, b"true", TokenKind::True, is_final, base),
            b'f' => self.scan_literal(bytes, pos, b"false", TokenKind::False, is_final, base),
            b'n' => self.scan_literal(bytes, pos, b"null", TokenKind::Null, is_final, base),
            b'-' | b'0'..=b'9' => {
                let end = bytes[pos..]
                    .iter()
                    .position(|b| !matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
                    .map_or(bytes.len(), |n| pos + n);
                if end == bytes.len() && !is_final {
                    return Ok(Scan::NeedMoreData);
                }
                let raw = &bytes[pos..end];
                if !is_valid_number(raw) {
                    return Err(invalid(
                        at,
                        format!("malformed number '{}'", String::from_utf8_lossy(raw)),
                    ));
                }
                // Number bytes are ASCII by construction.
                let text = String::from_utf8_lossy(raw).into_owned();
                self.expect = self.after_value();
                Ok(Scan::Token(Token::with_text(TokenKind::Number, text, at), end))
            }
            other => Err(invalid(at, format!("expected a value but found {}", describe(other)))),
        }
    }

    fn scan_literal(
        &mut self,
        bytes: &[u8],
        pos: usize,
        literal: &[u8],
        kind: TokenKind,
        is_final: bool,
        base: u64,
    ) -> Result<Scan, ParseError> {
        let available = &bytes[pos..];
        let at = base + pos as u64;
        if available.len() < literal.len() {
            if literal.starts_with(available) {
                return incomplete(is_final, base + bytes.len() as u64);
            }
        } else if available.starts_with(literal) {
            self.expect = self.after_value();
            return Ok(Scan::Token(Token::new(kind, at), pos + literal.len()));
        }
        Err(invalid(at, "invalid literal"))
    }
}

fn incomplete(is_final: bool, offset: u64) -> Result<Scan, ParseError> {
    if is_final {
        Err(ParseError::UnexpectedEndOfStream { offset })
    } else {
        Ok(Scan::NeedMoreData)
    }
}

fn invalid(offset: u64, message: impl Into<String>) -> ParseError {
    ParseError::InvalidJson {
        offset,
        message: message.into(),
    }
}

fn describe(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("byte 0x{byte:02X}")
    }
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

/// Scan a string body starting just after its opening quote.
///
/// On success returns the decoded text and the index just past the closing
/// quote.
fn scan_string(bytes: &[u8], start: usize, base: u64) -> Result<Partial<(String, usize)>, ParseError> {
    let mut out = Vec::new();
    let mut i = start;

    loop {
        // Copy the run up to the next quote, escape or control byte in one go.
        let run = bytes[i..]
            .iter()
            .position(|&b| b == b'"' || b == b'\\' || b < 0x20)
            .unwrap_or(bytes.len() - i);
        out.extend_from_slice(&bytes[i..i + run]);
        i += run;

        if i >= bytes.len() {
            return Ok(Partial::Incomplete);
        }

        let at = base + i as u64;
        match bytes[i] {
            b'"' => {
                let text = String::from_utf8(out)
                    .map_err(|_| invalid(base + start as u64, "string is not valid UTF-8"))?;
                return Ok(Partial::Complete((text, i + 1)));
            }
            b'\\' => {
                let Some(&escape) = bytes.get(i + 1) else {
                    return Ok(Partial::Incomplete);
                };
                let simple = match escape {
                    b'"' => Some(b'"'),
                    b'\\' => Some(b'\\'),
                    b'/' => Some(b'/'),
                    b'b' => Some(0x08),
                    b'f' => Some(0x0C),
                    b'n' => Some(b'\n'),
                    b'r' => Some(b'\r'),
                    b't' => Some(b'\t'),
                    b'u' => None,
                    other => {
                        return Err(invalid(at, format!("invalid escape '\\{}'", other as char)));
                    }
                };
                if let Some(decoded) = simple {
                    out.push(decoded);
                    i += 2;
                    continue;
                }

                match scan_unicode_escape(bytes, i, at)? {
                    Partial::Complete((ch, len)) => {
                        let mut utf8 = [0u8; 4];
                        out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                        i += len;
                    }
                    Partial::Incomplete => return Ok(Partial::Incomplete),
                }
            }
            _ => return Err(invalid(at, "unescaped control character in string")),
        }
    }
}

/// Decode `\uXXXX` (and a following low surrogate when needed) at `i`.
fn scan_unicode_escape(bytes: &[u8], i: usize, at: u64) -> Result<Partial<(char, usize)>, ParseError> {
    let Some(high) = read_hex4(bytes, i + 2, at)? else {
        return Ok(Partial::Incomplete);
    };

    if !(0xD800..=0xDFFF).contains(&high) {
        let ch = char::from_u32(high).ok_or_else(|| invalid(at, "invalid unicode escape"))?;
        return Ok(Partial::Complete((ch, 6)));
    }
    if high >= 0xDC00 {
        return Err(invalid(at, "unpaired low surrogate in unicode escape"));
    }

    match (bytes.get(i + 6), bytes.get(i + 7)) {
        (Some(b'\\'), Some(b'u')) => {}
        (None, _) | (Some(b'\\'), None) => return Ok(Partial::Incomplete),
        _ => return Err(invalid(at, "unpaired high surrogate in unicode escape")),
    }
    let Some(low) = read_hex4(bytes, i + 8, at)? else {
        return Ok(Partial::Incomplete);
    };
    if !(0xDC00..=0xDFFF).contains(&low) {
        return Err(invalid(at, "unpaired high surrogate in unicode escape"));
    }
    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
    let ch = char::from_u32(code).ok_or_else(|| invalid(at, "invalid surrogate pair"))?;
    Ok(Partial::Complete((ch, 12)))
}

fn read_hex4(bytes: &[u8], start: usize, at: u64) -> Result<Option<u32>, ParseError> {
    let Some(digits) = bytes.get(start..start + 4) else {
        if bytes[start.min(bytes.len())..].iter().all(u8::is_ascii_hexdigit) {
            return Ok(None);
        }
        return Err(invalid(at, "invalid hex digits in unicode escape"));
    };
    let mut value = 0u32;
    for &d in digits {
        let nibble = (d as char)
            .to_digit(16)
            .ok_or_else(|| invalid(at, "invalid hex digits in unicode escape"))?;
        value = (value << 4) | nibble;
    }
    Ok(Some(value))
}

/// Validate `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
fn is_valid_number(raw: &[u8]) -> bool {
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < raw.len() && raw[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if raw.get(i) == Some(&b'-') {
        i += 1;
    }
    match raw.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            digits(&mut i);
        }
        _ => return false,
    }
    if raw.get(i) == Some(&b'.') {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
    }
    if matches!(raw.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(raw.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == raw.len()
}
