//! Streaming parser for very large SBOM documents.
//!
//! [`LargeDocumentParser`] walks a single top-level JSON object and yields
//! one [`ParserResult`] per property. Properties with a registered
//! [`PropertyHandler`] are decoded into typed records; anything else is kept
//! as an untyped [`serde_json::Value`] so that unknown fields survive a
//! round trip.
//!
//! Array-valued properties registered with [`PropertyHandler::Array`] are
//! not materialized. The parser returns a result with `is_array` set and the
//! caller then drains [`LargeDocumentParser::array_items`], which decodes one
//! element at a time.
//!
//! # Usage
//!
//! ```no_run
//! use sbom_parity::parsers::streaming::{LargeDocumentParser, PropertyHandler, decode_record};
//! use sbom_parity::model::spdx22::Spdx22File;
//! use std::fs::File;
//!
//! let file = File::open("large-sbom.spdx.json").unwrap();
//! let mut parser = LargeDocumentParser::new(file)
//!     .with_handler("files", PropertyHandler::Array(decode_record::<Spdx22File>));
//!
//! while let Some(property) = parser.next().unwrap() {
//!     if property.is_array {
//!         for file in parser.array_items().unwrap() {
//!             println!("{}", file.unwrap().file_name);
//!         }
//!     }
//! }
//! ```

use super::reader::{BufferedTokenReader, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BUFFER_SIZE};
use super::stream::TokenStream;
use super::tokenizer::Token;
use super::traits::{ParseError, TokenKind};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Read;

/// Decoder turning an untyped value into a typed record.
pub type RecordDecoder<V> = fn(Value) -> Result<V, ParseError>;

/// How a registered property is decoded.
pub enum PropertyHandler<V> {
    String,
    Integer,
    /// Nested object decoded into a record
    Object(RecordDecoder<V>),
    /// Array of records, enumerated lazily
    Array(RecordDecoder<V>),
}

impl<V> Clone for PropertyHandler<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for PropertyHandler<V> {}

impl<V> std::fmt::Debug for PropertyHandler<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Object(_) => "Object",
            Self::Array(_) => "Array",
        };
        f.write_str(name)
    }
}

/// Decoded value of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue<V> {
    String(String),
    Integer(i64),
    Record(V),
    Untyped(Value),
}

/// One property of the root object.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserResult<V> {
    pub name: String,
    /// Decoded value; `None` for lazily enumerated arrays and explicit nulls
    pub value: Option<PropertyValue<V>>,
    /// Whether a handler was registered for this property
    pub explicit_field: bool,
    /// Whether the caller must now drain [`LargeDocumentParser::array_items`]
    pub is_array: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    NotStarted,
    InObject,
    EnumeratingArray,
    Done,
}

/// Pull parser over the root object of a large JSON document.
pub struct LargeDocumentParser<R, V> {
    stream: TokenStream<R>,
    handlers: HashMap<String, PropertyHandler<V>>,
    state: ParserState,
    array: Option<ActiveArray<V>>,
}

struct ActiveArray<V> {
    name: String,
    decoder: RecordDecoder<V>,
    count: usize,
}

impl<R: Read, V> LargeDocumentParser<R, V> {
    /// Create a parser with default buffer sizing.
    pub fn new(source: R) -> Self {
        Self::with_buffer(source, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BUFFER_SIZE)
    }

    /// Create a parser with an explicit initial and maximum buffer size.
    pub fn with_buffer(source: R, initial_size: usize, max_size: usize) -> Self {
        let reader = BufferedTokenReader::with_capacity(source, initial_size).with_max_size(max_size);
        Self {
            stream: TokenStream::new(reader),
            handlers: HashMap::new(),
            state: ParserState::NotStarted,
            array: None,
        }
    }

    /// Register a handler for a root property.
    #[must_use]
    pub fn with_handler(mut self, name: &str, handler: PropertyHandler<V>) -> Self {
        self.handlers.insert(name.to_string(), handler);
        self
    }

    /// Absolute byte offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.stream.offset()
    }

    /// Whether the root object has been closed.
    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    fn transition(&mut self, to: ParserState) {
        tracing::debug!(from = ?self.state, to = ?to, offset = self.stream.offset(), "parser state");
        self.state = to;
    }

    /// Advance to the next root property.
    ///
    /// Returns `Ok(None)` once the root object is closed. Calling this while
    /// an array returned by a previous call has not been fully drained is a
    /// [`ParseError::ContractViolation`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<ParserResult<V>>, ParseError> {
        match self.state {
            ParserState::Done => return Ok(None),
            ParserState::EnumeratingArray => {
                let name = self.array.as_ref().map_or("", |a| a.name.as_str());
                return Err(ParseError::ContractViolation(format!(
                    "array '{name}' must be fully enumerated before reading the next property"
                )));
            }
            ParserState::NotStarted => {
                let first = self.stream.require_token()?;
                if first.kind != TokenKind::StartObject {
                    return Err(ParseError::InvalidRoot {
                        offset: first.offset,
                        actual: first.kind,
                    });
                }
                self.transition(ParserState::InObject);
            }
            ParserState::InObject => {}
        }

        let token = self.stream.require_token()?;
        match token.kind {
            TokenKind::EndObject => {
                // Anything but whitespace after the root is rejected here.
                if let Some(extra) = self.stream.next_token()? {
                    return Err(ParseError::unexpected(extra.offset, "end of document", extra.kind));
                }
                self.transition(ParserState::Done);
                Ok(None)
            }
            TokenKind::PropertyName => {
                let name = token.text.unwrap_or_default();
                self.read_property(name).map(Some)
            }
            other => Err(ParseError::unexpected(token.offset, "PropertyName", other)),
        }
    }

    fn read_property(&mut self, name: String) -> Result<ParserResult<V>, ParseError> {
        let first = self.stream.require_token()?;
        let Some(handler) = self.handlers.get(&name).copied() else {
            let value = self.stream.read_value(first)?;
            return Ok(ParserResult {
                name,
                value: Some(PropertyValue::Untyped(value)),
                explicit_field: false,
                is_array: false,
            });
        };

        let mut result = ParserResult {
            name,
            value: None,
            explicit_field: true,
            is_array: false,
        };
        if first.kind == TokenKind::Null {
            return Ok(result);
        }

        match handler {
            PropertyHandler::String => {
                let token = expect_kind(first, TokenKind::String)?;
                result.value = token.text.map(PropertyValue::String);
            }
            PropertyHandler::Integer => {
                let token = expect_kind(first, TokenKind::Number)?;
                let text = token.text.unwrap_or_default();
                let n = text
                    .parse::<i64>()
                    .map_err(|_| ParseError::invalid_value(result.name.clone(), text))?;
                result.value = Some(PropertyValue::Integer(n));
            }
            PropertyHandler::Object(decoder) => {
                let token = expect_kind(first, TokenKind::StartObject)?;
                let value = self.stream.read_value(token)?;
                result.value = Some(PropertyValue::Record(decoder(value)?));
            }
            PropertyHandler::Array(decoder) => {
                expect_kind(first, TokenKind::StartArray)?;
                self.array = Some(ActiveArray {
                    name: result.name.clone(),
                    decoder,
                    count: 0,
                });
                result.is_array = true;
                self.transition(ParserState::EnumeratingArray);
            }
        }
        Ok(result)
    }

    /// Enumerate the elements of the array returned by the last [`next`](Self::next).
    pub fn array_items(&mut self) -> Result<ArrayEnumerator<'_, R, V>, ParseError> {
        if self.state != ParserState::EnumeratingArray {
            return Err(ParseError::ContractViolation(
                "no array property is being enumerated".to_string(),
            ));
        }
        Ok(ArrayEnumerator {
            parser: self,
            failed: false,
        })
    }

    /// Walk the whole document, handing every property to `on_property`.
    ///
    /// Array properties come with their enumerator. Elements the callback
    /// leaves unread are still decoded (and validated) before moving on.
    pub fn for_each_property<F>(&mut self, mut on_property: F) -> Result<(), ParseError>
    where
        F: FnMut(ParserResult<V>, Option<&mut ArrayEnumerator<'_, R, V>>) -> Result<(), ParseError>,
    {
        while let Some(result) = self.next()? {
            if result.is_array {
                let mut items = self.array_items()?;
                on_property(result, Some(&mut items))?;
                // Whatever the callback left unread is decoded and dropped.
                for item in items.by_ref() {
                    item?;
                }
            } else {
                on_property(result, None)?;
            }
        }
        Ok(())
    }
}

fn expect_kind(token: Token, kind: TokenKind) -> Result<Token, ParseError> {
    if token.kind == kind {
        Ok(token)
    } else {
        Err(ParseError::unexpected(token.offset, kind.to_string(), token.kind))
    }
}

/// Single-pass iterator over the elements of one array property.
///
/// Yields `None` after the closing bracket and after the first error.
pub struct ArrayEnumerator<'a, R, V> {
    parser: &'a mut LargeDocumentParser<R, V>,
    failed: bool,
}

impl<R: Read, V> ArrayEnumerator<'_, R, V> {
    /// Number of elements decoded so far.
    pub fn count_so_far(&self) -> usize {
        self.parser.array.as_ref().map_or(0, |a| a.count)
    }

    fn advance(&mut self) -> Result<Option<V>, ParseError> {
        let token = self.parser.stream.require_token()?;
        if token.kind == TokenKind::EndArray {
            if let Some(array) = self.parser.array.take() {
                tracing::debug!(property = %array.name, count = array.count, "array enumerated");
            }
            self.parser.transition(ParserState::InObject);
            return Ok(None);
        }
        let value = self.parser.stream.read_value(token)?;
        let Some(array) = self.parser.array.as_mut() else {
            return Err(ParseError::ContractViolation(
                "array enumerator used without an active array".to_string(),
            ));
        };
        array.count += 1;
        (array.decoder)(value).map(Some)
    }
}

impl<R: Read, V> Iterator for ArrayEnumerator<'_, R, V> {
    type Item = Result<V, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.parser.state != ParserState::EnumeratingArray {
            return None;
        }
        match self.advance() {
            Ok(item) => item.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

// ============================================================================
// Typed record decoding
// ============================================================================

/// A record type with fields that must be present before decoding.
pub trait SpdxRecord: DeserializeOwned {
    /// Entity name used in error messages
    const ENTITY: &'static str;
    /// Fields that must be present and non-null
    const REQUIRED_FIELDS: &'static [&'static str];
}

/// Decode a value into `T`, checking required fields first.
pub fn decode_record<T: SpdxRecord>(value: Value) -> Result<T, ParseError> {
    let Value::Object(map) = &value else {
        return Err(ParseError::invalid_value(
            T::ENTITY,
            format!("expected an object, found {}", json_type_name(&value)),
        ));
    };
    if let Some(missing) = T::REQUIRED_FIELDS
        .iter()
        .find(|field| map.get(**field).is_none_or(Value::is_null))
    {
        return Err(ParseError::missing_field(*missing, T::ENTITY));
    }
    serde_json::from_value(value).map_err(|e| ParseError::Deserialize {
        entity: T::ENTITY.to_string(),
        message: e.to_string(),
    })
}

/// Short name of a JSON value's type.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::io::Cursor;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
        #[serde(default)]
        size: Option<u64>,
    }

    impl SpdxRecord for Item {
        const ENTITY: &'static str = "Item";
        const REQUIRED_FIELDS: &'static [&'static str] = &["id"];
    }

    fn parser(input: &str, buffer: usize) -> LargeDocumentParser<Cursor<Vec<u8>>, Item> {
        LargeDocumentParser::with_buffer(Cursor::new(input.as_bytes().to_vec()), buffer, 1 << 20)
            .with_handler("name", PropertyHandler::String)
            .with_handler("count", PropertyHandler::Integer)
            .with_handler("main", PropertyHandler::Object(decode_record::<Item>))
            .with_handler("items", PropertyHandler::Array(decode_record::<Item>))
    }

    #[test]
    fn test_dispatches_registered_and_unknown_properties() {
        let mut p = parser(
            r#"{"name": "doc", "count": 3, "main": {"id": "m"}, "extra": {"k": [1, 2]}}"#,
            16,
        );

        let r = p.next().unwrap().unwrap();
        assert_eq!(r.value, Some(PropertyValue::String("doc".into())));
        assert!(r.explicit_field);

        let r = p.next().unwrap().unwrap();
        assert_eq!(r.value, Some(PropertyValue::Integer(3)));

        let r = p.next().unwrap().unwrap();
        assert_eq!(
            r.value,
            Some(PropertyValue::Record(Item {
                id: "m".into(),
                size: None
            }))
        );

        let r = p.next().unwrap().unwrap();
        assert_eq!(r.name, "extra");
        assert!(!r.explicit_field);
        assert_eq!(r.value, Some(PropertyValue::Untyped(json!({"k": [1, 2]}))));

        assert!(p.next().unwrap().is_none());
        assert!(p.is_done());
        assert!(p.next().unwrap().is_none());
    }

    #[test]
    fn test_lazy_array_enumeration() {
        let mut p = parser(
            r#"{"items": [{"id": "a"}, {"id": "b", "size": 2}], "name": "after"}"#,
            8,
        );
        let r = p.next().unwrap().unwrap();
        assert!(r.is_array);
        assert!(r.value.is_none());

        let items: Vec<Item> = p.array_items().unwrap().map(Result::unwrap).collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].size, Some(2));

        let r = p.next().unwrap().unwrap();
        assert_eq!(r.value, Some(PropertyValue::String("after".into())));
    }

    #[test]
    fn test_next_before_drain_is_contract_violation() {
        let mut p = parser(r#"{"items": [{"id": "a"}, {"id": "b"}, {"id": "c"}]}"#, 16);
        p.next().unwrap();
        let first = p.array_items().unwrap().next().unwrap().unwrap();
        assert_eq!(first.id, "a");
        let err = p.next().unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_array_items_without_array_is_contract_violation() {
        let mut p = parser(r#"{"name": "x"}"#, 16);
        p.next().unwrap();
        assert!(p.array_items().err().is_some_and(|e| e.is_contract_violation()));
    }

    #[test]
    fn test_root_must_be_object() {
        let mut p = parser("[1, 2]", 16);
        assert!(matches!(
            p.next().unwrap_err(),
            ParseError::InvalidRoot {
                offset: 0,
                actual: TokenKind::StartArray
            }
        ));
    }

    #[test]
    fn test_handler_type_mismatch() {
        let mut p = parser(r#"{"name": 12}"#, 16);
        assert!(matches!(
            p.next().unwrap_err(),
            ParseError::UnexpectedToken {
                actual: TokenKind::Number,
                ..
            }
        ));
    }

    #[test]
    fn test_null_for_registered_property() {
        let mut p = parser(r#"{"items": null}"#, 16);
        let r = p.next().unwrap().unwrap();
        assert!(r.value.is_none());
        assert!(!r.is_array);
        assert!(p.next().unwrap().is_none());
    }

    #[test]
    fn test_missing_required_field_in_array() {
        let mut p = parser(r#"{"items": [{"size": 1}]}"#, 16);
        p.next().unwrap();
        let mut items = p.array_items().unwrap();
        let err = items.next().unwrap().unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "id"));
        assert!(items.next().is_none());
    }

    #[test]
    fn test_for_each_property_drains_unread_items() {
        let mut p = parser(r#"{"items": [{"id": "a"}, {"id": "b"}], "name": "n"}"#, 16);
        let mut names = Vec::new();
        p.for_each_property(|result, items| {
            if let Some(items) = items {
                items.next();
            }
            names.push(result.name);
            Ok(())
        })
        .unwrap();
        assert_eq!(names, vec!["items", "name"]);
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut p = parser(r#"{} x"#, 16);
        assert!(p.next().is_err());
    }
}
