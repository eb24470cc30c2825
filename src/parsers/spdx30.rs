//! SPDX 3.0 JSON-LD document parser.
//!
//! A 3.0 document is `{"@context": ..., "@graph": [...]}`. Graph elements
//! are decoded one at a time by [`decode_element`]. Licenses and suppliers
//! live in separate elements, so conversion to common entities happens
//! after the whole graph is read.

use super::streaming::{json_type_name, LargeDocumentParser, PropertyHandler, PropertyValue};
use super::traits::ParseError;
use crate::config::ParserConfig;
use crate::convert::spdx30 as convert;
use crate::model::spdx30::{decode_element, Spdx30Document, Spdx30Element};
use crate::model::SbomEntities;
use serde_json::Value;
use std::io::Read;

/// Parser for one SPDX 3.0 JSON-LD document.
pub struct Spdx30Parser<R> {
    parser: LargeDocumentParser<R, Spdx30Element>,
}

impl<R: Read> Spdx30Parser<R> {
    pub fn new(reader: R, config: &ParserConfig) -> Self {
        let parser = LargeDocumentParser::with_buffer(reader, config.initial_buffer_size, config.max_buffer_size)
            .with_handler("@graph", PropertyHandler::Array(decode_element));
        Self { parser }
    }

    /// Parse the whole document.
    ///
    /// `@context` must be a string, `@graph` must be present, and the graph
    /// must contain exactly one `SpdxDocument` element.
    pub fn parse(mut self) -> Result<Spdx30Document, ParseError> {
        let mut context = None;
        let mut elements = None;

        while let Some(result) = self.parser.next()? {
            match (result.name.as_str(), result.value) {
                ("@graph", _) if result.is_array => {
                    let mut graph = Vec::new();
                    for element in self.parser.array_items()? {
                        graph.push(element?);
                    }
                    elements = Some(graph);
                }
                ("@graph", None) => return Err(ParseError::invalid_value("@graph", "null")),
                ("@context", Some(PropertyValue::Untyped(Value::String(uri)))) => context = Some(uri),
                ("@context", Some(PropertyValue::Untyped(other))) => {
                    return Err(ParseError::invalid_value("@context", json_type_name(&other)));
                }
                ("@context", None) => return Err(ParseError::invalid_value("@context", "null")),
                (name, _) => tracing::debug!(property = name, "ignoring root property"),
            }
        }

        let context = context.ok_or_else(|| ParseError::missing_field("@context", "Document"))?;
        let elements = elements.ok_or_else(|| ParseError::missing_field("@graph", "Document"))?;
        let documents = elements
            .iter()
            .filter(|e| matches!(e, Spdx30Element::SpdxDocument(_)))
            .count();
        match documents {
            0 => return Err(ParseError::missing_field("SpdxDocument", "@graph")),
            1 => {}
            n => {
                return Err(ParseError::invalid_value(
                    "@graph",
                    format!("{n} SpdxDocument elements"),
                ))
            }
        }
        tracing::debug!(elements = elements.len(), "parsed SPDX 3.0 document");

        Ok(Spdx30Document { context, elements })
    }

    /// Parse and convert to common entities.
    pub fn parse_entities(self) -> Result<(Spdx30Document, SbomEntities), ParseError> {
        let document = self.parse()?;
        let entities = convert::to_entities(&document)?;
        tracing::debug!(entities = entities.entity_count(), "converted SPDX 3.0 document");
        Ok((document, entities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DOC: &str = r#"{
        "@context": "https://spdx.org/rdf/3.0.1/spdx-context.jsonld",
        "@graph": [
            {"type": "CreationInfo", "@id": "_:creationinfo", "specVersion": "3.0.1",
             "created": "2024-01-01T00:00:00Z", "createdBy": ["urn:agent"]},
            {"type": "SpdxDocument", "spdxId": "https://example.com/doc#SPDXRef-DOCUMENT",
             "creationInfo": "_:creationinfo", "name": "sample",
             "rootElement": ["SPDXRef-RootPackage"]},
            {"type": "software_Package", "spdxId": "SPDXRef-RootPackage",
             "creationInfo": "_:creationinfo", "name": "app", "software_packageVersion": "1.0"},
            {"type": "Relationship", "spdxId": "SPDXRef-Relationship-1",
             "creationInfo": "_:creationinfo", "from": "https://example.com/doc#SPDXRef-DOCUMENT",
             "relationshipType": "describes", "to": ["SPDXRef-RootPackage"]}
        ]
    }"#;

    fn parse(input: &str) -> Result<Spdx30Document, ParseError> {
        let config = ParserConfig {
            initial_buffer_size: 16,
            ..ParserConfig::default()
        };
        Spdx30Parser::new(Cursor::new(input.as_bytes().to_vec()), &config).parse()
    }

    #[test]
    fn test_parse_document() {
        let doc = parse(DOC).unwrap();
        assert_eq!(doc.elements.len(), 4);
        assert_eq!(doc.spdx_document().and_then(|d| d.name.as_deref()), Some("sample"));
    }

    #[test]
    fn test_parse_entities() {
        let config = ParserConfig::default();
        let (_, entities) = Spdx30Parser::new(Cursor::new(DOC.as_bytes().to_vec()), &config)
            .parse_entities()
            .unwrap();
        assert_eq!(entities.packages.len(), 1);
        assert_eq!(entities.packages[0].version.as_deref(), Some("1.0"));
        assert_eq!(entities.relationships.len(), 1);
        assert_eq!(entities.relationships[0].source_id, "SPDXRef-DOCUMENT");
        assert_eq!(entities.relationships[0].target_id, "SPDXRef-RootPackage");
    }

    #[test]
    fn test_missing_graph() {
        let err = parse(r#"{"@context": "x"}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "@graph"));
    }

    #[test]
    fn test_context_must_be_string() {
        let err = parse(r#"{"@context": ["x"], "@graph": []}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { ref field, .. } if field == "@context"));
    }

    #[test]
    fn test_spdx_document_required() {
        let err = parse(r#"{"@context": "x", "@graph": []}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "SpdxDocument"));
    }

    #[test]
    fn test_element_missing_creation_info() {
        let input = DOC.replace(
            r#""creationInfo": "_:creationinfo", "name": "app""#,
            r#""name": "app""#,
        );
        let err = parse(&input).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "creationInfo"));
    }

    #[test]
    fn test_relationship_missing_to() {
        let input = DOC.replace(r#", "to": ["SPDXRef-RootPackage"]"#, "");
        let err = parse(&input).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "to"));
    }
}
