//! SPDX 2.2 JSON document parser.
//!
//! Built on [`LargeDocumentParser`]: the header fields are decoded as they
//! appear and each entity array is enumerated lazily, so
//! [`Spdx22Parser::parse_entities`] never holds more than one native record
//! at a time.

use super::streaming::{decode_record, LargeDocumentParser, ParserResult, PropertyHandler, PropertyValue};
use super::traits::ParseError;
use crate::config::ParserConfig;
use crate::convert::spdx22 as convert;
use crate::model::spdx22::{
    Spdx22CreationInfo, Spdx22Document, Spdx22ExternalDocumentRef, Spdx22ExtractedLicensingInfo,
    Spdx22File, Spdx22Header, Spdx22Package, Spdx22Relationship,
};
use crate::model::SbomEntities;
use indexmap::IndexMap;
use serde_json::Value;
use std::io::Read;

/// A typed record decoded from a 2.2 document.
#[derive(Debug, Clone, PartialEq)]
pub enum Spdx22Record {
    CreationInfo(Spdx22CreationInfo),
    File(Spdx22File),
    Package(Spdx22Package),
    Relationship(Spdx22Relationship),
    ExternalDocumentRef(Spdx22ExternalDocumentRef),
    ExtractedLicensingInfo(Spdx22ExtractedLicensingInfo),
}

fn creation_info(value: Value) -> Result<Spdx22Record, ParseError> {
    decode_record(value).map(Spdx22Record::CreationInfo)
}

fn file(value: Value) -> Result<Spdx22Record, ParseError> {
    decode_record(value).map(Spdx22Record::File)
}

fn package(value: Value) -> Result<Spdx22Record, ParseError> {
    decode_record(value).map(Spdx22Record::Package)
}

fn relationship(value: Value) -> Result<Spdx22Record, ParseError> {
    decode_record(value).map(Spdx22Record::Relationship)
}

fn external_document_ref(value: Value) -> Result<Spdx22Record, ParseError> {
    decode_record(value).map(Spdx22Record::ExternalDocumentRef)
}

fn extracted_licensing_info(value: Value) -> Result<Spdx22Record, ParseError> {
    decode_record(value).map(Spdx22Record::ExtractedLicensingInfo)
}

/// Root-level scalar fields collected while walking the document.
#[derive(Debug, Default)]
struct RootFields {
    spdx_version: Option<String>,
    data_license: Option<String>,
    spdx_id: Option<String>,
    name: Option<String>,
    document_namespace: Option<String>,
    creation_info: Option<Spdx22CreationInfo>,
    document_describes: Vec<String>,
    extra: IndexMap<String, Value>,
}

impl RootFields {
    fn accept(&mut self, result: ParserResult<Spdx22Record>) -> Result<(), ParseError> {
        let Some(value) = result.value else {
            return Ok(());
        };
        match (result.name.as_str(), value) {
            ("spdxVersion", PropertyValue::String(s)) => self.spdx_version = Some(s),
            ("dataLicense", PropertyValue::String(s)) => self.data_license = Some(s),
            ("SPDXID", PropertyValue::String(s)) => self.spdx_id = Some(s),
            ("name", PropertyValue::String(s)) => self.name = Some(s),
            ("documentNamespace", PropertyValue::String(s)) => self.document_namespace = Some(s),
            ("creationInfo", PropertyValue::Record(Spdx22Record::CreationInfo(info))) => {
                self.creation_info = Some(info);
            }
            ("documentDescribes", PropertyValue::Untyped(v)) => {
                self.document_describes = serde_json::from_value(v).map_err(|e| ParseError::Deserialize {
                    entity: "Document".to_string(),
                    message: format!("documentDescribes: {e}"),
                })?;
            }
            (key, PropertyValue::Untyped(v)) => {
                self.extra.insert(key.to_string(), v);
            }
            (key, other) => {
                tracing::debug!(property = key, value = ?other, "ignoring unexpected root value");
            }
        }
        Ok(())
    }

    fn into_parts(self) -> Result<(Spdx22Header, IndexMap<String, Value>), ParseError> {
        let missing = |field: &str| ParseError::missing_field(field, "Document");
        let header = Spdx22Header {
            spdx_version: self.spdx_version.ok_or_else(|| missing("spdxVersion"))?,
            data_license: self.data_license.ok_or_else(|| missing("dataLicense"))?,
            spdx_id: self.spdx_id.ok_or_else(|| missing("SPDXID"))?,
            name: self.name.ok_or_else(|| missing("name"))?,
            document_namespace: self.document_namespace.ok_or_else(|| missing("documentNamespace"))?,
            creation_info: self.creation_info.ok_or_else(|| missing("creationInfo"))?,
            document_describes: self.document_describes,
        };
        if header.spdx_version != "SPDX-2.2" {
            tracing::warn!(version = %header.spdx_version, "reading document as SPDX-2.2");
        }
        Ok((header, self.extra))
    }
}

/// Parser for one SPDX 2.2 JSON document.
pub struct Spdx22Parser<R> {
    parser: LargeDocumentParser<R, Spdx22Record>,
}

impl<R: Read> Spdx22Parser<R> {
    pub fn new(reader: R, config: &ParserConfig) -> Self {
        let parser = LargeDocumentParser::with_buffer(reader, config.initial_buffer_size, config.max_buffer_size)
            .with_handler("spdxVersion", PropertyHandler::String)
            .with_handler("dataLicense", PropertyHandler::String)
            .with_handler("SPDXID", PropertyHandler::String)
            .with_handler("name", PropertyHandler::String)
            .with_handler("documentNamespace", PropertyHandler::String)
            .with_handler("creationInfo", PropertyHandler::Object(creation_info))
            .with_handler("files", PropertyHandler::Array(file))
            .with_handler("packages", PropertyHandler::Array(package))
            .with_handler("relationships", PropertyHandler::Array(relationship))
            .with_handler("externalDocumentRefs", PropertyHandler::Array(external_document_ref))
            .with_handler("hasExtractedLicensingInfos", PropertyHandler::Array(extracted_licensing_info));
        Self { parser }
    }

    /// Walk the document, handing every array record to `on_record`.
    fn drive<F>(mut self, mut on_record: F) -> Result<RootFields, ParseError>
    where
        F: FnMut(Spdx22Record) -> Result<(), ParseError>,
    {
        let mut root = RootFields::default();
        self.parser.for_each_property(|result, items| match items {
            Some(items) => {
                for record in items {
                    on_record(record?)?;
                }
                Ok(())
            }
            None => root.accept(result),
        })?;
        Ok(root)
    }

    /// Parse the whole document into native records.
    pub fn parse(self) -> Result<Spdx22Document, ParseError> {
        let mut files = Vec::new();
        let mut packages = Vec::new();
        let mut relationships = Vec::new();
        let mut external_document_refs = Vec::new();
        let mut licenses = Vec::new();

        let root = self.drive(|record| {
            match record {
                Spdx22Record::File(f) => files.push(f),
                Spdx22Record::Package(p) => packages.push(p),
                Spdx22Record::Relationship(r) => relationships.push(r),
                Spdx22Record::ExternalDocumentRef(r) => external_document_refs.push(r),
                Spdx22Record::ExtractedLicensingInfo(l) => licenses.push(l),
                Spdx22Record::CreationInfo(_) => {}
            }
            Ok(())
        })?;
        let (header, extra) = root.into_parts()?;
        tracing::debug!(
            files = files.len(),
            packages = packages.len(),
            relationships = relationships.len(),
            "parsed SPDX 2.2 document"
        );

        Ok(Spdx22Document {
            spdx_version: header.spdx_version,
            data_license: header.data_license,
            spdx_id: header.spdx_id,
            name: header.name,
            document_namespace: header.document_namespace,
            creation_info: header.creation_info,
            document_describes: header.document_describes,
            files,
            packages,
            relationships,
            external_document_refs,
            has_extracted_licensing_infos: licenses,
            extra,
        })
    }

    /// Parse straight into common entities, converting each record as it
    /// is decoded.
    pub fn parse_entities(self) -> Result<(Spdx22Header, SbomEntities), ParseError> {
        let mut entities = SbomEntities::default();
        let mut license_texts = Vec::new();

        let root = self.drive(|record| {
            match record {
                Spdx22Record::File(f) => entities.files.push(convert::file_to_common(&f)),
                Spdx22Record::Package(p) => entities.packages.push(convert::package_to_common(&p)),
                Spdx22Record::Relationship(r) => entities.relationships.push(convert::relationship_to_common(&r)),
                Spdx22Record::ExternalDocumentRef(r) => entities.references.push(convert::reference_to_common(&r)),
                Spdx22Record::ExtractedLicensingInfo(l) => license_texts.push((l.license_id, l.extracted_text)),
                Spdx22Record::CreationInfo(_) => {}
            }
            Ok(())
        })?;
        let (header, _) = root.into_parts()?;
        entities.license_texts = license_texts.into_iter().collect();
        crate::convert::fill_depends_on(&mut entities);
        tracing::debug!(entities = entities.entity_count(), "converted SPDX 2.2 document");
        Ok((header, entities))
    }
}
