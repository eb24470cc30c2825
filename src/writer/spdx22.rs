//! Incremental SPDX 2.2 document writer.

use super::json::JsonStreamWriter;
use super::{WriteError, WriterOptions};
use crate::model::spdx22::{
    Spdx22ExternalDocumentRef, Spdx22ExtractedLicensingInfo, Spdx22File, Spdx22Header,
    Spdx22Package, Spdx22Relationship,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Write;

/// Writes a 2.2 document: header fields first, then one array section per
/// entity category.
///
/// Each section is written at most once and streamed item by item.
pub struct Spdx22DocumentWriter<W: Write> {
    json: Option<JsonStreamWriter<W>>,
    sections: HashSet<String>,
    open_section: Option<String>,
}

impl<W: Write> Spdx22DocumentWriter<W> {
    /// Open the document and write the required root fields.
    pub fn begin(sink: W, header: &Spdx22Header, options: &WriterOptions) -> Result<Self, WriteError> {
        let mut json = JsonStreamWriter::new(sink, options.pretty).with_flush_interval(options.flush_interval);
        json.start_object()?;
        if let Value::Object(fields) = serde_json::to_value(header)? {
            for (name, value) in &fields {
                json.property(name, value)?;
            }
        }
        Ok(Self {
            json: Some(json),
            sections: HashSet::new(),
            open_section: None,
        })
    }

    fn json(&mut self) -> Result<&mut JsonStreamWriter<W>, WriteError> {
        self.json.as_mut().ok_or_else(finished)
    }

    /// Open a named array section.
    pub fn begin_section(&mut self, name: &str) -> Result<(), WriteError> {
        if let Some(open) = &self.open_section {
            return Err(WriteError::Unbalanced(format!(
                "section '{name}' opened while '{open}' is still open"
            )));
        }
        if !self.sections.insert(name.to_string()) {
            return Err(WriteError::Unbalanced(format!("section '{name}' written twice")));
        }
        let json = self.json()?;
        json.property_name(name)?;
        json.start_array()?;
        self.open_section = Some(name.to_string());
        Ok(())
    }

    /// Append one item to the open section.
    pub fn write_item<T: Serialize>(&mut self, item: &T) -> Result<(), WriteError> {
        if self.open_section.is_none() {
            return Err(WriteError::Unbalanced("item written outside a section".to_string()));
        }
        self.json()?.value(item)
    }

    /// Close the open section.
    pub fn end_section(&mut self) -> Result<(), WriteError> {
        if self.open_section.take().is_none() {
            return Err(WriteError::Unbalanced("no section is open".to_string()));
        }
        self.json()?.end_array()
    }

    /// Write a whole section from an iterator; returns the item count.
    pub fn write_section<'a, T, I>(&mut self, name: &str, items: I) -> Result<usize, WriteError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        self.begin_section(name)?;
        let mut count = 0;
        for item in items {
            self.write_item(item)?;
            count += 1;
        }
        self.end_section()?;
        Ok(count)
    }

    pub fn write_files<'a>(&mut self, files: impl IntoIterator<Item = &'a Spdx22File>) -> Result<usize, WriteError> {
        self.write_section("files", files)
    }

    pub fn write_packages<'a>(
        &mut self,
        packages: impl IntoIterator<Item = &'a Spdx22Package>,
    ) -> Result<usize, WriteError> {
        self.write_section("packages", packages)
    }

    pub fn write_relationships<'a>(
        &mut self,
        relationships: impl IntoIterator<Item = &'a Spdx22Relationship>,
    ) -> Result<usize, WriteError> {
        self.write_section("relationships", relationships)
    }

    pub fn write_external_document_refs<'a>(
        &mut self,
        refs: impl IntoIterator<Item = &'a Spdx22ExternalDocumentRef>,
    ) -> Result<usize, WriteError> {
        self.write_section("externalDocumentRefs", refs)
    }

    pub fn write_extracted_licensing_infos<'a>(
        &mut self,
        infos: impl IntoIterator<Item = &'a Spdx22ExtractedLicensingInfo>,
    ) -> Result<usize, WriteError> {
        self.write_section("hasExtractedLicensingInfos", infos)
    }

    /// Close the document, returning the sink.
    pub fn finish(mut self) -> Result<W, WriteError> {
        if let Some(open) = &self.open_section {
            return Err(WriteError::Unbalanced(format!("section '{open}' is still open")));
        }
        let mut json = self.json.take().ok_or_else(finished)?;
        json.end_object()?;
        tracing::debug!(sections = self.sections.len(), "SPDX 2.2 document written");
        json.finish()
    }
}

fn finished() -> WriteError {
    WriteError::Unbalanced("document already finished".to_string())
}

impl<W: Write> Drop for Spdx22DocumentWriter<W> {
    fn drop(&mut self) {
        if self.json.is_some() {
            tracing::warn!("SPDX 2.2 writer dropped without finish(); output is incomplete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spdx22::{Spdx22CreationInfo, Spdx22Document};
    use crate::model::RelationshipType;

    fn header() -> Spdx22Header {
        Spdx22Header::new(
            "doc",
            "https://example.com/doc",
            Spdx22CreationInfo {
                created: "2024-01-01T00:00:00Z".into(),
                creators: vec!["Tool: test".into()],
                license_list_version: None,
                comment: None,
            },
        )
    }

    #[test]
    fn test_document_parses_back() {
        let mut writer = Spdx22DocumentWriter::begin(Vec::new(), &header(), &WriterOptions::default()).unwrap();
        let relationships = vec![Spdx22Relationship {
            spdx_element_id: "SPDXRef-DOCUMENT".into(),
            relationship_type: RelationshipType::Describes,
            related_spdx_element: "SPDXRef-RootPackage".into(),
            comment: None,
        }];
        assert_eq!(writer.write_relationships(&relationships).unwrap(), 1);
        let out = writer.finish().unwrap();

        let doc: Spdx22Document = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc.name, "doc");
        assert_eq!(doc.spdx_id, "SPDXRef-DOCUMENT");
        assert_eq!(doc.relationships, relationships);
    }

    #[test]
    fn test_section_written_twice_rejected() {
        let mut writer = Spdx22DocumentWriter::begin(Vec::new(), &header(), &WriterOptions::default()).unwrap();
        writer.write_files(&[]).unwrap();
        assert!(matches!(writer.write_files(&[]), Err(WriteError::Unbalanced(_))));
    }

    #[test]
    fn test_item_outside_section_rejected() {
        let mut writer = Spdx22DocumentWriter::begin(Vec::new(), &header(), &WriterOptions::default()).unwrap();
        assert!(writer.write_item(&1).is_err());
        writer.begin_section("files").unwrap();
        assert!(writer.begin_section("packages").is_err());
        assert!(writer.finish().is_err());
    }
}
