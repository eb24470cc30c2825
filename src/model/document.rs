//! Document-level metadata shared by both generators.

use super::identifiers::sanitize_spdx_id;
use super::spdx22::{Spdx22CreationInfo, Spdx22Header};
use super::spdx30::{Spdx30Element, Spdx30Document};
use chrono::{DateTime, SecondsFormat, Utc};

/// Id of the document itself, as 2.2 and the common entities spell it.
pub const DOCUMENT_SPDX_ID: &str = "SPDXRef-DOCUMENT";

/// Base of namespaces made up for 3.0 documents whose id carries none.
pub const GENERATED_NAMESPACE_BASE: &str = "https://spdx.org/spdxdocs";

/// Name, namespace and creation data for a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub name: String,
    pub namespace: String,
    pub data_license: String,
    pub created: DateTime<Utc>,
    /// Creators in 2.2 form, e.g. `Tool: sbom-parity-0.1.0`
    pub creators: Vec<String>,
}

impl DocumentInfo {
    /// New metadata stamped with the current time and this tool as creator.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            data_license: "CC0-1.0".to_string(),
            created: Utc::now(),
            creators: vec![default_creator()],
        }
    }

    /// Fix the creation time.
    #[must_use]
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = created;
        self
    }

    /// `created` in SPDX timestamp form (`2024-01-01T00:00:00Z`).
    pub fn created_timestamp(&self) -> String {
        self.created.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `spdxId` of the 3.0 `SpdxDocument` element.
    pub fn spdx30_document_id(&self) -> String {
        format!("{}#{DOCUMENT_SPDX_ID}", self.namespace)
    }

    /// Header for a 2.2 document.
    pub fn spdx22_header(&self) -> Spdx22Header {
        let mut header = Spdx22Header::new(
            self.name.clone(),
            self.namespace.clone(),
            Spdx22CreationInfo {
                created: self.created_timestamp(),
                creators: self.creators.clone(),
                license_list_version: None,
                comment: None,
            },
        );
        header.data_license.clone_from(&self.data_license);
        header
    }

    /// Carry over a parsed 2.2 header.
    pub fn from_spdx22(header: &Spdx22Header) -> Self {
        let created = DateTime::parse_from_rfc3339(&header.creation_info.created)
            .map_or_else(|_| Utc::now(), |t| t.with_timezone(&Utc));
        Self {
            name: header.name.clone(),
            namespace: header.document_namespace.clone(),
            data_license: header.data_license.clone(),
            created,
            creators: header.creation_info.creators.clone(),
        }
    }

    /// Carry over a parsed 3.0 document's metadata.
    ///
    /// Creators are resolved through the agent elements named by the
    /// creation info's `createdBy`; unresolved ids are skipped.
    pub fn from_spdx30(document: &Spdx30Document) -> Self {
        let mut info = Self::new("", "");
        if let Some(doc) = document.spdx_document() {
            info.name = doc.name.clone().unwrap_or_default();
            info.namespace = namespace_of(&doc.spdx_id, &info.name);
            if let Some(license) = &doc.data_license {
                info.data_license.clone_from(license);
            }
        }

        let creation = document.elements.iter().find_map(|e| match e {
            Spdx30Element::CreationInfo(c) => Some(c),
            _ => None,
        });
        let Some(creation) = creation else {
            return info;
        };
        if let Ok(created) = DateTime::parse_from_rfc3339(&creation.created) {
            info.created = created.with_timezone(&Utc);
        }
        let creators: Vec<String> = creation
            .created_by
            .iter()
            .filter_map(|id| {
                let agent = document.elements.iter().find_map(|e| match e {
                    Spdx30Element::Agent(a) if a.spdx_id == *id => Some(a),
                    _ => None,
                });
                if agent.is_none() {
                    tracing::debug!(agent = %id, "creator not in graph");
                }
                agent.map(|a| format!("{}: {}", a.kind.spdx22_prefix(), a.name))
            })
            .collect();
        if !creators.is_empty() {
            info.creators = creators;
        }
        info
    }
}

/// Namespace of a 3.0 document id (`<namespace>#SPDXRef-DOCUMENT`).
///
/// A bare id gets a namespace under [`GENERATED_NAMESPACE_BASE`].
fn namespace_of(document_id: &str, name: &str) -> String {
    match document_id.rsplit_once('#') {
        Some((namespace, _)) if !namespace.is_empty() => namespace.to_string(),
        _ if document_id.contains("://") => document_id.to_string(),
        _ => {
            let stem = if name.trim().is_empty() { document_id } else { name };
            format!("{GENERATED_NAMESPACE_BASE}/{}", sanitize_spdx_id(stem.trim()))
        }
    }
}

/// Creator string for this tool.
pub fn default_creator() -> String {
    format!("Tool: {}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::spdx30::{
        AgentKind, Spdx30Agent, Spdx30CreationInfo, Spdx30SpdxDocument, CREATION_INFO_ID, SPDX30_CONTEXT,
    };
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format() {
        let info = DocumentInfo::new("doc", "https://example.com/doc")
            .with_created(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        assert_eq!(info.created_timestamp(), "2024-05-01T12:30:00Z");
        let header = info.spdx22_header();
        assert_eq!(header.creation_info.created, "2024-05-01T12:30:00Z");
        assert_eq!(header.spdx_version, "SPDX-2.2");
        assert!(header.creation_info.creators[0].starts_with("Tool: sbom-parity-"));
        assert_eq!(info.spdx30_document_id(), "https://example.com/doc#SPDXRef-DOCUMENT");
    }

    fn spdx30(document_id: &str, created_by: Vec<String>) -> Spdx30Document {
        Spdx30Document {
            context: SPDX30_CONTEXT.into(),
            elements: vec![
                Spdx30Element::CreationInfo(Spdx30CreationInfo {
                    id: CREATION_INFO_ID.into(),
                    spec_version: "3.0.1".into(),
                    created: "2024-03-01T08:00:00Z".into(),
                    created_by,
                }),
                Spdx30Element::Agent(Spdx30Agent {
                    kind: AgentKind::Tool,
                    spdx_id: "SPDXRef-Agent-tool".into(),
                    creation_info: CREATION_INFO_ID.into(),
                    name: "builder-2.1".into(),
                }),
                Spdx30Element::Agent(Spdx30Agent {
                    kind: AgentKind::Organization,
                    spdx_id: "SPDXRef-Agent-org".into(),
                    creation_info: CREATION_INFO_ID.into(),
                    name: "ACME".into(),
                }),
                Spdx30Element::SpdxDocument(Spdx30SpdxDocument {
                    spdx_id: document_id.into(),
                    creation_info: CREATION_INFO_ID.into(),
                    name: Some("app sbom".into()),
                    data_license: None,
                    root_element: Vec::new(),
                    profile_conformance: Vec::new(),
                }),
            ],
        }
    }

    #[test]
    fn test_from_spdx30_carries_creators() {
        let document = spdx30(
            "https://example.com/app#SPDXRef-DOCUMENT",
            vec!["SPDXRef-Agent-tool".into(), "urn:unknown".into(), "SPDXRef-Agent-org".into()],
        );
        let info = DocumentInfo::from_spdx30(&document);
        assert_eq!(info.namespace, "https://example.com/app");
        assert_eq!(info.creators, vec!["Tool: builder-2.1", "Organization: ACME"]);
        assert_eq!(info.created_timestamp(), "2024-03-01T08:00:00Z");
        assert_eq!(info.spdx22_header().creation_info.creators, info.creators);
    }

    #[test]
    fn test_from_spdx30_without_resolvable_creators_keeps_default() {
        let info = DocumentInfo::from_spdx30(&spdx30("https://example.com/app#SPDXRef-DOCUMENT", Vec::new()));
        assert_eq!(info.creators, vec![default_creator()]);
    }

    #[test]
    fn test_from_spdx30_bare_document_id_gets_namespace() {
        let info = DocumentInfo::from_spdx30(&spdx30("SPDXRef-DOCUMENT", Vec::new()));
        assert_eq!(info.namespace, "https://spdx.org/spdxdocs/app-sbom");
        assert_ne!(info.namespace, DOCUMENT_SPDX_ID);

        let info = DocumentInfo::from_spdx30(&spdx30("https://example.com/app", Vec::new()));
        assert_eq!(info.namespace, "https://example.com/app");
    }
}
