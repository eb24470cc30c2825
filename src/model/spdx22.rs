//! Native SPDX 2.2 JSON records.

use super::entities::{ChecksumAlgorithm, ReferenceCategory, RelationshipType};
use super::wire;
use crate::parsers::streaming::SpdxRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root fields every 2.2 document must carry.
pub const SPDX22_REQUIRED_ROOT_FIELDS: &[&str] = &[
    "spdxVersion",
    "dataLicense",
    "SPDXID",
    "name",
    "documentNamespace",
    "creationInfo",
];

/// A complete SPDX 2.2 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22Document {
    pub spdx_version: String,
    pub data_license: String,
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: String,
    pub document_namespace: String,
    pub creation_info: Spdx22CreationInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_describes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<Spdx22File>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Spdx22Package>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Spdx22Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_document_refs: Vec<Spdx22ExternalDocumentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has_extracted_licensing_infos: Vec<Spdx22ExtractedLicensingInfo>,
    /// Properties without a typed field (annotations, snippets, vendor keys)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Header of a 2.2 document: everything but the entity arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22Header {
    pub spdx_version: String,
    pub data_license: String,
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: String,
    pub document_namespace: String,
    pub creation_info: Spdx22CreationInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub document_describes: Vec<String>,
}

impl Spdx22Header {
    /// A header with the conventional version, data license and id.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, creation_info: Spdx22CreationInfo) -> Self {
        Self {
            spdx_version: "SPDX-2.2".to_string(),
            data_license: "CC0-1.0".to_string(),
            spdx_id: super::DOCUMENT_SPDX_ID.to_string(),
            name: name.into(),
            document_namespace: namespace.into(),
            creation_info,
            document_describes: Vec::new(),
        }
    }
}

impl Spdx22Document {
    /// Split off the header fields.
    pub fn header(&self) -> Spdx22Header {
        Spdx22Header {
            spdx_version: self.spdx_version.clone(),
            data_license: self.data_license.clone(),
            spdx_id: self.spdx_id.clone(),
            name: self.name.clone(),
            document_namespace: self.document_namespace.clone(),
            creation_info: self.creation_info.clone(),
            document_describes: self.document_describes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22CreationInfo {
    pub created: String,
    pub creators: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_list_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SpdxRecord for Spdx22CreationInfo {
    const ENTITY: &'static str = "CreationInfo";
    const REQUIRED_FIELDS: &'static [&'static str] = &["created", "creators"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22Checksum {
    #[serde(with = "wire::spdx22_algorithm")]
    pub algorithm: ChecksumAlgorithm,
    pub checksum_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22File {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub file_name: String,
    pub checksums: Vec<Spdx22Checksum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_concluded: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub license_info_in_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_text: Option<String>,
}

impl SpdxRecord for Spdx22File {
    const ENTITY: &'static str = "File";
    const REQUIRED_FIELDS: &'static [&'static str] = &["SPDXID", "fileName", "checksums"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22ExternalRef {
    #[serde(with = "wire::reference_category")]
    pub reference_category: ReferenceCategory,
    pub reference_type: String,
    pub reference_locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22PackageVerificationCode {
    pub package_verification_code_value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_verification_code_excluded_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22Package {
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_analyzed: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checksums: Vec<Spdx22Checksum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_concluded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_declared: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub license_info_from_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_refs: Vec<Spdx22ExternalRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_verification_code: Option<Spdx22PackageVerificationCode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has_files: Vec<String>,
}

impl SpdxRecord for Spdx22Package {
    const ENTITY: &'static str = "Package";
    const REQUIRED_FIELDS: &'static [&'static str] = &["SPDXID", "name"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22Relationship {
    pub spdx_element_id: String,
    #[serde(with = "wire::spdx22_relationship_type")]
    pub relationship_type: RelationshipType,
    pub related_spdx_element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl SpdxRecord for Spdx22Relationship {
    const ENTITY: &'static str = "Relationship";
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["spdxElementId", "relatedSpdxElement", "relationshipType"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22ExternalDocumentRef {
    pub external_document_id: String,
    pub spdx_document: String,
    pub checksum: Spdx22Checksum,
}

impl SpdxRecord for Spdx22ExternalDocumentRef {
    const ENTITY: &'static str = "ExternalDocumentRef";
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["externalDocumentId", "spdxDocument", "checksum"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx22ExtractedLicensingInfo {
    pub license_id: String,
    pub extracted_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SpdxRecord for Spdx22ExtractedLicensingInfo {
    const ENTITY: &'static str = "ExtractedLicensingInfo";
    const REQUIRED_FIELDS: &'static [&'static str] = &["licenseId", "extractedText"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::streaming::decode_record;
    use crate::parsers::ParseError;
    use serde_json::json;

    #[test]
    fn test_relationship_requires_both_ends() {
        let err = decode_record::<Spdx22Relationship>(json!({
            "spdxElementId": "SPDXRef-A",
            "relationshipType": "CONTAINS"
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField { ref field, ref entity } if field == "relatedSpdxElement" && entity == "Relationship"
        ));
    }

    #[test]
    fn test_checksum_algorithm_spelling() {
        let file: Spdx22File = decode_record(json!({
            "SPDXID": "SPDXRef-File-a",
            "fileName": "./a.txt",
            "checksums": [{"algorithm": "SHA3-256", "checksumValue": "ab"}]
        }))
        .unwrap();
        assert_eq!(file.checksums[0].algorithm, ChecksumAlgorithm::Sha3_256);
        let out = serde_json::to_value(&file).unwrap();
        assert_eq!(out["checksums"][0]["algorithm"], "SHA3-256");
        assert!(out.get("licenseConcluded").is_none());
    }

    #[test]
    fn test_reference_category_alias_round_trip() {
        let reference: Spdx22ExternalRef = serde_json::from_value(json!({
            "referenceCategory": "PACKAGE_MANAGER",
            "referenceType": "purl",
            "referenceLocator": "pkg:npm/a@1"
        }))
        .unwrap();
        assert_eq!(reference.reference_category, ReferenceCategory::PackageManager);
        let out = serde_json::to_value(&reference).unwrap();
        assert_eq!(out["referenceCategory"], "PACKAGE-MANAGER");
    }

    #[test]
    fn test_unknown_relationship_type_rejected() {
        let err = decode_record::<Spdx22Relationship>(json!({
            "spdxElementId": "SPDXRef-A",
            "relatedSpdxElement": "SPDXRef-B",
            "relationshipType": "HAS_DECLARED_LICENSE"
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::Deserialize { .. }));
    }
}
