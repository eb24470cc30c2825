//! Native SPDX 3.0 JSON-LD records.
//!
//! A 3.0 document is a flat `@graph` of typed elements. Every element is
//! tagged with a `type` discriminator; [`decode_element`] dispatches on it
//! and keeps unrecognized types as raw values.

use super::entities::{ChecksumAlgorithm, RelationshipType};
use super::wire;
use crate::parsers::streaming::{decode_record, json_type_name, SpdxRecord};
use crate::parsers::ParseError;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Default JSON-LD context for generated documents.
pub const SPDX30_CONTEXT: &str = "https://spdx.org/rdf/3.0.1/spdx-context.jsonld";

/// Blank-node id shared by generated elements' creation info.
pub const CREATION_INFO_ID: &str = "_:creationinfo";

/// Fields every graph element must carry.
pub const SPDX30_REQUIRED_ELEMENT_FIELDS: &[&str] = &["type", "spdxId", "creationInfo"];

/// A complete SPDX 3.0 document.
#[derive(Debug, Clone, PartialEq)]
pub struct Spdx30Document {
    pub context: String,
    pub elements: Vec<Spdx30Element>,
}

impl Spdx30Document {
    /// The single `SpdxDocument` element, if present.
    pub fn spdx_document(&self) -> Option<&Spdx30SpdxDocument> {
        self.elements.iter().find_map(|e| match e {
            Spdx30Element::SpdxDocument(doc) => Some(doc),
            _ => None,
        })
    }
}

/// One element of the `@graph`.
#[derive(Debug, Clone, PartialEq)]
pub enum Spdx30Element {
    File(Spdx30File),
    Package(Spdx30Package),
    Relationship(Spdx30Relationship),
    License(Spdx30License),
    ExternalMap(Spdx30ExternalMap),
    Agent(Spdx30Agent),
    SpdxDocument(Spdx30SpdxDocument),
    CreationInfo(Spdx30CreationInfo),
    /// Element of a type this crate does not model
    Other(Value),
}

impl Spdx30Element {
    /// The `type` discriminator written for this element.
    pub fn type_name(&self) -> &str {
        match self {
            Self::File(_) => "software_File",
            Self::Package(_) => "software_Package",
            Self::Relationship(_) => "Relationship",
            Self::License(l) => l.kind.type_name(),
            Self::ExternalMap(_) => "ExternalMap",
            Self::Agent(a) => a.kind.type_name(),
            Self::SpdxDocument(_) => "SpdxDocument",
            Self::CreationInfo(_) => "CreationInfo",
            Self::Other(v) => v.get("type").and_then(Value::as_str).unwrap_or("Unknown"),
        }
    }

    /// The element's `spdxId` (or `@id` for creation info).
    pub fn spdx_id(&self) -> Option<&str> {
        match self {
            Self::File(e) => Some(&e.spdx_id),
            Self::Package(e) => Some(&e.spdx_id),
            Self::Relationship(e) => Some(&e.spdx_id),
            Self::License(e) => Some(&e.spdx_id),
            Self::ExternalMap(e) => Some(&e.spdx_id),
            Self::Agent(e) => Some(&e.spdx_id),
            Self::SpdxDocument(e) => Some(&e.spdx_id),
            Self::CreationInfo(e) => Some(&e.id),
            Self::Other(v) => v.get("spdxId").and_then(Value::as_str),
        }
    }
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(flatten)]
    inner: &'a T,
}

impl Serialize for Spdx30Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.type_name();
        match self {
            Self::File(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::Package(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::Relationship(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::License(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::ExternalMap(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::Agent(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::SpdxDocument(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::CreationInfo(e) => Tagged { kind, inner: e }.serialize(serializer),
            Self::Other(v) => v.serialize(serializer),
        }
    }
}

// ============================================================================
// Supporting records
// ============================================================================

/// Verification data attached to an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Spdx30IntegrityMethod {
    Hash {
        #[serde(with = "wire::spdx30_algorithm")]
        algorithm: ChecksumAlgorithm,
        #[serde(rename = "hashValue")]
        hash_value: String,
    },
    PackageVerificationCode {
        #[serde(with = "wire::spdx30_algorithm")]
        algorithm: ChecksumAlgorithm,
        #[serde(rename = "hashValue")]
        hash_value: String,
        #[serde(
            rename = "packageVerificationCodeExcludedFile",
            default,
            skip_serializing_if = "Vec::is_empty"
        )]
        excluded_files: Vec<String>,
    },
}

impl Spdx30IntegrityMethod {
    /// Algorithm and value of a plain hash; `None` for verification codes.
    pub fn as_hash(&self) -> Option<(ChecksumAlgorithm, &str)> {
        match self {
            Self::Hash {
                algorithm,
                hash_value,
            } => Some((*algorithm, hash_value.as_str())),
            Self::PackageVerificationCode { .. } => None,
        }
    }
}

fn external_identifier_type() -> String {
    "ExternalIdentifier".to_string()
}

/// Identifier of an element in some external scheme, such as a purl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30ExternalIdentifier {
    #[serde(rename = "type", default = "external_identifier_type")]
    pub kind: String,
    pub external_identifier_type: String,
    pub identifier: String,
}

impl Spdx30ExternalIdentifier {
    pub fn package_url(purl: impl Into<String>) -> Self {
        Self {
            kind: external_identifier_type(),
            external_identifier_type: "packageUrl".to_string(),
            identifier: purl.into(),
        }
    }

    pub fn is_package_url(&self) -> bool {
        self.external_identifier_type.eq_ignore_ascii_case("packageUrl")
    }
}

// ============================================================================
// Elements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30File {
    pub spdx_id: String,
    pub creation_info: String,
    /// The file's path
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verified_using: Vec<Spdx30IntegrityMethod>,
    #[serde(
        rename = "software_copyrightText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub copyright_text: Option<String>,
}

impl SpdxRecord for Spdx30File {
    const ENTITY: &'static str = "software_File";
    const REQUIRED_FIELDS: &'static [&'static str] = &["type", "spdxId", "creationInfo", "name"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30Package {
    pub spdx_id: String,
    pub creation_info: String,
    pub name: String,
    #[serde(
        rename = "software_packageVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub package_version: Option<String>,
    #[serde(
        rename = "software_downloadLocation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub download_location: Option<String>,
    #[serde(
        rename = "software_copyrightText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub copyright_text: Option<String>,
    /// Agent element id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplied_by: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_identifier: Vec<Spdx30ExternalIdentifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verified_using: Vec<Spdx30IntegrityMethod>,
}

impl SpdxRecord for Spdx30Package {
    const ENTITY: &'static str = "software_Package";
    const REQUIRED_FIELDS: &'static [&'static str] = &["type", "spdxId", "creationInfo", "name"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30Relationship {
    pub spdx_id: String,
    pub creation_info: String,
    pub from: String,
    #[serde(with = "wire::spdx30_relationship_type")]
    pub relationship_type: RelationshipType,
    pub to: Vec<String>,
}

impl SpdxRecord for Spdx30Relationship {
    const ENTITY: &'static str = "Relationship";
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["type", "spdxId", "creationInfo", "from", "to", "relationshipType"];
}

/// Which license element type a [`Spdx30License`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LicenseKind {
    AnyLicenseInfo,
    #[default]
    LicenseExpression,
    CustomLicense,
}

impl LicenseKind {
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::AnyLicenseInfo => "simplelicensing_AnyLicenseInfo",
            Self::LicenseExpression => "simplelicensing_LicenseExpression",
            Self::CustomLicense => "expandedlicensing_CustomLicense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30License {
    #[serde(skip)]
    pub kind: LicenseKind,
    pub spdx_id: String,
    pub creation_info: String,
    /// License id or expression
    pub name: String,
    #[serde(
        rename = "simplelicensing_licenseExpression",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub license_expression: Option<String>,
    #[serde(
        rename = "simplelicensing_licenseText",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub license_text: Option<String>,
}

impl Spdx30License {
    /// The license string this element stands for.
    pub fn license(&self) -> &str {
        if self.name.is_empty() {
            self.license_expression.as_deref().unwrap_or_default()
        } else {
            &self.name
        }
    }
}

impl SpdxRecord for Spdx30License {
    const ENTITY: &'static str = "License";
    const REQUIRED_FIELDS: &'static [&'static str] = &["type", "spdxId", "creationInfo", "name"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30ExternalMap {
    pub spdx_id: String,
    pub creation_info: String,
    pub external_spdx_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verified_using: Vec<Spdx30IntegrityMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<String>,
}

impl SpdxRecord for Spdx30ExternalMap {
    const ENTITY: &'static str = "ExternalMap";
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["type", "spdxId", "creationInfo", "externalSpdxId"];
}

/// Which agent element type a [`Spdx30Agent`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentKind {
    #[default]
    Organization,
    Person,
    Tool,
    SoftwareAgent,
}

impl AgentKind {
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::Person => "Person",
            Self::Tool => "Tool",
            Self::SoftwareAgent => "SoftwareAgent",
        }
    }

    /// Prefix used for this agent in 2.2 supplier and creator strings.
    pub const fn spdx22_prefix(self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::Person => "Person",
            Self::Tool | Self::SoftwareAgent => "Tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30Agent {
    #[serde(skip)]
    pub kind: AgentKind,
    pub spdx_id: String,
    pub creation_info: String,
    pub name: String,
}

impl SpdxRecord for Spdx30Agent {
    const ENTITY: &'static str = "Agent";
    const REQUIRED_FIELDS: &'static [&'static str] = &["type", "spdxId", "creationInfo", "name"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30SpdxDocument {
    pub spdx_id: String,
    pub creation_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_license: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root_element: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile_conformance: Vec<String>,
}

impl SpdxRecord for Spdx30SpdxDocument {
    const ENTITY: &'static str = "SpdxDocument";
    const REQUIRED_FIELDS: &'static [&'static str] = &["type", "spdxId", "creationInfo"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spdx30CreationInfo {
    #[serde(rename = "@id")]
    pub id: String,
    pub spec_version: String,
    pub created: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_by: Vec<String>,
}

impl SpdxRecord for Spdx30CreationInfo {
    const ENTITY: &'static str = "CreationInfo";
    const REQUIRED_FIELDS: &'static [&'static str] = &["type", "@id", "specVersion", "created"];
}

/// Decode one `@graph` entry.
pub fn decode_element(value: Value) -> Result<Spdx30Element, ParseError> {
    let Some(kind) = value.get("type") else {
        return Err(ParseError::missing_field("type", "element"));
    };
    let Some(kind) = kind.as_str() else {
        return Err(ParseError::invalid_value("type", json_type_name(kind)));
    };

    let element = match kind {
        "software_File" => Spdx30Element::File(decode_record(value)?),
        "software_Package" => Spdx30Element::Package(decode_record(value)?),
        "Relationship" => Spdx30Element::Relationship(decode_record(value)?),
        "ExternalMap" => Spdx30Element::ExternalMap(decode_record(value)?),
        "SpdxDocument" => Spdx30Element::SpdxDocument(decode_record(value)?),
        "CreationInfo" => Spdx30Element::CreationInfo(decode_record(value)?),
        "simplelicensing_AnyLicenseInfo" => license(value, LicenseKind::AnyLicenseInfo)?,
        "simplelicensing_LicenseExpression" => license(value, LicenseKind::LicenseExpression)?,
        "expandedlicensing_CustomLicense" => license(value, LicenseKind::CustomLicense)?,
        "Organization" => agent(value, AgentKind::Organization)?,
        "Person" => agent(value, AgentKind::Person)?,
        "Tool" => agent(value, AgentKind::Tool)?,
        "SoftwareAgent" => agent(value, AgentKind::SoftwareAgent)?,
        other => {
            tracing::warn!(element_type = other, "keeping unrecognized @graph element as raw JSON");
            if let Some(field) = SPDX30_REQUIRED_ELEMENT_FIELDS
                .iter()
                .find(|f| value.get(**f).is_none_or(Value::is_null))
            {
                return Err(ParseError::missing_field(*field, other));
            }
            Spdx30Element::Other(value)
        }
    };
    Ok(element)
}

fn license(value: Value, kind: LicenseKind) -> Result<Spdx30Element, ParseError> {
    let mut license: Spdx30License = decode_record(value)?;
    license.kind = kind;
    Ok(Spdx30Element::License(license))
}

fn agent(value: Value, kind: AgentKind) -> Result<Spdx30Element, ParseError> {
    let mut agent: Spdx30Agent = decode_record(value)?;
    agent.kind = kind;
    Ok(Spdx30Element::Agent(agent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_package_with_purl_and_hash() {
        let element = decode_element(json!({
            "type": "software_Package",
            "spdxId": "SPDXRef-Package-1",
            "creationInfo": "_:creationinfo",
            "name": "left-pad",
            "software_packageVersion": "1.3.0",
            "externalIdentifier": [{
                "type": "ExternalIdentifier",
                "externalIdentifierType": "packageUrl",
                "identifier": "pkg:npm/left-pad@1.3.0"
            }],
            "verifiedUsing": [{"type": "Hash", "algorithm": "sha256", "hashValue": "AB"}]
        }))
        .unwrap();
        let Spdx30Element::Package(package) = element else {
            panic!("expected a package");
        };
        assert_eq!(package.package_version.as_deref(), Some("1.3.0"));
        assert!(package.external_identifier[0].is_package_url());
        assert_eq!(
            package.verified_using[0].as_hash(),
            Some((ChecksumAlgorithm::Sha256, "AB"))
        );
    }

    #[test]
    fn test_relationship_requires_to() {
        let err = decode_element(json!({
            "type": "Relationship",
            "spdxId": "SPDXRef-Relationship-1",
            "creationInfo": "_:creationinfo",
            "from": "SPDXRef-A",
            "relationshipType": "contains"
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "to"));
    }

    #[test]
    fn test_element_requires_creation_info() {
        let err = decode_element(json!({
            "type": "software_File",
            "spdxId": "SPDXRef-File-1",
            "name": "a.txt"
        }))
        .unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref field, .. } if field == "creationInfo"));
    }

    #[test]
    fn test_type_tag_written_on_serialize() {
        let element = Spdx30Element::Agent(Spdx30Agent {
            kind: AgentKind::Person,
            spdx_id: "SPDXRef-Agent-1".into(),
            creation_info: CREATION_INFO_ID.into(),
            name: "Jane".into(),
        });
        let out = serde_json::to_value(&element).unwrap();
        assert_eq!(out["type"], "Person");
        assert_eq!(out["spdxId"], "SPDXRef-Agent-1");

        let back = decode_element(out).unwrap();
        assert_eq!(back, element);
    }

    #[test]
    fn test_unknown_type_preserved() {
        let raw = json!({
            "type": "security_VexAffectedVulnAssessmentRelationship",
            "spdxId": "SPDXRef-Vex-1",
            "creationInfo": "_:creationinfo"
        });
        let element = decode_element(raw.clone()).unwrap();
        assert_eq!(element, Spdx30Element::Other(raw.clone()));
        assert_eq!(serde_json::to_value(&element).unwrap(), raw);
    }

    #[test]
    fn test_integrity_method_tagging() {
        let method = Spdx30IntegrityMethod::PackageVerificationCode {
            algorithm: ChecksumAlgorithm::Sha1,
            hash_value: "abc".into(),
            excluded_files: Vec::new(),
        };
        let out = serde_json::to_value(&method).unwrap();
        assert_eq!(out, json!({"type": "PackageVerificationCode", "algorithm": "sha1", "hashValue": "abc"}));
        assert!(method.as_hash().is_none());
    }
}
