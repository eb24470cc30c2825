//! Deterministic SPDX identifiers.
//!
//! Generated ids depend only on the entity's own content so that
//! regenerating a document from the same input yields the same ids.
//!
//! - Files: `SPDXRef-File-<path>-<SHA1>`; a SHA1 checksum is mandatory.
//! - Packages: `SPDXRef-Package-<SHA-256 of "name:version">`.
//! - Graph-only elements (licenses, agents, relationships) hash their
//!   defining content the same way.

use super::entities::{ChecksumAlgorithm, RelationshipType, SbomFile, SbomPackage};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised while generating identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("missing {algorithm} hash value for {subject}")]
    MissingHashValue {
        algorithm: ChecksumAlgorithm,
        subject: String,
    },
}

/// Upper-case hex SHA-256 of `input`.
fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:X}", hasher.finalize())
}

/// Replace every character outside `[A-Za-z0-9.-]` with `-`.
pub fn sanitize_spdx_id(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Id for a file, derived from its path and SHA1 checksum.
pub fn generate_file_id(path: &str, checksums: &[super::Checksum]) -> Result<String, IdentifierError> {
    let sha1 = checksums
        .iter()
        .find(|c| c.algorithm == ChecksumAlgorithm::Sha1)
        .ok_or_else(|| IdentifierError::MissingHashValue {
            algorithm: ChecksumAlgorithm::Sha1,
            subject: format!("file '{path}'"),
        })?;
    let path = path.strip_prefix("./").unwrap_or(path);
    Ok(format!(
        "SPDXRef-File-{}-{}",
        sanitize_spdx_id(path),
        sha1.value.to_ascii_uppercase()
    ))
}

/// Id for a package, derived from its name and version.
pub fn generate_package_id(name: &str, version: Option<&str>) -> String {
    let identity = format!("{}:{}", name, version.unwrap_or_default());
    format!("SPDXRef-Package-{}", sha256_hex(&identity))
}

/// The file's own id, or a generated one when it has none.
pub fn ensure_file_id(file: &SbomFile) -> Result<String, IdentifierError> {
    if file.id.is_empty() {
        generate_file_id(&file.path, &file.checksums)
    } else {
        Ok(file.id.clone())
    }
}

/// The package's own id, or a generated one when it has none.
pub fn ensure_package_id(package: &SbomPackage) -> String {
    if package.id.is_empty() {
        generate_package_id(&package.name, package.version.as_deref())
    } else {
        package.id.clone()
    }
}

/// Id for the license element standing for `license`.
pub fn license_element_id(license: &str) -> String {
    format!("SPDXRef-License-{}", sha256_hex(license))
}

/// Id for an agent (supplier or creator) element.
pub fn agent_element_id(kind: &str, name: &str) -> String {
    format!("SPDXRef-Agent-{}", sha256_hex(&format!("{kind}:{name}")))
}

/// Id for a relationship element.
pub fn relationship_element_id(from: &str, relationship_type: RelationshipType, to: &str) -> String {
    format!(
        "SPDXRef-Relationship-{}",
        sha256_hex(&format!("{from}-{relationship_type}-{to}"))
    )
}

/// Id for the external map element of an external document reference.
pub fn external_map_element_id(external_id: &str) -> String {
    format!("SPDXRef-ExternalMap-{}", sanitize_spdx_id(external_id))
}
