//! SPDX 2.2 records to and from common entities.

use super::{
    asserted_licenses, fill_depends_on, license_refs, normalize_path, or_noassertion, purl_type,
};
use crate::model::spdx22::{
    Spdx22Checksum, Spdx22Document, Spdx22ExternalDocumentRef, Spdx22ExternalRef,
    Spdx22ExtractedLicensingInfo, Spdx22File, Spdx22Header, Spdx22Package, Spdx22Relationship,
};
use crate::model::{
    ensure_file_id, ensure_package_id, Checksum, IdentifierError, LicenseTextLookup,
    ReferenceCategory, SbomEntities, SbomFile, SbomPackage, SbomReference, SbomRelationship,
    NOASSERTION,
};
use indexmap::IndexSet;

// ============================================================================
// Native to common
// ============================================================================

fn checksum_to_common(checksum: &Spdx22Checksum) -> Checksum {
    Checksum::new(checksum.algorithm, checksum.checksum_value.clone())
}

pub fn file_to_common(file: &Spdx22File) -> SbomFile {
    SbomFile {
        id: file.spdx_id.clone(),
        path: normalize_path(&file.file_name),
        checksums: file.checksums.iter().map(checksum_to_common).collect(),
        copyright_text: or_noassertion(file.copyright_text.as_deref()),
        license_concluded: or_noassertion(file.license_concluded.as_deref()),
        license_info_in_files: asserted_licenses(file.license_info_in_files.iter().map(String::as_str)),
    }
}

/// Locator of the first `PACKAGE-MANAGER` external reference.
pub fn package_url(package: &Spdx22Package) -> Option<&str> {
    package
        .external_refs
        .iter()
        .find(|r| r.reference_category == ReferenceCategory::PackageManager)
        .map(|r| r.reference_locator.as_str())
}

pub fn package_to_common(package: &Spdx22Package) -> SbomPackage {
    let package_url = package_url(package).map(str::to_string);
    SbomPackage {
        id: package.spdx_id.clone(),
        name: package.name.clone(),
        version: package.version_info.clone(),
        package_type: package_url.as_deref().and_then(purl_type),
        package_url,
        download_location: or_noassertion(package.download_location.as_deref()),
        checksums: package.checksums.iter().map(checksum_to_common).collect(),
        license_declared: or_noassertion(package.license_declared.as_deref()),
        license_concluded: or_noassertion(package.license_concluded.as_deref()),
        supplier: or_noassertion(package.supplier.as_deref()),
        files_analyzed: package.files_analyzed.unwrap_or(true),
        depends_on: None,
    }
}

/// Relationships are kept in their 2.2 direction; the comparator
/// canonicalizes them.
pub fn relationship_to_common(relationship: &Spdx22Relationship) -> SbomRelationship {
    SbomRelationship::new(
        relationship.spdx_element_id.clone(),
        relationship.relationship_type,
        relationship.related_spdx_element.clone(),
    )
}

pub fn reference_to_common(reference: &Spdx22ExternalDocumentRef) -> SbomReference {
    SbomReference {
        external_id: reference.external_document_id.clone(),
        document_locator: reference.spdx_document.clone(),
        checksum: checksum_to_common(&reference.checksum),
    }
}

/// License texts defined by `hasExtractedLicensingInfos`.
pub fn license_texts(infos: &[Spdx22ExtractedLicensingInfo]) -> LicenseTextLookup {
    infos
        .iter()
        .map(|info| (info.license_id.clone(), info.extracted_text.clone()))
        .collect()
}

/// Convert a whole document.
pub fn to_entities(document: &Spdx22Document) -> SbomEntities {
    let mut entities = SbomEntities {
        files: document.files.iter().map(file_to_common).collect(),
        packages: document.packages.iter().map(package_to_common).collect(),
        relationships: document.relationships.iter().map(relationship_to_common).collect(),
        references: document.external_document_refs.iter().map(reference_to_common).collect(),
        license_texts: license_texts(&document.has_extracted_licensing_infos),
    };
    fill_depends_on(&mut entities);
    entities
}

// ============================================================================
// Common to native
// ============================================================================

fn checksum_from_common(checksum: &Checksum) -> Spdx22Checksum {
    Spdx22Checksum {
        algorithm: checksum.algorithm,
        checksum_value: checksum.value.clone(),
    }
}

/// `None` for values equal to `NOASSERTION`, which 2.2 lets us omit.
fn asserted(value: &str) -> Option<String> {
    (value != NOASSERTION).then(|| value.to_string())
}

pub fn file_from_common(file: &SbomFile) -> Result<Spdx22File, IdentifierError> {
    Ok(Spdx22File {
        spdx_id: ensure_file_id(file)?,
        file_name: format!("./{}", normalize_path(&file.path)),
        checksums: file.checksums.iter().map(checksum_from_common).collect(),
        license_concluded: Some(file.license_concluded.clone()),
        license_info_in_files: if file.license_info_in_files.is_empty() {
            vec![NOASSERTION.to_string()]
        } else {
            file.license_info_in_files.clone()
        },
        copyright_text: Some(file.copyright_text.clone()),
    })
}

pub fn package_from_common(package: &SbomPackage) -> Spdx22Package {
    let external_refs = package
        .package_url
        .iter()
        .map(|purl| Spdx22ExternalRef {
            reference_category: ReferenceCategory::PackageManager,
            reference_type: "purl".to_string(),
            reference_locator: purl.clone(),
        })
        .collect();
    Spdx22Package {
        spdx_id: ensure_package_id(package),
        name: package.name.clone(),
        version_info: package.version.clone(),
        download_location: Some(package.download_location.clone()),
        files_analyzed: Some(package.files_analyzed),
        checksums: package.checksums.iter().map(checksum_from_common).collect(),
        license_concluded: Some(package.license_concluded.clone()),
        license_declared: Some(package.license_declared.clone()),
        license_info_from_files: Vec::new(),
        copyright_text: None,
        supplier: asserted(&package.supplier),
        external_refs,
        package_verification_code: None,
        has_files: Vec::new(),
    }
}

/// `None` for license edges, which 2.2 expresses as fields.
pub fn relationship_from_common(relationship: &SbomRelationship) -> Option<Spdx22Relationship> {
    let (relationship_type, from, to) = relationship
        .relationship_type
        .to_spdx22_form(&relationship.source_id, &relationship.target_id)?;
    Some(Spdx22Relationship {
        spdx_element_id: from.to_string(),
        relationship_type,
        related_spdx_element: to.to_string(),
        comment: None,
    })
}

pub fn reference_from_common(reference: &SbomReference) -> Spdx22ExternalDocumentRef {
    Spdx22ExternalDocumentRef {
        external_document_id: reference.external_id.clone(),
        spdx_document: reference.document_locator.clone(),
        checksum: checksum_from_common(&reference.checksum),
    }
}

/// Extracted licensing infos for every `LicenseRef-*` the entities use and
/// `lookup` has text for, in first-use order.
pub fn extracted_licenses(
    entities: &SbomEntities,
    lookup: &LicenseTextLookup,
) -> Vec<Spdx22ExtractedLicensingInfo> {
    let file_licenses = entities.files.iter().flat_map(|f| {
        std::iter::once(f.license_concluded.as_str())
            .chain(f.license_info_in_files.iter().map(String::as_str))
    });
    let package_licenses = entities
        .packages
        .iter()
        .flat_map(|p| [p.license_declared.as_str(), p.license_concluded.as_str()]);

    let used: IndexSet<&str> = file_licenses
        .chain(package_licenses)
        .flat_map(license_refs)
        .collect();

    used.into_iter()
        .filter_map(|id| {
            lookup.get(id).map(|text| Spdx22ExtractedLicensingInfo {
                license_id: id.to_string(),
                extracted_text: text.to_string(),
                name: None,
            })
        })
        .collect()
}

/// Build a complete in-memory document.
pub fn from_entities(
    entities: &SbomEntities,
    header: Spdx22Header,
    lookup: &LicenseTextLookup,
) -> Result<Spdx22Document, IdentifierError> {
    Ok(Spdx22Document {
        spdx_version: header.spdx_version,
        data_license: header.data_license,
        spdx_id: header.spdx_id,
        name: header.name,
        document_namespace: header.document_namespace,
        creation_info: header.creation_info,
        document_describes: header.document_describes,
        files: entities
            .files
            .iter()
            .map(file_from_common)
            .collect::<Result<_, _>>()?,
        packages: entities.packages.iter().map(package_from_common).collect(),
        relationships: entities
            .relationships
            .iter()
            .filter_map(relationship_from_common)
            .collect(),
        external_document_refs: entities.references.iter().map(reference_from_common).collect(),
        has_extracted_licensing_infos: extracted_licenses(entities, lookup),
        extra: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChecksumAlgorithm, RelationshipType};

    fn package() -> Spdx22Package {
        Spdx22Package {
            spdx_id: "SPDXRef-Package-1".into(),
            name: "left-pad".into(),
            version_info: Some("1.3.0".into()),
            download_location: None,
            files_analyzed: Some(false),
            checksums: vec![Spdx22Checksum {
                algorithm: ChecksumAlgorithm::Sha256,
                checksum_value: "AA".into(),
            }],
            license_concluded: Some("MIT".into()),
            license_declared: None,
            license_info_from_files: Vec::new(),
            copyright_text: None,
            supplier: Some("Organization: ACME".into()),
            external_refs: vec![
                Spdx22ExternalRef {
                    reference_category: ReferenceCategory::Security,
                    reference_type: "cpe23Type".into(),
                    reference_locator: "cpe:2.3:a:acme:left-pad".into(),
                },
                Spdx22ExternalRef {
                    reference_category: ReferenceCategory::PackageManager,
                    reference_type: "purl".into(),
                    reference_locator: "pkg:npm/left-pad@1.3.0".into(),
                },
            ],
            package_verification_code: None,
            has_files: Vec::new(),
        }
    }

    #[test]
    fn test_package_to_common() {
        let common = package_to_common(&package());
        assert_eq!(common.package_url.as_deref(), Some("pkg:npm/left-pad@1.3.0"));
        assert_eq!(common.package_type.as_deref(), Some("npm"));
        assert_eq!(common.download_location, NOASSERTION);
        assert_eq!(common.license_declared, NOASSERTION);
        assert_eq!(common.supplier, "Organization: ACME");
        assert!(!common.files_analyzed);
        // Conversion is pure.
        assert_eq!(common, package_to_common(&package()));
    }

    #[test]
    fn test_file_to_common_normalizes() {
        let file = Spdx22File {
            spdx_id: "SPDXRef-File-a".into(),
            file_name: "./lib/a.js".into(),
            checksums: Vec::new(),
            license_concluded: None,
            license_info_in_files: vec!["NOASSERTION".into()],
            copyright_text: Some("NOASSERTION".into()),
        };
        let common = file_to_common(&file);
        assert_eq!(common.path, "lib/a.js");
        assert_eq!(common.license_concluded, NOASSERTION);
        assert!(common.license_info_in_files.is_empty());
    }

    #[test]
    fn test_relationship_round_trip_keeps_direction() {
        let native = Spdx22Relationship {
            spdx_element_id: "SPDXRef-A".into(),
            relationship_type: RelationshipType::PrerequisiteFor,
            related_spdx_element: "SPDXRef-B".into(),
            comment: None,
        };
        let common = relationship_to_common(&native);
        assert_eq!(common.source_id, "SPDXRef-A");
        assert_eq!(relationship_from_common(&common), Some(native));
    }

    #[test]
    fn test_patched_by_written_as_patch_for() {
        let common = SbomRelationship::new("SPDXRef-B", RelationshipType::PatchedBy, "SPDXRef-A");
        let native = relationship_from_common(&common).unwrap();
        assert_eq!(native.relationship_type, RelationshipType::PatchFor);
        assert_eq!(native.spdx_element_id, "SPDXRef-A");
        assert_eq!(native.related_spdx_element, "SPDXRef-B");
    }

    #[test]
    fn test_extracted_licenses_only_for_used_refs() {
        let mut entities = SbomEntities::default();
        let mut p = SbomPackage::new("SPDXRef-P", "p");
        p.license_declared = "MIT AND LicenseRef-Custom".into();
        entities.packages.push(p);
        let lookup: LicenseTextLookup = [
            ("LicenseRef-Custom".to_string(), "custom text".to_string()),
            ("LicenseRef-Unused".to_string(), "unused".to_string()),
        ]
        .into_iter()
        .collect();

        let infos = extracted_licenses(&entities, &lookup);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].license_id, "LicenseRef-Custom");
        assert_eq!(infos[0].extracted_text, "custom text");
    }

    #[test]
    fn test_file_from_common_without_sha1_fails() {
        let file = SbomFile {
            id: String::new(),
            path: "a.txt".into(),
            checksums: vec![Checksum::new(ChecksumAlgorithm::Sha256, "aa")],
            copyright_text: NOASSERTION.into(),
            license_concluded: NOASSERTION.into(),
            license_info_in_files: Vec::new(),
        };
        assert!(matches!(
            file_from_common(&file),
            Err(IdentifierError::MissingHashValue { .. })
        ));
    }
}
