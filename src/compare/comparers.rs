//! Equality rules for each entity category.
//!
//! Identifiers compare case-sensitively, checksum values case-insensitively,
//! and list-valued fields (checksums, per-file licenses) as multisets.

use super::traits::EntityComparer;
use crate::model::{
    Checksum, ChecksumAlgorithm, RelationshipType, SbomFile, SbomPackage, SbomReference,
    SbomRelationship, ROOT_PACKAGE_ID,
};

/// Checksums as a sorted list of normalized pairs.
fn checksum_multiset(checksums: &[Checksum]) -> Vec<(ChecksumAlgorithm, String)> {
    let mut normalized: Vec<_> = checksums.iter().map(Checksum::normalized).collect();
    normalized.sort_unstable();
    normalized
}

fn sorted(values: &[String]) -> Vec<String> {
    let mut values = values.to_vec();
    values.sort_unstable();
    values
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileComparer;

impl EntityComparer<SbomFile> for FileComparer {
    type Key = (String, String, Vec<(ChecksumAlgorithm, String)>, String, String, Vec<String>);

    fn key(&self, file: &SbomFile) -> Self::Key {
        (
            file.id.clone(),
            file.path.clone(),
            checksum_multiset(&file.checksums),
            file.copyright_text.clone(),
            file.license_concluded.clone(),
            sorted(&file.license_info_in_files),
        )
    }
}

/// Comparable projection of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageKey {
    id: String,
    name: String,
    version: Option<String>,
    package_url: Option<String>,
    download_location: String,
    checksums: Vec<(ChecksumAlgorithm, String)>,
    license_declared: String,
    license_concluded: String,
    supplier: String,
    package_type: Option<String>,
}

/// Package equality with root-package normalization.
///
/// For the root package the purl is cut at its first `=` and checksums are
/// ignored. Name and version still have to match.
/// `files_analyzed` and `depends_on` are never compared.
#[derive(Debug, Clone)]
pub struct PackageComparer {
    pub root_package_id: String,
    pub normalize_root: bool,
}

impl Default for PackageComparer {
    fn default() -> Self {
        Self {
            root_package_id: ROOT_PACKAGE_ID.to_string(),
            normalize_root: true,
        }
    }
}

impl PackageComparer {
    fn is_root(&self, package: &SbomPackage) -> bool {
        self.normalize_root && package.id == self.root_package_id
    }
}

/// Purl up to (not including) its first `=`.
pub fn truncate_root_purl(purl: &str) -> &str {
    purl.split_once('=').map_or(purl, |(head, _)| head)
}

impl EntityComparer<SbomPackage> for PackageComparer {
    type Key = PackageKey;

    fn key(&self, package: &SbomPackage) -> PackageKey {
        let root = self.is_root(package);
        PackageKey {
            id: package.id.clone(),
            name: package.name.clone(),
            version: package.version.clone(),
            package_url: package.package_url.as_deref().map(|purl| {
                if root {
                    truncate_root_purl(purl).to_string()
                } else {
                    purl.to_string()
                }
            }),
            download_location: package.download_location.clone(),
            checksums: if root {
                Vec::new()
            } else {
                checksum_multiset(&package.checksums)
            },
            license_declared: package.license_declared.clone(),
            license_concluded: package.license_concluded.clone(),
            supplier: package.supplier.clone(),
            package_type: package.package_type.clone(),
        }
    }
}

/// Relationships compare in their SPDX 3.0 direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipComparer;

impl EntityComparer<SbomRelationship> for RelationshipComparer {
    type Key = (RelationshipType, String, String);

    fn key(&self, rel: &SbomRelationship) -> Self::Key {
        let (ty, from, to) = rel.relationship_type.canonicalize(&rel.source_id, &rel.target_id);
        (ty, from.to_string(), to.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceComparer;

impl EntityComparer<SbomReference> for ReferenceComparer {
    type Key = (String, String, (ChecksumAlgorithm, String));

    fn key(&self, reference: &SbomReference) -> Self::Key {
        (
            reference.external_id.clone(),
            reference.document_locator.clone(),
            reference.checksum.normalized(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::traits::compare_category_with;

    fn root(purl: &str, checksums: Vec<Checksum>) -> SbomPackage {
        let mut p = SbomPackage::new(ROOT_PACKAGE_ID, "my-app");
        p.version = Some("1.0.0".into());
        p.package_url = Some(purl.into());
        p.checksums = checksums;
        p
    }

    #[test]
    fn test_root_package_normalization() {
        let comparer = PackageComparer::default();
        let a = root(
            "pkg:swid/Microsoft/sbom.microsoft/my-app@1.0.0?tag_id=aaaa",
            vec![Checksum::new(ChecksumAlgorithm::Sha1, "ff")],
        );
        let b = root("pkg:swid/Microsoft/sbom.microsoft/my-app@1.0.0?tag_id=bbbb", Vec::new());
        assert_eq!(comparer.key(&a), comparer.key(&b));
    }

    #[test]
    fn test_root_package_name_still_compared() {
        let comparer = PackageComparer::default();
        let a = root("pkg:x/y?tag_id=1", Vec::new());
        let mut b = a.clone();
        b.version = Some("2.0.0".into());
        assert_ne!(comparer.key(&a), comparer.key(&b));
    }

    #[test]
    fn test_normalization_only_for_root_id() {
        let comparer = PackageComparer::default();
        let mut a = root("pkg:x/y?tag_id=1", Vec::new());
        let mut b = root("pkg:x/y?tag_id=2", Vec::new());
        a.id = "SPDXRef-Other".into();
        b.id = "SPDXRef-Other".into();
        assert_ne!(comparer.key(&a), comparer.key(&b));

        let disabled = PackageComparer {
            normalize_root: false,
            ..PackageComparer::default()
        };
        let a = root("pkg:x/y?tag_id=1", Vec::new());
        let b = root("pkg:x/y?tag_id=2", Vec::new());
        assert_ne!(disabled.key(&a), disabled.key(&b));
    }

    #[test]
    fn test_files_analyzed_ignored() {
        let comparer = PackageComparer::default();
        let mut a = SbomPackage::new("SPDXRef-P", "p");
        let mut b = a.clone();
        a.files_analyzed = true;
        b.files_analyzed = false;
        assert_eq!(comparer.key(&a), comparer.key(&b));
    }

    #[test]
    fn test_checksum_case_and_order_insensitive() {
        let file = |checksums: Vec<Checksum>| SbomFile {
            id: "SPDXRef-F".into(),
            path: "a".into(),
            checksums,
            copyright_text: "NOASSERTION".into(),
            license_concluded: "NOASSERTION".into(),
            license_info_in_files: vec!["MIT".into(), "BSD-3-Clause".into()],
        };
        let a = file(vec![
            Checksum::new(ChecksumAlgorithm::Sha1, "AB"),
            Checksum::new(ChecksumAlgorithm::Sha256, "CD"),
        ]);
        let mut b = file(vec![
            Checksum::new(ChecksumAlgorithm::Sha256, "cd"),
            Checksum::new(ChecksumAlgorithm::Sha1, "ab"),
        ]);
        b.license_info_in_files.reverse();
        assert_eq!(FileComparer.key(&a), FileComparer.key(&b));
    }

    #[test]
    fn test_relationship_direction_swap() {
        let pairs = [
            (RelationshipType::PrerequisiteFor, RelationshipType::HasPrerequisite),
            (RelationshipType::DescribedBy, RelationshipType::Describes),
            (RelationshipType::PatchFor, RelationshipType::PatchedBy),
        ];
        for (v22, v30) in pairs {
            let left = vec![SbomRelationship::new("A", v22, "B")];
            let right = vec![SbomRelationship::new("B", v30, "A")];
            assert!(
                compare_category_with(&RelationshipComparer, &left, &right).is_equal(),
                "{v22} vs {v30}"
            );
        }
    }

    #[test]
    fn test_relationship_identifiers_case_sensitive() {
        let left = vec![SbomRelationship::new("SPDXRef-a", RelationshipType::Contains, "B")];
        let right = vec![SbomRelationship::new("SPDXRef-A", RelationshipType::Contains, "B")];
        assert!(!compare_category_with(&RelationshipComparer, &left, &right).is_equal());
    }

    #[test]
    fn test_truncate_root_purl() {
        assert_eq!(truncate_root_purl("pkg:a/b?x=1=2"), "pkg:a/b?x");
        assert_eq!(truncate_root_purl("pkg:a/b"), "pkg:a/b");
    }
}
