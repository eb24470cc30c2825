//! Version-neutral entities that both SPDX versions are normalized to.
//!
//! Enumerations that exist on the wire in more than one spelling carry an
//! explicit mapping table rather than relying on casing conventions. Each
//! table row holds the variant, its SPDX 2.2 spelling and its SPDX 3.0
//! spelling; `None` marks a spelling that does not exist in that version.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Sentinel for values the document author chose not to assert.
pub const NOASSERTION: &str = "NOASSERTION";

/// Well-known id of the synthetic root package.
pub const ROOT_PACKAGE_ID: &str = "SPDXRef-RootPackage";

// ============================================================================
// Checksums
// ============================================================================

/// Hash algorithm of a checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2b256,
    Blake2b384,
    Blake2b512,
    Blake3,
    Md2,
    Md4,
    Md5,
    Md6,
    Adler32,
}

const CHECKSUM_ALGORITHMS: &[(ChecksumAlgorithm, &str, &str)] = &[
    (ChecksumAlgorithm::Sha1, "SHA1", "sha1"),
    (ChecksumAlgorithm::Sha224, "SHA224", "sha224"),
    (ChecksumAlgorithm::Sha256, "SHA256", "sha256"),
    (ChecksumAlgorithm::Sha384, "SHA384", "sha384"),
    (ChecksumAlgorithm::Sha512, "SHA512", "sha512"),
    (ChecksumAlgorithm::Sha3_256, "SHA3-256", "sha3_256"),
    (ChecksumAlgorithm::Sha3_384, "SHA3-384", "sha3_384"),
    (ChecksumAlgorithm::Sha3_512, "SHA3-512", "sha3_512"),
    (ChecksumAlgorithm::Blake2b256, "BLAKE2b-256", "blake2b256"),
    (ChecksumAlgorithm::Blake2b384, "BLAKE2b-384", "blake2b384"),
    (ChecksumAlgorithm::Blake2b512, "BLAKE2b-512", "blake2b512"),
    (ChecksumAlgorithm::Blake3, "BLAKE3", "blake3"),
    (ChecksumAlgorithm::Md2, "MD2", "md2"),
    (ChecksumAlgorithm::Md4, "MD4", "md4"),
    (ChecksumAlgorithm::Md5, "MD5", "md5"),
    (ChecksumAlgorithm::Md6, "MD6", "md6"),
    (ChecksumAlgorithm::Adler32, "ADLER32", "adler32"),
];

impl ChecksumAlgorithm {
    fn row(self) -> &'static (Self, &'static str, &'static str) {
        CHECKSUM_ALGORITHMS
            .iter()
            .find(|row| row.0 == self)
            .unwrap_or(&CHECKSUM_ALGORITHMS[0])
    }

    /// SPDX 2.2 spelling, e.g. `SHA3-256`.
    #[must_use]
    pub fn spdx22_name(self) -> &'static str {
        self.row().1
    }

    /// SPDX 3.0 spelling, e.g. `sha3_256`.
    #[must_use]
    pub fn spdx30_name(self) -> &'static str {
        self.row().2
    }

    /// Look up a 2.2 spelling (case-insensitive).
    pub fn from_spdx22(name: &str) -> Option<Self> {
        CHECKSUM_ALGORITHMS
            .iter()
            .find(|row| row.1.eq_ignore_ascii_case(name))
            .map(|row| row.0)
    }

    /// Look up a 3.0 spelling (case-insensitive).
    pub fn from_spdx30(name: &str) -> Option<Self> {
        CHECKSUM_ALGORITHMS
            .iter()
            .find(|row| row.2.eq_ignore_ascii_case(name))
            .map(|row| row.0)
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spdx22_name())
    }
}

impl Serialize for ChecksumAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.spdx22_name())
    }
}

/// A content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    pub value: String,
}

impl Checksum {
    pub fn new(algorithm: ChecksumAlgorithm, value: impl Into<String>) -> Self {
        Self {
            algorithm,
            value: value.into(),
        }
    }

    /// Comparable form; hash values compare case-insensitively.
    #[must_use]
    pub fn normalized(&self) -> (ChecksumAlgorithm, String) {
        (self.algorithm, self.value.to_ascii_lowercase())
    }
}

// ============================================================================
// Relationship types
// ============================================================================

/// Type of a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipType {
    Contains,
    DependsOn,
    Describes,
    DescribedBy,
    PrerequisiteFor,
    HasPrerequisite,
    PatchFor,
    PatchedBy,
    HasDeclaredLicense,
    HasConcludedLicense,
    Other,
}

const RELATIONSHIP_TYPES: &[(RelationshipType, &str, Option<&str>, Option<&str>)] = &[
    (RelationshipType::Contains, "CONTAINS", Some("CONTAINS"), Some("contains")),
    (RelationshipType::DependsOn, "DEPENDS_ON", Some("DEPENDS_ON"), Some("dependsOn")),
    (RelationshipType::Describes, "DESCRIBES", Some("DESCRIBES"), Some("describes")),
    (RelationshipType::DescribedBy, "DESCRIBED_BY", Some("DESCRIBED_BY"), None),
    (RelationshipType::PrerequisiteFor, "PREREQUISITE_FOR", Some("PREREQUISITE_FOR"), None),
    (RelationshipType::HasPrerequisite, "HAS_PREREQUISITE", Some("HAS_PREREQUISITE"), Some("hasPrerequisite")),
    (RelationshipType::PatchFor, "PATCH_FOR", Some("PATCH_FOR"), None),
    (RelationshipType::PatchedBy, "PATCHED_BY", None, Some("patchedBy")),
    (RelationshipType::HasDeclaredLicense, "HAS_DECLARED_LICENSE", None, Some("hasDeclaredLicense")),
    (RelationshipType::HasConcludedLicense, "HAS_CONCLUDED_LICENSE", None, Some("hasConcludedLicense")),
    (RelationshipType::Other, "OTHER", Some("OTHER"), Some("other")),
];

impl RelationshipType {
    fn row(self) -> &'static (Self, &'static str, Option<&'static str>, Option<&'static str>) {
        RELATIONSHIP_TYPES
            .iter()
            .find(|row| row.0 == self)
            .unwrap_or(&RELATIONSHIP_TYPES[RELATIONSHIP_TYPES.len() - 1])
    }

    /// Version-neutral upper snake case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.row().1
    }

    /// SPDX 2.2 spelling, if the type exists in 2.2.
    #[must_use]
    pub fn spdx22_name(self) -> Option<&'static str> {
        self.row().2
    }

    /// SPDX 3.0 spelling, if the type exists in 3.0.
    #[must_use]
    pub fn spdx30_name(self) -> Option<&'static str> {
        self.row().3
    }

    /// Look up a 2.2 spelling.
    pub fn from_spdx22(name: &str) -> Option<Self> {
        RELATIONSHIP_TYPES
            .iter()
            .find(|row| row.2 == Some(name))
            .map(|row| row.0)
    }

    /// Look up a 3.0 spelling.
    pub fn from_spdx30(name: &str) -> Option<Self> {
        RELATIONSHIP_TYPES
            .iter()
            .find(|row| row.3 == Some(name))
            .map(|row| row.0)
    }

    /// Whether this type attaches a license rather than relating elements.
    #[must_use]
    pub const fn is_license(self) -> bool {
        matches!(self, Self::HasDeclaredLicense | Self::HasConcludedLicense)
    }

    /// Rewrite an edge into its SPDX 3.0 form.
    ///
    /// `PREREQUISITE_FOR(a, b)` becomes `HAS_PREREQUISITE(b, a)`,
    /// `DESCRIBED_BY(a, b)` becomes `DESCRIBES(b, a)` and
    /// `PATCH_FOR(a, b)` becomes `PATCHED_BY(b, a)`. Every other type is
    /// returned unchanged.
    #[must_use]
    pub fn canonicalize<'a>(self, from: &'a str, to: &'a str) -> (Self, &'a str, &'a str) {
        match self {
            Self::PrerequisiteFor => (Self::HasPrerequisite, to, from),
            Self::DescribedBy => (Self::Describes, to, from),
            Self::PatchFor => (Self::PatchedBy, to, from),
            other => (other, from, to),
        }
    }

    /// Rewrite an edge into a form SPDX 2.2 can express.
    ///
    /// Returns `None` for license edges, which 2.2 records as fields.
    #[must_use]
    pub fn to_spdx22_form<'a>(self, from: &'a str, to: &'a str) -> Option<(Self, &'a str, &'a str)> {
        match self {
            Self::PatchedBy => Some((Self::PatchFor, to, from)),
            t if t.is_license() => None,
            other => Some((other, from, to)),
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationshipType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// External reference categories
// ============================================================================

/// Category of an SPDX 2.2 package external reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceCategory {
    Security,
    PackageManager,
    PersistentId,
    Other,
}

/// Canonical spelling first; later rows are accepted aliases.
const REFERENCE_CATEGORIES: &[(ReferenceCategory, &str)] = &[
    (ReferenceCategory::Security, "SECURITY"),
    (ReferenceCategory::PackageManager, "PACKAGE-MANAGER"),
    (ReferenceCategory::PersistentId, "PERSISTENT-ID"),
    (ReferenceCategory::Other, "OTHER"),
    (ReferenceCategory::PackageManager, "PACKAGE_MANAGER"),
    (ReferenceCategory::PersistentId, "PERSISTENT_ID"),
];

impl ReferenceCategory {
    /// Wire spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        REFERENCE_CATEGORIES
            .iter()
            .find(|row| row.0 == self)
            .map_or("OTHER", |row| row.1)
    }

    /// Look up a wire spelling, accepting underscore aliases.
    pub fn parse(name: &str) -> Option<Self> {
        REFERENCE_CATEGORIES
            .iter()
            .find(|row| row.1.eq_ignore_ascii_case(name))
            .map(|row| row.0)
    }
}

impl fmt::Display for ReferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A file described by the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SbomFile {
    pub id: String,
    /// Relative, forward-slash path
    pub path: String,
    pub checksums: Vec<Checksum>,
    pub copyright_text: String,
    pub license_concluded: String,
    pub license_info_in_files: Vec<String>,
}

/// A package described by the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SbomPackage {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
    pub package_url: Option<String>,
    pub download_location: String,
    pub checksums: Vec<Checksum>,
    pub license_declared: String,
    pub license_concluded: String,
    pub supplier: String,
    /// Package-manager family, e.g. `npm`
    pub package_type: Option<String>,
    /// Not compared; only 2.2 carries it
    pub files_analyzed: bool,
    /// Target of the first `DEPENDS_ON` edge. Derived from relationships
    /// and not compared on its own.
    pub depends_on: Option<String>,
}

impl SbomPackage {
    /// A package with the given id and name and every other field unset.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: None,
            package_url: None,
            download_location: NOASSERTION.to_string(),
            checksums: Vec::new(),
            license_declared: NOASSERTION.to_string(),
            license_concluded: NOASSERTION.to_string(),
            supplier: NOASSERTION.to_string(),
            package_type: None,
            files_analyzed: false,
            depends_on: None,
        }
    }
}

/// A directed edge between two elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SbomRelationship {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
}

impl SbomRelationship {
    pub fn new(
        source_id: impl Into<String>,
        relationship_type: RelationshipType,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type,
        }
    }
}

/// A reference to an external SBOM document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SbomReference {
    pub external_id: String,
    pub document_locator: String,
    pub checksum: Checksum,
}

/// License id to license text, for licenses defined inside a document.
///
/// Immutable once built. Converters fill it from parsed documents and
/// generators read it to emit extracted or custom licenses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LicenseTextLookup {
    texts: IndexMap<String, String>,
}

impl LicenseTextLookup {
    pub fn new(texts: IndexMap<String, String>) -> Self {
        Self { texts }
    }

    pub fn get(&self, license_id: &str) -> Option<&str> {
        self.texts.get(license_id).map(String::as_str)
    }

    pub fn contains(&self, license_id: &str) -> bool {
        self.texts.contains_key(license_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.texts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl FromIterator<(String, String)> for LicenseTextLookup {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            texts: iter.into_iter().collect(),
        }
    }
}

/// Everything a document says, in common form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SbomEntities {
    pub files: Vec<SbomFile>,
    pub packages: Vec<SbomPackage>,
    pub relationships: Vec<SbomRelationship>,
    pub references: Vec<SbomReference>,
    /// Carried along for regeneration, never compared
    #[serde(skip)]
    pub license_texts: LicenseTextLookup,
}

impl SbomEntities {
    /// Total number of compared entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.files.len() + self.packages.len() + self.relationships.len() + self.references.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_algorithm_table() {
        assert_eq!(ChecksumAlgorithm::from_spdx22("SHA3-256"), Some(ChecksumAlgorithm::Sha3_256));
        assert_eq!(ChecksumAlgorithm::from_spdx30("sha3_256"), Some(ChecksumAlgorithm::Sha3_256));
        assert_eq!(ChecksumAlgorithm::from_spdx22("sha1"), Some(ChecksumAlgorithm::Sha1));
        assert_eq!(ChecksumAlgorithm::Blake2b256.spdx22_name(), "BLAKE2b-256");
        assert_eq!(ChecksumAlgorithm::Blake2b256.spdx30_name(), "blake2b256");
        assert_eq!(ChecksumAlgorithm::from_spdx30("crc32"), None);
        // Every variant has a row and both spellings map back.
        for (algorithm, v22, v30) in CHECKSUM_ALGORITHMS {
            assert_eq!(ChecksumAlgorithm::from_spdx22(v22), Some(*algorithm));
            assert_eq!(ChecksumAlgorithm::from_spdx30(v30), Some(*algorithm));
        }
    }

    #[test]
    fn test_relationship_type_table() {
        assert_eq!(RelationshipType::from_spdx22("DEPENDS_ON"), Some(RelationshipType::DependsOn));
        assert_eq!(RelationshipType::from_spdx30("dependsOn"), Some(RelationshipType::DependsOn));
        assert_eq!(RelationshipType::from_spdx30("describedBy"), None);
        assert_eq!(RelationshipType::from_spdx22("PATCHED_BY"), None);
        assert_eq!(RelationshipType::HasDeclaredLicense.spdx22_name(), None);
        assert_eq!(RelationshipType::PatchedBy.spdx30_name(), Some("patchedBy"));
    }

    #[test]
    fn test_canonicalize_swaps_direction() {
        assert_eq!(
            RelationshipType::PrerequisiteFor.canonicalize("A", "B"),
            (RelationshipType::HasPrerequisite, "B", "A")
        );
        assert_eq!(
            RelationshipType::DescribedBy.canonicalize("A", "B"),
            (RelationshipType::Describes, "B", "A")
        );
        assert_eq!(
            RelationshipType::PatchFor.canonicalize("A", "B"),
            (RelationshipType::PatchedBy, "B", "A")
        );
        assert_eq!(
            RelationshipType::Contains.canonicalize("A", "B"),
            (RelationshipType::Contains, "A", "B")
        );
    }

    #[test]
    fn test_canonical_forms_exist_in_spdx30() {
        for (ty, ..) in RELATIONSHIP_TYPES {
            let (canonical, _, _) = ty.canonicalize("a", "b");
            assert!(canonical.spdx30_name().is_some(), "{ty} has no 3.0 form");
        }
    }

    #[test]
    fn test_spdx22_form() {
        assert_eq!(
            RelationshipType::PatchedBy.to_spdx22_form("A", "B"),
            Some((RelationshipType::PatchFor, "B", "A"))
        );
        assert_eq!(RelationshipType::HasConcludedLicense.to_spdx22_form("A", "B"), None);
        for (ty, ..) in RELATIONSHIP_TYPES {
            if let Some((form, _, _)) = ty.to_spdx22_form("a", "b") {
                assert!(form.spdx22_name().is_some(), "{ty} has no 2.2 form");
            }
        }
    }

    #[test]
    fn test_reference_category_aliases() {
        assert_eq!(ReferenceCategory::parse("PACKAGE-MANAGER"), Some(ReferenceCategory::PackageManager));
        assert_eq!(ReferenceCategory::parse("PACKAGE_MANAGER"), Some(ReferenceCategory::PackageManager));
        assert_eq!(ReferenceCategory::parse("package-manager"), Some(ReferenceCategory::PackageManager));
        assert_eq!(ReferenceCategory::PackageManager.as_str(), "PACKAGE-MANAGER");
        assert_eq!(ReferenceCategory::PersistentId.as_str(), "PERSISTENT-ID");
        assert_eq!(ReferenceCategory::parse("BOGUS"), None);
    }

    #[test]
    fn test_checksum_normalized_ignores_case() {
        let a = Checksum::new(ChecksumAlgorithm::Sha1, "ABCDEF");
        let b = Checksum::new(ChecksumAlgorithm::Sha1, "abcdef");
        assert_eq!(a.normalized(), b.normalized());
    }

    #[test]
    fn test_license_lookup() {
        let lookup: LicenseTextLookup = [("LicenseRef-1".to_string(), "text".to_string())]
            .into_iter()
            .collect();
        assert_eq!(lookup.get("LicenseRef-1"), Some("text"));
        assert!(!lookup.contains("MIT"));
        assert_eq!(lookup.len(), 1);
    }
}
