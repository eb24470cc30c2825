//! Semantic equality of two SBOM documents.
//!
//! Documents are compared per category in a fixed order: external
//! references, relationships, files, packages. [`SbomComparator::compare`]
//! stops at the first category that differs; [`SbomComparator::diff`]
//! evaluates all of them for reporting.
//!
//! A mismatch is a normal result, never an error.

mod comparers;
mod result;
mod traits;

pub use comparers::{
    truncate_root_purl, FileComparer, PackageComparer, PackageKey, ReferenceComparer,
    RelationshipComparer,
};
pub use result::{CategoryOutcome, ComparisonResult, EntityCategory};
pub use traits::{compare_category_with, diff_category_with, EntityComparer};

use crate::config::ComparisonConfig;
use crate::model::{SbomEntities, SbomPackage};

/// Compares two documents' common entities.
///
/// The package comparer can be swapped out, which is how tests observe
/// which comparisons actually ran.
#[derive(Debug, Clone)]
pub struct SbomComparator<P = PackageComparer> {
    files: FileComparer,
    packages: P,
    relationships: RelationshipComparer,
    references: ReferenceComparer,
}

impl Default for SbomComparator {
    fn default() -> Self {
        Self::new(&ComparisonConfig::default())
    }
}

impl SbomComparator {
    pub fn new(config: &ComparisonConfig) -> Self {
        Self {
            files: FileComparer,
            packages: PackageComparer {
                root_package_id: config.root_package_id.clone(),
                normalize_root: config.normalize_root_package,
            },
            relationships: RelationshipComparer,
            references: ReferenceComparer,
        }
    }
}

impl<P: EntityComparer<SbomPackage>> SbomComparator<P> {
    /// Replace the package comparer.
    pub fn with_package_comparer<Q: EntityComparer<SbomPackage>>(self, packages: Q) -> SbomComparator<Q> {
        SbomComparator {
            files: self.files,
            packages,
            relationships: self.relationships,
            references: self.references,
        }
    }

    /// Compare in the fixed order, skipping everything after the first
    /// mismatching category.
    pub fn compare(&self, left: &SbomEntities, right: &SbomEntities) -> ComparisonResult {
        let references = compare_category_with(&self.references, &left.references, &right.references);
        let relationships = if references.is_mismatch() {
            CategoryOutcome::Skipped
        } else {
            compare_category_with(&self.relationships, &left.relationships, &right.relationships)
        };
        let files = if relationships.is_equal() {
            compare_category_with(&self.files, &left.files, &right.files)
        } else {
            CategoryOutcome::Skipped
        };
        let packages = if files.is_equal() {
            compare_category_with(&self.packages, &left.packages, &right.packages)
        } else {
            CategoryOutcome::Skipped
        };

        let result = ComparisonResult::new(references, relationships, files, packages);
        log_result(&result);
        result
    }

    /// Compare every category and list mismatching entities.
    pub fn diff(&self, left: &SbomEntities, right: &SbomEntities) -> ComparisonResult {
        let result = ComparisonResult::new(
            diff_category_with(&self.references, &left.references, &right.references),
            diff_category_with(&self.relationships, &left.relationships, &right.relationships),
            diff_category_with(&self.files, &left.files, &right.files),
            diff_category_with(&self.packages, &left.packages, &right.packages),
        );
        log_result(&result);
        result
    }
}

fn log_result(result: &ComparisonResult) {
    match result.first_mismatch {
        None => tracing::info!("documents are equivalent"),
        Some(category) => tracing::info!(%category, "documents differ"),
    }
}
