//! Comparison result structures.

use crate::model::{SbomFile, SbomPackage, SbomReference, SbomRelationship};
use serde::Serialize;
use std::fmt;

/// Entity categories in the order they are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    References,
    Relationships,
    Files,
    Packages,
}

impl EntityCategory {
    /// Fixed comparison order.
    pub const ORDER: [Self; 4] = [Self::References, Self::Relationships, Self::Files, Self::Packages];
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::References => write!(f, "external references"),
            Self::Relationships => write!(f, "relationships"),
            Self::Files => write!(f, "files"),
            Self::Packages => write!(f, "packages"),
        }
    }
}

/// Outcome for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome<T> {
    Equal,
    /// Counts differ. The lists are only filled by a full diff.
    CountMismatch {
        left: usize,
        right: usize,
        only_in_left: Vec<T>,
        only_in_right: Vec<T>,
    },
    ContentMismatch {
        only_in_left: Vec<T>,
        only_in_right: Vec<T>,
    },
    /// Not evaluated because an earlier category already differed
    Skipped,
}

impl<T> CategoryOutcome<T> {
    #[must_use]
    pub const fn is_equal(&self) -> bool {
        matches!(self, Self::Equal)
    }

    /// True for either kind of mismatch.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::CountMismatch { .. } | Self::ContentMismatch { .. })
    }

    /// Entities only present in the left document.
    pub fn only_in_left(&self) -> &[T] {
        match self {
            Self::CountMismatch { only_in_left, .. } | Self::ContentMismatch { only_in_left, .. } => {
                only_in_left
            }
            _ => &[],
        }
    }

    /// Entities only present in the right document.
    pub fn only_in_right(&self) -> &[T] {
        match self {
            Self::CountMismatch { only_in_right, .. } | Self::ContentMismatch { only_in_right, .. } => {
                only_in_right
            }
            _ => &[],
        }
    }
}

/// Result of comparing two documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub struct ComparisonResult {
    /// Whether the documents are semantically equal
    pub equal: bool,
    /// First category (in comparison order) that differs
    pub first_mismatch: Option<EntityCategory>,
    pub references: CategoryOutcome<SbomReference>,
    pub relationships: CategoryOutcome<SbomRelationship>,
    pub files: CategoryOutcome<SbomFile>,
    pub packages: CategoryOutcome<SbomPackage>,
}

impl ComparisonResult {
    pub(crate) fn new(
        references: CategoryOutcome<SbomReference>,
        relationships: CategoryOutcome<SbomRelationship>,
        files: CategoryOutcome<SbomFile>,
        packages: CategoryOutcome<SbomPackage>,
    ) -> Self {
        let mismatches = [
            references.is_mismatch(),
            relationships.is_mismatch(),
            files.is_mismatch(),
            packages.is_mismatch(),
        ];
        let first_mismatch = EntityCategory::ORDER
            .into_iter()
            .zip(mismatches)
            .find_map(|(category, mismatch)| mismatch.then_some(category));
        Self {
            equal: first_mismatch.is_none(),
            first_mismatch,
            references,
            relationships,
            files,
            packages,
        }
    }

    /// Human-readable report of every mismatch.
    pub fn report(&self) -> String {
        let mut out = String::new();
        if self.equal {
            out.push_str("Documents are equivalent.\n");
            return out;
        }
        out.push_str("Documents differ.\n");
        section(&mut out, EntityCategory::References, &self.references, |r| {
            format!("{} ({})", r.external_id, r.document_locator)
        });
        section(&mut out, EntityCategory::Relationships, &self.relationships, |r| {
            format!("{} {} {}", r.source_id, r.relationship_type, r.target_id)
        });
        section(&mut out, EntityCategory::Files, &self.files, |f| format!("{} ({})", f.path, f.id));
        section(&mut out, EntityCategory::Packages, &self.packages, |p| {
            format!("{} {} ({})", p.name, p.version.as_deref().unwrap_or("-"), p.id)
        });
        out
    }
}

fn section<T>(out: &mut String, category: EntityCategory, outcome: &CategoryOutcome<T>, describe: impl Fn(&T) -> String) {
    use std::fmt::Write as _;

    match outcome {
        CategoryOutcome::Equal => {
            let _ = writeln!(out, "  {category}: equal");
        }
        CategoryOutcome::Skipped => {
            let _ = writeln!(out, "  {category}: not compared");
        }
        CategoryOutcome::CountMismatch { left, right, .. } => {
            let _ = writeln!(out, "  {category}: count differs ({left} vs {right})");
        }
        CategoryOutcome::ContentMismatch { .. } => {
            let _ = writeln!(out, "  {category}: content differs");
        }
    }
    for entity in outcome.only_in_left() {
        let _ = writeln!(out, "    - {}", describe(entity));
    }
    for entity in outcome.only_in_right() {
        let _ = writeln!(out, "    + {}", describe(entity));
    }
}
