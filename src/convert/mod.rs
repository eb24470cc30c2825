//! Conversions between native SPDX records and the common entity model.
//!
//! Both native-to-common directions apply the same normalization so that
//! equivalent documents land on identical entities:
//!
//! - paths use forward slashes without a leading `./`
//! - absent copyright and concluded license become `NOASSERTION`
//! - `NOASSERTION` entries are dropped from per-file license lists
//! - the package type is taken from the purl (`pkg:<type>/...`)
//!
//! Conversions are pure; converting the same record twice yields equal
//! results.

pub mod spdx22;
pub mod spdx30;

use crate::model::{RelationshipType, SbomEntities, NOASSERTION};
use std::collections::HashMap;

/// Forward slashes, no leading `./`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}

/// The value, or `NOASSERTION` when it is absent or blank.
pub fn or_noassertion(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOASSERTION.to_string(),
    }
}

/// Drop blank and `NOASSERTION` entries.
pub fn asserted_licenses<'a>(licenses: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    licenses
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != NOASSERTION)
        .map(str::to_string)
        .collect()
}

/// Package-manager family from a purl, e.g. `npm` for `pkg:npm/left-pad@1.3.0`.
pub fn purl_type(purl: &str) -> Option<String> {
    let rest = purl.strip_prefix("pkg:")?;
    let ty = rest.split('/').next()?;
    if ty.is_empty() || rest.len() == ty.len() {
        return None;
    }
    Some(ty.to_ascii_lowercase())
}

/// `LicenseRef-*` ids mentioned in a license expression.
pub fn license_refs(expression: &str) -> impl Iterator<Item = &str> {
    expression
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|token| token.starts_with("LicenseRef-"))
}

/// Split a 2.2 agent string (`Organization: ACME`) into kind and name.
pub fn split_agent(agent: &str) -> Option<(&str, &str)> {
    let (kind, name) = agent.split_once(':')?;
    let kind = kind.trim();
    let name = name.trim();
    if name.is_empty() || !matches!(kind, "Organization" | "Person" | "Tool") {
        return None;
    }
    Some((kind, name))
}

/// Point each package's `depends_on` at the target of its first
/// `DEPENDS_ON` edge. Packages without one are reset to `None`.
pub fn fill_depends_on(entities: &mut SbomEntities) {
    let mut first: HashMap<&str, &str> = HashMap::new();
    for rel in &entities.relationships {
        if rel.relationship_type == RelationshipType::DependsOn {
            first.entry(rel.source_id.as_str()).or_insert(rel.target_id.as_str());
        }
    }
    for package in &mut entities.packages {
        package.depends_on = first.get(package.id.as_str()).map(|id| (*id).to_string());
    }
}
