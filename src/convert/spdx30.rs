//! SPDX 3.0 graph elements to and from common entities.
//!
//! 3.0 keeps licenses and suppliers as separate graph elements linked by
//! relationships or ids. Reading a document therefore first builds a
//! [`GraphIndex`] over the whole graph; generation does the reverse and
//! emits each license or agent element once.

use super::{
    asserted_licenses, fill_depends_on, normalize_path, or_noassertion, purl_type, split_agent,
};
use crate::model::spdx30::{
    AgentKind, LicenseKind, Spdx30Agent, Spdx30CreationInfo, Spdx30Document, Spdx30Element,
    Spdx30ExternalIdentifier, Spdx30ExternalMap, Spdx30File, Spdx30IntegrityMethod,
    Spdx30License, Spdx30Package, Spdx30Relationship, Spdx30SpdxDocument, CREATION_INFO_ID,
};
use crate::model::{
    agent_element_id, ensure_file_id, ensure_package_id, external_map_element_id,
    license_element_id, relationship_element_id, Checksum, DocumentInfo, IdentifierError,
    LicenseTextLookup, RelationshipType, SbomEntities, SbomFile, SbomPackage, SbomReference,
    SbomRelationship, DOCUMENT_SPDX_ID, NOASSERTION,
};
use crate::parsers::ParseError;
use std::collections::{HashMap, HashSet};

/// SPDX version written into generated creation info.
pub const SPDX30_SPEC_VERSION: &str = "3.0.1";

// ============================================================================
// Native to common
// ============================================================================

/// Lookups over a parsed graph needed to resolve per-element fields.
#[derive(Debug, Default)]
pub struct GraphIndex<'a> {
    licenses: HashMap<&'a str, &'a Spdx30License>,
    agents: HashMap<&'a str, &'a Spdx30Agent>,
    declared: HashMap<&'a str, Vec<String>>,
    concluded: HashMap<&'a str, Vec<String>>,
}

impl<'a> GraphIndex<'a> {
    pub fn build(elements: &'a [Spdx30Element]) -> Self {
        let mut index = Self::default();
        for element in elements {
            match element {
                Spdx30Element::License(l) => {
                    index.licenses.insert(l.spdx_id.as_str(), l);
                }
                Spdx30Element::Agent(a) => {
                    index.agents.insert(a.spdx_id.as_str(), a);
                }
                _ => {}
            }
        }
        for element in elements {
            let Spdx30Element::Relationship(r) = element else {
                continue;
            };
            let target = match r.relationship_type {
                RelationshipType::HasDeclaredLicense => &mut index.declared,
                RelationshipType::HasConcludedLicense => &mut index.concluded,
                _ => continue,
            };
            let entry = target.entry(r.from.as_str()).or_default();
            for to in &r.to {
                match index.licenses.get(to.as_str()) {
                    Some(license) => entry.push(license.license().to_string()),
                    None => tracing::debug!(license = %to, "license relationship target not in graph"),
                }
            }
        }
        index
    }

    /// Declared licenses attached to an element.
    pub fn declared(&self, element_id: &str) -> &[String] {
        self.declared.get(element_id).map_or(&[], Vec::as_slice)
    }

    /// Concluded licenses attached to an element.
    pub fn concluded(&self, element_id: &str) -> &[String] {
        self.concluded.get(element_id).map_or(&[], Vec::as_slice)
    }

    /// Supplier in 2.2 form (`Organization: ACME`).
    pub fn supplier(&self, agent_id: &str) -> Option<String> {
        self.agents
            .get(agent_id)
            .map(|a| format!("{}: {}", a.kind.spdx22_prefix(), a.name))
    }
}

fn joined_license(licenses: &[String]) -> String {
    let asserted = asserted_licenses(licenses.iter().map(String::as_str));
    if asserted.is_empty() {
        NOASSERTION.to_string()
    } else {
        asserted.join(" AND ")
    }
}

/// Checksums from integrity methods; verification codes count too.
fn checksums(methods: &[Spdx30IntegrityMethod]) -> Vec<Checksum> {
    methods
        .iter()
        .map(|m| match m {
            Spdx30IntegrityMethod::Hash {
                algorithm,
                hash_value,
            }
            | Spdx30IntegrityMethod::PackageVerificationCode {
                algorithm,
                hash_value,
                ..
            } => Checksum::new(*algorithm, hash_value.clone()),
        })
        .collect()
}

pub fn file_to_common(file: &Spdx30File, index: &GraphIndex<'_>) -> SbomFile {
    SbomFile {
        id: file.spdx_id.clone(),
        path: normalize_path(&file.name),
        checksums: checksums(&file.verified_using),
        copyright_text: or_noassertion(file.copyright_text.as_deref()),
        license_concluded: joined_license(index.concluded(&file.spdx_id)),
        license_info_in_files: asserted_licenses(index.declared(&file.spdx_id).iter().map(String::as_str)),
    }
}

/// The first `packageUrl` external identifier, else the first identifier.
pub fn package_url(package: &Spdx30Package) -> Option<&str> {
    package
        .external_identifier
        .iter()
        .find(|id| id.is_package_url())
        .or_else(|| package.external_identifier.first())
        .map(|id| id.identifier.as_str())
}

pub fn package_to_common(package: &Spdx30Package, index: &GraphIndex<'_>) -> SbomPackage {
    let package_url = package_url(package).map(str::to_string);
    SbomPackage {
        id: package.spdx_id.clone(),
        name: package.name.clone(),
        version: package.package_version.clone(),
        package_type: package_url.as_deref().and_then(purl_type),
        package_url,
        download_location: or_noassertion(package.download_location.as_deref()),
        checksums: checksums(&package.verified_using),
        license_declared: joined_license(index.declared(&package.spdx_id)),
        license_concluded: joined_license(index.concluded(&package.spdx_id)),
        supplier: or_noassertion(
            package
                .supplied_by
                .as_deref()
                .and_then(|id| index.supplier(id))
                .as_deref(),
        ),
        files_analyzed: false,
        depends_on: None,
    }
}

/// `id`, with the document's own id spelled [`DOCUMENT_SPDX_ID`].
fn local_id(id: &str, document_id: Option<&str>) -> String {
    if document_id == Some(id) {
        DOCUMENT_SPDX_ID.to_string()
    } else {
        id.to_string()
    }
}

/// One common relationship per target. License edges are not returned.
///
/// `document_id` is the `SpdxDocument` element's id; edges touching it
/// are rewritten to [`DOCUMENT_SPDX_ID`].
pub fn relationship_to_common(relationship: &Spdx30Relationship, document_id: Option<&str>) -> Vec<SbomRelationship> {
    if relationship.relationship_type.is_license() {
        return Vec::new();
    }
    let from = local_id(&relationship.from, document_id);
    relationship
        .to
        .iter()
        .map(|to| SbomRelationship::new(from.clone(), relationship.relationship_type, local_id(to, document_id)))
        .collect()
}

pub fn reference_to_common(map: &Spdx30ExternalMap) -> Result<SbomReference, ParseError> {
    let checksum = map
        .verified_using
        .iter()
        .find_map(Spdx30IntegrityMethod::as_hash)
        .ok_or_else(|| ParseError::missing_field("verifiedUsing", "ExternalMap"))?;
    Ok(SbomReference {
        external_id: map.external_spdx_id.clone(),
        document_locator: map.location_hint.clone().unwrap_or_default(),
        checksum: Checksum::new(checksum.0, checksum.1),
    })
}

/// License texts carried by custom license elements.
pub fn license_texts(elements: &[Spdx30Element]) -> LicenseTextLookup {
    elements
        .iter()
        .filter_map(|e| match e {
            Spdx30Element::License(l) => l
                .license_text
                .as_ref()
                .map(|text| (l.license().to_string(), text.clone())),
            _ => None,
        })
        .collect()
}

/// Convert a whole document.
pub fn to_entities(document: &Spdx30Document) -> Result<SbomEntities, ParseError> {
    let index = GraphIndex::build(&document.elements);
    let document_id = document.spdx_document().map(|d| d.spdx_id.as_str());
    let mut entities = SbomEntities {
        license_texts: license_texts(&document.elements),
        ..SbomEntities::default()
    };
    for element in &document.elements {
        match element {
            Spdx30Element::File(f) => entities.files.push(file_to_common(f, &index)),
            Spdx30Element::Package(p) => entities.packages.push(package_to_common(p, &index)),
            Spdx30Element::Relationship(r) => entities.relationships.extend(relationship_to_common(r, document_id)),
            Spdx30Element::ExternalMap(m) => entities.references.push(reference_to_common(m)?),
            _ => {}
        }
    }
    fill_depends_on(&mut entities);
    Ok(entities)
}

// ============================================================================
// Common to native
// ============================================================================

/// Emits graph elements for a set of entities.
///
/// License and agent elements are emitted the first time they are
/// referenced and never repeated. Relationship ids are content hashes, so
/// repeated edges get an ordinal suffix to keep every `spdxId` unique.
pub struct ElementGenerator<'a> {
    lookup: &'a LicenseTextLookup,
    emitted: HashSet<String>,
    relationship_ids: HashMap<String, usize>,
    document_id: Option<String>,
}

impl<'a> ElementGenerator<'a> {
    pub fn new(lookup: &'a LicenseTextLookup) -> Self {
        Self {
            lookup,
            emitted: HashSet::new(),
            relationship_ids: HashMap::new(),
            document_id: None,
        }
    }

    /// Creation info, creator agents and the `SpdxDocument` element.
    pub fn header<E>(
        &mut self,
        info: &DocumentInfo,
        root_elements: Vec<String>,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut created_by = Vec::new();
        let mut agents = Vec::new();
        for creator in &info.creators {
            let Some((kind, name)) = split_agent(creator) else {
                continue;
            };
            let id = agent_element_id(kind, name);
            created_by.push(id.clone());
            agents.push(agent(kind, name, id));
        }

        emit(Spdx30Element::CreationInfo(Spdx30CreationInfo {
            id: CREATION_INFO_ID.to_string(),
            spec_version: SPDX30_SPEC_VERSION.to_string(),
            created: info.created_timestamp(),
            created_by,
        }))?;
        for element in agents {
            self.emit_once(element, emit)?;
        }
        let document_id = info.spdx30_document_id();
        self.document_id = Some(document_id.clone());
        emit(Spdx30Element::SpdxDocument(Spdx30SpdxDocument {
            spdx_id: document_id,
            creation_info: CREATION_INFO_ID.to_string(),
            name: Some(info.name.clone()),
            data_license: Some(info.data_license.clone()),
            root_element: root_elements,
            profile_conformance: vec!["core".to_string(), "software".to_string()],
        }))
    }

    fn emit_once<E>(
        &mut self,
        element: Spdx30Element,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E> {
        let Some(id) = element.spdx_id() else {
            return emit(element);
        };
        if self.emitted.insert(id.to_string()) {
            emit(element)?;
        }
        Ok(())
    }

    /// License element for `license` plus the relationship attaching it.
    fn license<E>(
        &mut self,
        element_id: &str,
        relationship_type: RelationshipType,
        license: &str,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E> {
        if license.is_empty() || license == NOASSERTION {
            return Ok(());
        }
        let license_id = license_element_id(license);
        let text = self.lookup.get(license).map(str::to_string);
        let kind = if text.is_some() {
            LicenseKind::CustomLicense
        } else {
            LicenseKind::LicenseExpression
        };
        self.emit_once(
            Spdx30Element::License(Spdx30License {
                kind,
                spdx_id: license_id.clone(),
                creation_info: CREATION_INFO_ID.to_string(),
                name: license.to_string(),
                license_expression: None,
                license_text: text,
            }),
            emit,
        )?;
        let element = self.relationship_element(element_id, relationship_type, vec![license_id]);
        emit(element)
    }

    pub fn file<E>(
        &mut self,
        file: &SbomFile,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E>
    where
        E: From<IdentifierError>,
    {
        let id = ensure_file_id(file)?;
        emit(Spdx30Element::File(Spdx30File {
            spdx_id: id.clone(),
            creation_info: CREATION_INFO_ID.to_string(),
            name: normalize_path(&file.path),
            verified_using: hashes(&file.checksums),
            copyright_text: Some(file.copyright_text.clone()),
        }))?;
        self.license(&id, RelationshipType::HasConcludedLicense, &file.license_concluded, emit)?;
        for license in &file.license_info_in_files {
            self.license(&id, RelationshipType::HasDeclaredLicense, license, emit)?;
        }
        Ok(())
    }

    pub fn package<E>(
        &mut self,
        package: &SbomPackage,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E> {
        let id = ensure_package_id(package);
        let supplied_by = match split_agent(&package.supplier) {
            Some((kind, name)) => {
                let agent_id = agent_element_id(kind, name);
                self.emit_once(agent(kind, name, agent_id.clone()), emit)?;
                Some(agent_id)
            }
            None => None,
        };
        emit(Spdx30Element::Package(Spdx30Package {
            spdx_id: id.clone(),
            creation_info: CREATION_INFO_ID.to_string(),
            name: package.name.clone(),
            package_version: package.version.clone(),
            download_location: Some(package.download_location.clone()),
            copyright_text: None,
            supplied_by,
            external_identifier: package
                .package_url
                .iter()
                .map(Spdx30ExternalIdentifier::package_url)
                .collect(),
            verified_using: hashes(&package.checksums),
        }))?;
        self.license(&id, RelationshipType::HasConcludedLicense, &package.license_concluded, emit)?;
        self.license(&id, RelationshipType::HasDeclaredLicense, &package.license_declared, emit)
    }

    /// The relationship in its 3.0 direction. License edges are skipped;
    /// files and packages carry them.
    ///
    /// [`DOCUMENT_SPDX_ID`] endpoints point at the emitted `SpdxDocument`.
    pub fn relationship<E>(
        &mut self,
        rel: &SbomRelationship,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E> {
        if rel.relationship_type.is_license() {
            return Ok(());
        }
        let (ty, from, to) = rel.relationship_type.canonicalize(&rel.source_id, &rel.target_id);
        let from = self.graph_id(from).to_string();
        let to = self.graph_id(to).to_string();
        let element = self.relationship_element(&from, ty, vec![to]);
        emit(element)
    }

    fn graph_id<'s>(&'s self, id: &'s str) -> &'s str {
        match &self.document_id {
            Some(document_id) if id == DOCUMENT_SPDX_ID => document_id,
            _ => id,
        }
    }

    fn relationship_element(
        &mut self,
        from: &str,
        relationship_type: RelationshipType,
        to: Vec<String>,
    ) -> Spdx30Element {
        let base = relationship_element_id(from, relationship_type, &to.join(","));
        let seen = self.relationship_ids.entry(base.clone()).or_insert(0);
        let spdx_id = if *seen == 0 { base } else { format!("{base}-{seen}") };
        *seen += 1;
        Spdx30Element::Relationship(Spdx30Relationship {
            spdx_id,
            creation_info: CREATION_INFO_ID.to_string(),
            from: from.to_string(),
            relationship_type,
            to,
        })
    }

    pub fn reference<E>(
        &mut self,
        reference: &SbomReference,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E> {
        emit(Spdx30Element::ExternalMap(Spdx30ExternalMap {
            spdx_id: external_map_element_id(&reference.external_id),
            creation_info: CREATION_INFO_ID.to_string(),
            external_spdx_id: reference.external_id.clone(),
            verified_using: hashes(std::slice::from_ref(&reference.checksum)),
            location_hint: Some(reference.document_locator.clone()),
        }))
    }

    /// Every element for `entities`, header first.
    pub fn all<E>(
        &mut self,
        entities: &SbomEntities,
        info: &DocumentInfo,
        emit: &mut impl FnMut(Spdx30Element) -> Result<(), E>,
    ) -> Result<(), E>
    where
        E: From<IdentifierError>,
    {
        self.header(info, root_elements(entities), emit)?;
        for file in &entities.files {
            self.file(file, emit)?;
        }
        for package in &entities.packages {
            self.package(package, emit)?;
        }
        for rel in &entities.relationships {
            self.relationship(rel, emit)?;
        }
        for reference in &entities.references {
            self.reference(reference, emit)?;
        }
        Ok(())
    }
}

fn agent(kind: &str, name: &str, spdx_id: String) -> Spdx30Element {
    let kind = match kind {
        "Person" => AgentKind::Person,
        "Tool" => AgentKind::Tool,
        _ => AgentKind::Organization,
    };
    Spdx30Element::Agent(Spdx30Agent {
        kind,
        spdx_id,
        creation_info: CREATION_INFO_ID.to_string(),
        name: name.to_string(),
    })
}

fn hashes(checksums: &[Checksum]) -> Vec<Spdx30IntegrityMethod> {
    checksums
        .iter()
        .map(|c| Spdx30IntegrityMethod::Hash {
            algorithm: c.algorithm,
            hash_value: c.value.clone(),
        })
        .collect()
}

/// Targets of `DESCRIBES` edges out of the document itself.
pub fn root_elements(entities: &SbomEntities) -> Vec<String> {
    entities
        .relationships
        .iter()
        .filter_map(|r| {
            let (ty, from, to) = r.relationship_type.canonicalize(&r.source_id, &r.target_id);
            (ty == RelationshipType::Describes && from == DOCUMENT_SPDX_ID).then(|| to.to_string())
        })
        .collect()
}

/// Build every element in memory.
pub fn from_entities(
    entities: &SbomEntities,
    info: &DocumentInfo,
    lookup: &LicenseTextLookup,
) -> Result<Vec<Spdx30Element>, IdentifierError> {
    let mut elements = Vec::new();
    ElementGenerator::new(lookup).all(entities, info, &mut |e| {
        elements.push(e);
        Ok::<(), IdentifierError>(())
    })?;
    Ok(elements)
}
