//! Performance benchmarks for large SBOM documents.
//!
//! Run with: cargo bench --bench large_sbom
//!
//! Measures streaming parse throughput for both SPDX versions, the effect
//! of the initial buffer size, and comparison of large entity sets.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sbom_parity::compare::SbomComparator;
use sbom_parity::config::ParserConfig;
use sbom_parity::model::{Checksum, ChecksumAlgorithm, DocumentInfo, RelationshipType, SbomEntities, SbomFile, SbomPackage, SbomRelationship};
use sbom_parity::parsers::parse_entities;
use sbom_parity::writer::{write_spdx22, write_spdx30, WriterOptions};
use std::hint::black_box;
use std::io::Cursor;

/// Generate entities with the given number of packages and files.
fn generate_entities(count: usize) -> SbomEntities {
    let mut entities = SbomEntities::default();
    for i in 0..count {
        let mut package = SbomPackage::new(format!("SPDXRef-Package-{i}"), format!("component-{i}"));
        package.version = Some(format!("1.{}.{}", i % 10, i % 100));
        package.package_url = Some(format!("pkg:npm/component-{i}@1.{}.{}", i % 10, i % 100));
        package.package_type = Some("npm".to_string());
        package.license_declared = "MIT".to_string();
        entities.packages.push(package);

        entities.files.push(SbomFile {
            id: format!("SPDXRef-File-{i}"),
            path: format!("src/module_{i}.js"),
            checksums: vec![Checksum::new(ChecksumAlgorithm::Sha1, format!("{i:040x}"))],
            copyright_text: "NOASSERTION".to_string(),
            license_concluded: "MIT".to_string(),
            license_info_in_files: vec!["MIT".to_string()],
        });
        entities.relationships.push(SbomRelationship::new(
            format!("SPDXRef-Package-{i}"),
            RelationshipType::Contains,
            format!("SPDXRef-File-{i}"),
        ));
    }
    entities
}

fn info() -> DocumentInfo {
    DocumentInfo::new("bench", "https://example.com/bench")
}

fn spdx22_bytes(entities: &SbomEntities) -> Vec<u8> {
    write_spdx22(entities, &info().spdx22_header(), &entities.license_texts, Vec::new(), &WriterOptions::default())
        .expect("generate 2.2 document")
}

fn spdx30_bytes(entities: &SbomEntities) -> Vec<u8> {
    write_spdx30(entities, &info(), &entities.license_texts, Vec::new(), &WriterOptions::default())
        .expect("generate 3.0 document")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [100, 1_000, 10_000] {
        let entities = generate_entities(size);
        let spdx22 = spdx22_bytes(&entities);
        let spdx30 = spdx30_bytes(&entities);

        group.throughput(Throughput::Bytes(spdx22.len() as u64));
        group.bench_with_input(BenchmarkId::new("spdx22", size), &spdx22, |b, bytes| {
            b.iter(|| black_box(parse_entities(Cursor::new(black_box(bytes)), &ParserConfig::default())))
        });
        group.throughput(Throughput::Bytes(spdx30.len() as u64));
        group.bench_with_input(BenchmarkId::new("spdx30", size), &spdx30, |b, bytes| {
            b.iter(|| black_box(parse_entities(Cursor::new(black_box(bytes)), &ParserConfig::default())))
        });
    }
    group.finish();
}

fn bench_buffer_size(c: &mut Criterion) {
    let bytes = spdx22_bytes(&generate_entities(1_000));
    let mut group = c.benchmark_group("initial_buffer_size");
    for initial in [64, 4_096, 65_536] {
        let config = ParserConfig {
            initial_buffer_size: initial,
            ..ParserConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(initial), &config, |b, config| {
            b.iter(|| black_box(parse_entities(Cursor::new(black_box(&bytes)), config)))
        });
    }
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let left = generate_entities(10_000);
    let right = left.clone();
    let comparator = SbomComparator::default();

    c.bench_function("compare_10000_equal", |b| {
        b.iter(|| black_box(comparator.compare(black_box(&left), black_box(&right))))
    });
    c.bench_function("diff_10000_equal", |b| {
        b.iter(|| black_box(comparator.diff(black_box(&left), black_box(&right))))
    });
}

criterion_group!(benches, bench_parse, bench_buffer_size, bench_compare);
criterion_main!(benches);
