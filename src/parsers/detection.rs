//! SPDX version detection from a document prefix.
//!
//! Detection scores version-specific markers found in the first bytes of a
//! document. Only a bounded prefix is inspected, so the whole document never
//! has to be read before choosing a parser.

use std::fmt;

/// Minimum confidence for accepting a detection.
pub const MIN_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Bytes read ahead of parsing to detect the version.
pub const DETECTION_PREFIX_LEN: usize = 4096;

/// Supported SPDX major versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    Spdx22,
    Spdx30,
}

impl SpecVersion {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spdx22 => "SPDX 2.2",
            Self::Spdx30 => "SPDX 3.0",
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of inspecting a prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub version: Option<SpecVersion>,
    /// 0.0 to 1.0
    pub confidence: f32,
    pub warnings: Vec<String>,
}

impl DetectionResult {
    fn unknown(reason: &str) -> Self {
        Self {
            version: None,
            confidence: 0.0,
            warnings: vec![reason.to_string()],
        }
    }

    /// Whether the detection is confident enough to parse.
    pub fn can_parse(&self) -> bool {
        self.version.is_some() && self.confidence >= MIN_CONFIDENCE_THRESHOLD
    }
}

// Marker and weight. Weights for one version sum to 1.0.
const SPDX30_MARKERS: &[(&str, f32)] = &[
    ("\"@context\"", 0.4),
    ("\"@graph\"", 0.3),
    ("spdx.org/rdf/3.0", 0.3),
];

const SPDX22_MARKERS: &[(&str, f32)] = &[
    ("\"spdxVersion\"", 0.4),
    ("\"SPDX-2.", 0.3),
    ("\"SPDXID\"", 0.3),
];

fn score(text: &str, markers: &[(&str, f32)]) -> f32 {
    markers
        .iter()
        .filter(|(marker, _)| text.contains(marker))
        .map(|(_, weight)| weight)
        .sum()
}

/// Score both versions against `prefix`.
pub fn detect(prefix: &[u8]) -> DetectionResult {
    let prefix = prefix.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(prefix);
    match prefix.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => {}
        Some(_) => return DetectionResult::unknown("document does not start with a JSON object"),
        None => return DetectionResult::unknown("empty content"),
    }

    let text = String::from_utf8_lossy(prefix);
    let spdx30 = score(&text, SPDX30_MARKERS);
    let spdx22 = score(&text, SPDX22_MARKERS);
    tracing::debug!(spdx22, spdx30, threshold = MIN_CONFIDENCE_THRESHOLD, "version detection");

    let (version, confidence) = if spdx30 > spdx22 {
        (SpecVersion::Spdx30, spdx30)
    } else if spdx22 > spdx30 {
        (SpecVersion::Spdx22, spdx22)
    } else {
        return DetectionResult::unknown("SPDX version markers are ambiguous");
    };

    let mut result = DetectionResult {
        version: Some(version),
        confidence,
        warnings: Vec::new(),
    };
    if confidence < MIN_CONFIDENCE_THRESHOLD {
        result.warnings.push(format!(
            "{version} detection: {:.0}% confidence (threshold: {:.0}%)",
            confidence * 100.0,
            MIN_CONFIDENCE_THRESHOLD * 100.0
        ));
    }
    if version == SpecVersion::Spdx22 && text.contains("\"SPDX-2.") && !text.contains("\"SPDX-2.2\"") {
        result
            .warnings
            .push("document declares a 2.x version other than 2.2; reading it as 2.2".to_string());
    }
    result
}

/// Detected version, if confident enough to parse.
pub fn detect_spec_version(prefix: &[u8]) -> Option<SpecVersion> {
    let result = detect(prefix);
    for warning in &result.warnings {
        tracing::warn!("{warning}");
    }
    if result.can_parse() {
        result.version
    } else {
        None
    }
}
