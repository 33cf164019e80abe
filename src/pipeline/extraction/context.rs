//! Clinical context: history, technique, measurements, contrast and key findings.
//!
//! Each field searches only the sections likely to hold it. A field that
//! finds nothing stays empty.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::{sentences, validate_section_order, ExtractionError};
use crate::models::{ClinicalContext, ContrastAgent, Measurement, Section, SectionName};

const MAX_KEY_FINDINGS: usize = 5;
const MAX_LOCATION_WORDS: usize = 5;

const TECHNIQUE_SECTIONS: &[SectionName] = &[
    SectionName::Technique,
    SectionName::Unlabeled,
    SectionName::History,
];
const MEASUREMENT_SECTIONS: &[SectionName] = &[SectionName::Findings, SectionName::Impression];

fn pattern(regex_str: &str) -> Regex {
    Regex::new(regex_str).expect("Invalid context regex pattern")
}

// ── Techniques ──────────────────────────────────────────────

static TECHNIQUES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("MRI", pattern(r"(?i)\b(?:mri|mr\s+imaging|magnetic\s+resonance(?:\s+imaging)?)\b")),
        ("CT", pattern(r"(?i)\b(?:ct|cat\s+scan|computed\s+tomography)\b")),
        ("PET", pattern(r"(?i)\b(?:pet(?:/ct|-ct)?|positron\s+emission\s+tomography)\b")),
        ("X-ray", pattern(r"(?i)\b(?:x-?ray|radiograph(?:s|y)?)\b")),
        ("Ultrasound", pattern(r"(?i)\b(?:ultrasound|ultrasonography|sonography|doppler)\b")),
        ("Mammography", pattern(r"(?i)\b(?:mammogra(?:m|phy)|tomosynthesis)\b")),
        ("Echocardiography", pattern(r"(?i)\b(?:echocardiogra(?:m|phy)|tte|tee)\b")),
        ("Angiography", pattern(r"(?i)\b(?:angiogra(?:m|phy)|cta|mra)\b")),
        ("Fluoroscopy", pattern(r"(?i)\bfluoroscop(?:y|ic)\b")),
        ("Diffusion-weighted imaging", pattern(r"(?i)\b(?:dwi|diffusion[\s-]+weighted)\b")),
        ("FLAIR", pattern(r"(?i)\bflair\b")),
        ("T1-weighted", pattern(r"(?i)\bt1(?:[\s-]+weighted)?\b")),
        ("T2-weighted", pattern(r"(?i)\bt2(?:[\s-]+weighted)?\b")),
    ]
});

// ── Measurements ────────────────────────────────────────────

static MEASUREMENT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)\b(?P<dims>\d+(?:\.\d+)?(?:\s*(?:x|×|by)\s*\d+(?:\.\d+)?){0,2})\s*(?P<unit>mg/dl|mmol/l|g/dl|mmhg|bpm|mm|cm|ml|cc|hu|kg|mg|%)",
    )
});

static DIMENSION_SPLIT: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)\s*(?:x|×|by)\s*"));

const LOCATION_PREPOSITIONS: &[&str] = &["in", "within", "of", "at", "involving", "along"];
const LOCATION_STOPS: &[&str] = &[
    "with", "and", "which", "that", "measuring", "using", "without", "showing", "is", "was",
    "are", "were", "on", "demonstrating", "causing",
];
const ARTICLES: &[&str] = &["the", "a", "an"];

fn canonical_unit(unit: &str) -> &'static str {
    match unit.to_ascii_lowercase().as_str() {
        "mg/dl" => "mg/dL",
        "mmol/l" => "mmol/L",
        "g/dl" => "g/dL",
        "mmhg" => "mmHg",
        "bpm" => "bpm",
        "mm" => "mm",
        "cm" => "cm",
        "ml" => "mL",
        "cc" => "cc",
        "hu" => "HU",
        "kg" => "kg",
        "mg" => "mg",
        _ => "%",
    }
}

// ── Contrast ────────────────────────────────────────────────

static CONTRAST_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)\b(?P<agent>gadolinium|gadobutrol|gadoterate|gadopentetate|gadavist|dotarem|magnevist|iohexol|iopamidol|iodixanol|omnipaque|isovue|visipaque|iodinated\s+contrast|barium(?:\s+sulfate)?)\b",
    )
});

static GENERIC_CONTRAST: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?:iv|intravenous|oral)\s+contrast\b")
});

static CONTRAST_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(r"(?i)\b(?P<route>intravenous(?:ly)?|iv|oral(?:ly)?|intrathecal|intra-?arterial|rectal(?:ly)?)\b")
});

fn generic_agent(agent: &str) -> String {
    let lower = agent.to_lowercase();
    let generic = match lower.as_str() {
        "gadavist" => "gadobutrol",
        "dotarem" => "gadoterate",
        "magnevist" => "gadopentetate",
        "omnipaque" => "iohexol",
        "isovue" => "iopamidol",
        "visipaque" => "iodixanol",
        "barium sulfate" => "barium",
        other => return other.split_whitespace().collect::<Vec<_>>().join(" "),
    };
    generic.to_string()
}

fn canonical_route(route: &str) -> String {
    let lower = route.to_lowercase();
    if lower == "iv" || lower.starts_with("intravenous") {
        "intravenous".into()
    } else if lower.starts_with("oral") {
        "oral".into()
    } else if lower.starts_with("rectal") {
        "rectal".into()
    } else if lower.starts_with("intra") && lower.ends_with("arterial") {
        "intra-arterial".into()
    } else {
        lower
    }
}

// ═══════════════════════════════════════════════════════════
// Extraction
// ═══════════════════════════════════════════════════════════

/// Pull structured clinical fields out of the segmented report.
///
/// Fails only on a malformed section list; missing sections and failed
/// matches leave the corresponding field empty.
pub fn extract_context(sections: &[Section]) -> Result<ClinicalContext, ExtractionError> {
    validate_section_order(sections)?;

    let context = ClinicalContext {
        history: extract_history(sections),
        techniques: extract_techniques(sections),
        measurements: extract_measurements(sections),
        contrast: extract_contrast(sections),
        key_findings: extract_key_findings(sections),
    };

    tracing::debug!(
        history = context.history.is_some(),
        techniques = context.techniques.len(),
        measurements = context.measurements.len(),
        contrast = context.contrast.is_some(),
        key_findings = context.key_findings.len(),
        "Clinical context extracted"
    );
    Ok(context)
}

fn in_sections<'a>(
    sections: &'a [Section],
    names: &'a [SectionName],
) -> impl Iterator<Item = &'a Section> {
    sections.iter().filter(move |s| names.contains(&s.name))
}

fn extract_history(sections: &[Section]) -> Option<String> {
    let parts: Vec<&str> = in_sections(sections, &[SectionName::History])
        .map(Section::body)
        .filter(|b| !b.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
}

fn extract_techniques(sections: &[Section]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for section in in_sections(sections, TECHNIQUE_SECTIONS) {
        for (label, regex) in TECHNIQUES.iter() {
            if regex.is_match(&section.text) {
                found.insert(label.to_string());
            }
        }
    }
    found
}

fn extract_measurements(sections: &[Section]) -> Vec<Measurement> {
    let mut measurements = Vec::new();
    for section in in_sections(sections, MEASUREMENT_SECTIONS) {
        let text = section.text.as_str();
        for caps in MEASUREMENT.captures_iter(text) {
            let (Some(dims), Some(unit)) = (caps.name("dims"), caps.name("unit")) else {
                continue;
            };
            // Reject unit prefixes of longer words ("3 cmx", "5 mmol").
            if text[unit.end()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric)
            {
                continue;
            }
            let dimensions: Vec<f64> = DIMENSION_SPLIT
                .split(dims.as_str())
                .filter_map(|d| d.trim().parse().ok())
                .collect();
            let Some(&value) = dimensions.first() else {
                continue;
            };
            measurements.push(Measurement {
                value,
                unit: canonical_unit(unit.as_str()).to_string(),
                dimensions,
                location: location_after(&text[unit.end()..]),
                offset: section.body_offset + dims.start(),
                section: section.name,
            });
        }
    }
    measurements
}

/// Anatomical location phrase following a measurement, e.g. "mass in the right
/// frontal lobe with ..." gives "right frontal lobe".
fn location_after(tail: &str) -> Option<String> {
    let clause_end = tail
        .find(|c: char| matches!(c, '.' | ';' | ',' | ':' | '\n' | '('))
        .unwrap_or(tail.len());
    let words: Vec<&str> = tail[..clause_end].split_whitespace().collect();

    let preposition = words
        .iter()
        .take(4)
        .position(|w| LOCATION_PREPOSITIONS.contains(&w.to_lowercase().as_str()))?;

    let mut location = Vec::new();
    for word in &words[preposition + 1..] {
        let lower = word.to_lowercase();
        if location.is_empty() && ARTICLES.contains(&lower.as_str()) {
            continue;
        }
        if LOCATION_STOPS.contains(&lower.as_str()) || location.len() == MAX_LOCATION_WORDS {
            break;
        }
        location.push(*word);
    }
    (!location.is_empty()).then(|| location.join(" "))
}

fn extract_contrast(sections: &[Section]) -> Option<ContrastAgent> {
    // Technique sections first, then the rest in text order.
    let ordered = in_sections(sections, &[SectionName::Technique]).chain(
        sections
            .iter()
            .filter(|s| s.name != SectionName::Technique),
    );

    let mut generic = None;
    for section in ordered {
        let text = section.text.as_str();
        if let Some(m) = CONTRAST_AGENT.find(text) {
            return Some(ContrastAgent {
                agent: generic_agent(m.as_str()),
                route: route_near(text, m.start()),
            });
        }
        if generic.is_none() {
            generic = GENERIC_CONTRAST.find(text).map(|m| ContrastAgent {
                agent: "contrast".into(),
                route: route_near(text, m.start()),
            });
        }
    }
    generic
}

fn route_near(text: &str, at: usize) -> Option<String> {
    let (start, end) = super::sentence_bounds(text, at);
    CONTRAST_ROUTE
        .captures(&text[start..end])
        .and_then(|caps| caps.name("route"))
        .map(|m| canonical_route(m.as_str()))
}

fn extract_key_findings(sections: &[Section]) -> Vec<String> {
    static LIST_MARKER: LazyLock<Regex> =
        LazyLock::new(|| pattern(r"^(?:\d+[.)]|[-*•])\s*"));

    for source in [SectionName::Impression, SectionName::Findings] {
        let findings: Vec<String> = in_sections(sections, std::slice::from_ref(&source))
            .flat_map(|s| sentences(&s.text))
            .map(|sentence| LIST_MARKER.replace(sentence, "").trim().to_string())
            .filter(|f| !f.is_empty())
            .take(MAX_KEY_FINDINGS)
            .collect();
        if !findings.is_empty() {
            return findings;
        }
    }
    Vec::new()
}
