use std::collections::BTreeSet;
use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{SectionName, TermCategory};

// ═══════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════

/// A contiguous, named region of report text.
///
/// `start_offset..end_offset` is the full span including the heading;
/// `text` is the body, i.e. `original[body_offset..end_offset]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: SectionName,
    /// Heading as written in the report. `None` for unlabeled gap sections.
    pub heading: Option<String>,
    pub start_offset: usize,
    pub body_offset: usize,
    pub end_offset: usize,
    pub text: String,
}

impl Section {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start_offset && offset < self.end_offset
    }

    /// Body text with surrounding whitespace removed.
    pub fn body(&self) -> &str {
        self.text.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.body().is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Terms
// ═══════════════════════════════════════════════════════════

/// One occurrence of a term in the report text (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPosition {
    pub offset: usize,
    pub length: usize,
    pub section: SectionName,
    /// Index into `ReportRecord::sections` of the containing section.
    pub section_index: usize,
}

impl TermPosition {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// A medical term, unique per canonical form within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Surface form of the first occurrence, as written.
    pub surface_form: String,
    pub canonical_form: String,
    pub category: TermCategory,
    /// Ordered by offset; never empty.
    pub positions: Vec<TermPosition>,
    /// Section of the first occurrence.
    pub section_name: SectionName,
}

impl Term {
    pub fn occurrences(&self) -> usize {
        self.positions.len()
    }
}

// ═══════════════════════════════════════════════════════════
// Conditions
// ═══════════════════════════════════════════════════════════

/// A text region cited as support for a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSpan {
    pub section: SectionName,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionCandidate {
    pub name: String,
    /// Normalized signature match in `[0, 1]`.
    pub score: f32,
    pub matched_terms: BTreeSet<String>,
    pub evidence_spans: Vec<EvidenceSpan>,
}

// ═══════════════════════════════════════════════════════════
// Clinical context
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
    /// All dimensions of a multi-dimensional size ("2.3 x 1.8 cm"); first equals `value`.
    pub dimensions: Vec<f64>,
    pub location: Option<String>,
    /// Byte offset of the number in the report text.
    pub offset: usize,
    pub section: SectionName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContrastAgent {
    pub agent: String,
    pub route: Option<String>,
}

/// Structured clinical fields. Every field may be empty; absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalContext {
    pub history: Option<String>,
    pub techniques: BTreeSet<String>,
    pub measurements: Vec<Measurement>,
    pub contrast: Option<ContrastAgent>,
    pub key_findings: Vec<String>,
}

// ═══════════════════════════════════════════════════════════
// Enrichment
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTerm {
    pub canonical_form: String,
    pub category: TermCategory,
    pub occurrences: usize,
    pub definition: Option<String>,
    pub reference_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCondition {
    pub name: String,
    pub score: f32,
    pub description: Option<String>,
    pub management: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub terms: Vec<EnrichedTerm>,
    pub conditions: Vec<EnrichedCondition>,
}

// ═══════════════════════════════════════════════════════════
// Aggregate root
// ═══════════════════════════════════════════════════════════

/// Pipeline stage, used to attribute non-fatal diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    TermExtraction,
    ConditionPrediction,
    ContextExtraction,
}

/// A stage failure that left its field empty without failing the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDiagnostic {
    pub stage: PipelineStage,
    pub message: String,
}

/// The complete derived-data aggregate for one uploaded report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub filename: String,
    pub original_text: String,
    pub sections: Vec<Section>,
    pub terms: Vec<Term>,
    pub conditions: Vec<ConditionCandidate>,
    pub clinical_context: ClinicalContext,
    pub enriched: EnrichedRecord,
    pub diagnostics: Vec<StageDiagnostic>,
    pub processed_at: DateTime<Utc>,
}

/// Listing row for the report index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub id: String,
    pub filename: String,
    pub processed_at: DateTime<Utc>,
    pub terms: usize,
    pub conditions: usize,
    pub top_condition: Option<String>,
}

impl ReportRecord {
    pub fn sections_named(&self, name: SectionName) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.name == name)
    }

    pub fn term(&self, canonical_form: &str) -> Option<&Term> {
        self.terms
            .iter()
            .find(|t| t.canonical_form.eq_ignore_ascii_case(canonical_form))
    }

    pub fn top_condition(&self) -> Option<&ConditionCandidate> {
        self.conditions.first()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
            processed_at: self.processed_at,
            terms: self.terms.len(),
            conditions: self.conditions.len(),
            top_condition: self.top_condition().map(|c| c.name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: SectionName, start: usize, body: usize, end: usize, text: &str) -> Section {
        Section {
            name,
            heading: None,
            start_offset: start,
            body_offset: body,
            end_offset: end,
            text: text.into(),
        }
    }

    #[test]
    fn section_contains_is_half_open() {
        let s = section(SectionName::Findings, 10, 19, 30, "x");
        assert!(s.contains(10));
        assert!(s.contains(29));
        assert!(!s.contains(30));
        assert!(!s.contains(9));
    }

    #[test]
    fn whitespace_only_section_is_empty() {
        let s = section(SectionName::Impression, 0, 11, 14, " \n ");
        assert!(s.is_empty());
    }

    #[test]
    fn clinical_context_defaults_to_empty() {
        let ctx = ClinicalContext::default();
        assert!(ctx.history.is_none());
        assert!(ctx.measurements.is_empty());
        assert!(ctx.techniques.is_empty());
        assert!(ctx.contrast.is_none());
    }

    #[test]
    fn pipeline_stage_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineStage::ContextExtraction).unwrap();
        assert_eq!(json, "\"context_extraction\"");
    }
}
