use std::collections::{BTreeSet, HashSet};

use crate::models::{ConditionCandidate, EvidenceSpan, Section, Term, TermPosition};
use crate::pipeline::catalog::{Catalog, ConditionSignature, SignatureKey};

/// Candidates scoring below this are not reported.
pub const MIN_SCORE: f32 = 0.15;

/// Score every catalog condition against the report's terms.
///
/// A condition's score is the matched share of its signature weight, so it
/// lies in `[0, 1]` and never decreases as matching terms are added. A term
/// may support any number of conditions. The result is sorted by descending
/// score; ties keep catalog order.
pub fn predict(catalog: &Catalog, terms: &[Term], sections: &[Section]) -> Vec<ConditionCandidate> {
    let mut candidates: Vec<ConditionCandidate> = catalog
        .signatures()
        .iter()
        .filter_map(|signature| score(signature, terms, sections))
        .filter(|c| c.score >= MIN_SCORE)
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.name.to_lowercase()));

    tracing::debug!(
        conditions = candidates.len(),
        top = candidates.first().map(|c| c.name.as_str()),
        "Conditions predicted"
    );
    candidates
}

fn score(
    signature: &ConditionSignature,
    terms: &[Term],
    sections: &[Section],
) -> Option<ConditionCandidate> {
    let total = signature.total_weight();
    if total <= 0.0 {
        return None;
    }

    let mut matched_weight = 0.0;
    let mut supporting: Vec<&Term> = Vec::new();
    for entry in &signature.signature {
        let hits: Vec<&Term> = terms
            .iter()
            .filter(|t| match &entry.key {
                SignatureKey::Term(canonical) => t.canonical_form == *canonical,
                SignatureKey::Category(category) => t.category == *category,
            })
            .collect();
        if !hits.is_empty() {
            matched_weight += entry.weight;
            supporting.extend(hits);
        }
    }
    if supporting.is_empty() {
        return None;
    }

    let matched_terms: BTreeSet<String> = supporting
        .iter()
        .map(|t| t.canonical_form.clone())
        .collect();
    let mut evidence_spans: Vec<EvidenceSpan> = supporting
        .iter()
        .flat_map(|t| t.positions.iter())
        .map(|p| evidence_span(p, sections))
        .collect();
    evidence_spans.sort_by_key(|s| (s.start, s.end));
    evidence_spans.dedup();

    Some(ConditionCandidate {
        name: signature.name.clone(),
        score: (matched_weight / total).clamp(0.0, 1.0),
        matched_terms,
        evidence_spans,
    })
}

/// The sentence around a term occurrence, clipped to its section. Falls back
/// to the bare occurrence when the section is not available.
fn evidence_span(position: &TermPosition, sections: &[Section]) -> EvidenceSpan {
    let bare = EvidenceSpan {
        section: position.section,
        start: position.offset,
        end: position.offset + position.length,
    };
    let Some(section) = sections.get(position.section_index) else {
        return bare;
    };
    let Some(relative) = position.offset.checked_sub(section.body_offset) else {
        return bare;
    };
    if relative >= section.text.len() {
        return bare;
    }

    let (start, end) = super::sentence_bounds(&section.text, relative);
    EvidenceSpan {
        section: position.section,
        start: section.body_offset + start,
        end: section.body_offset + end,
    }
}
