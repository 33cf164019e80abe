//! Numeric chart inputs for the rendering front end.
//!
//! Only counts, lengths, scores and catalog labels leave this module; report
//! text never does.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ReportRecord, SectionName, TermCategory};

const TOP_TERMS: usize = 10;
const TOP_CONDITIONS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: TermCategory,
    /// Distinct terms in the category.
    pub terms: usize,
    /// Total occurrences of those terms.
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermFrequency {
    pub term: String,
    pub category: TermCategory,
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionLength {
    /// Section name, with an ordinal suffix for repeated sections ("FINDINGS (2)").
    pub label: String,
    pub section: SectionName,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionScore {
    pub name: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartInputs {
    pub category_counts: Vec<CategoryCount>,
    pub top_terms: Vec<TermFrequency>,
    pub section_lengths: Vec<SectionLength>,
    pub condition_scores: Vec<ConditionScore>,
}

pub fn chart_inputs(record: &ReportRecord) -> ChartInputs {
    let category_counts = TermCategory::all()
        .iter()
        .filter_map(|&category| {
            let (terms, occurrences) = record
                .terms
                .iter()
                .filter(|t| t.category == category)
                .fold((0, 0), |(n, occ), t| (n + 1, occ + t.occurrences()));
            (terms > 0).then_some(CategoryCount {
                category,
                terms,
                occurrences,
            })
        })
        .collect();

    // Stable sort: ties keep first-occurrence order.
    let mut top_terms: Vec<TermFrequency> = record
        .terms
        .iter()
        .map(|t| TermFrequency {
            term: t.canonical_form.clone(),
            category: t.category,
            occurrences: t.occurrences(),
        })
        .collect();
    top_terms.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    top_terms.truncate(TOP_TERMS);

    let totals = record.sections.iter().fold(HashMap::new(), |mut acc, s| {
        *acc.entry(s.name).or_insert(0usize) += 1;
        acc
    });
    let mut seen: HashMap<SectionName, usize> = HashMap::new();
    let section_lengths = record
        .sections
        .iter()
        .map(|section| {
            let ordinal = seen.entry(section.name).or_insert(0);
            *ordinal += 1;
            let label = if totals.get(&section.name).copied().unwrap_or(0) > 1 {
                format!("{} ({})", section.name, ordinal)
            } else {
                section.name.to_string()
            };
            SectionLength {
                label,
                section: section.name,
                length: section.body().len(),
            }
        })
        .collect();

    let condition_scores = record
        .conditions
        .iter()
        .take(TOP_CONDITIONS)
        .map(|c| ConditionScore {
            name: c.name.clone(),
            score: c.score,
        })
        .collect();

    ChartInputs {
        category_counts,
        top_terms,
        section_lengths,
        condition_scores,
    }
}
