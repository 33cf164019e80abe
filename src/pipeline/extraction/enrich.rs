use crate::models::{ConditionCandidate, EnrichedCondition, EnrichedRecord, EnrichedTerm, Term};
use crate::pipeline::catalog::Catalog;

/// Join terms and conditions against the reference tables.
///
/// Every input appears in the output in the same order; rows without a
/// reference entry keep empty enrichment fields.
pub fn enrich(catalog: &Catalog, terms: &[Term], conditions: &[ConditionCandidate]) -> EnrichedRecord {
    let terms: Vec<EnrichedTerm> = terms
        .iter()
        .map(|term| {
            let reference = catalog.term_reference(&term.canonical_form);
            EnrichedTerm {
                canonical_form: term.canonical_form.clone(),
                category: term.category,
                occurrences: term.occurrences(),
                definition: reference.and_then(|r| r.definition.clone()),
                reference_range: reference.and_then(|r| r.reference_range.clone()),
            }
        })
        .collect();

    let conditions: Vec<EnrichedCondition> = conditions
        .iter()
        .map(|condition| {
            let info = catalog.condition_info(&condition.name);
            EnrichedCondition {
                name: condition.name.clone(),
                score: condition.score,
                description: info.and_then(|i| i.description.clone()),
                management: info.and_then(|i| i.management.clone()),
            }
        })
        .collect();

    let defined = terms.iter().filter(|t| t.definition.is_some()).count();
    tracing::debug!(
        terms = terms.len(),
        defined,
        conditions = conditions.len(),
        "Record enriched"
    );
    EnrichedRecord { terms, conditions }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{SectionName, TermCategory, TermPosition};

    fn term(canonical: &str, category: TermCategory) -> Term {
        Term {
            surface_form: canonical.to_uppercase(),
            canonical_form: canonical.into(),
            category,
            positions: vec![
                TermPosition {
                    offset: 0,
                    length: canonical.len(),
                    section: SectionName::Findings,
                    section_index: 0,
                };
                2
            ],
            section_name: SectionName::Findings,
        }
    }

    fn condition(name: &str, score: f32) -> ConditionCandidate {
        ConditionCandidate {
            name: name.into(),
            score,
            matched_terms: BTreeSet::new(),
            evidence_spans: vec![],
        }
    }

    #[test]
    fn known_rows_are_enriched() {
        let catalog = Catalog::shared();
        let record = enrich(
            &catalog,
            &[term("glucose", TermCategory::LabValue)],
            &[condition("Glioma", 0.8)],
        );
        let glucose = &record.terms[0];
        assert_eq!(glucose.occurrences, 2);
        assert!(glucose.definition.is_some());
        assert!(glucose.reference_range.as_deref().unwrap().contains("mg/dL"));

        let glioma = &record.conditions[0];
        assert_eq!(glioma.score, 0.8);
        assert!(glioma.description.is_some());
        assert!(glioma.management.is_some());
    }

    #[test]
    fn unknown_rows_are_kept_without_enrichment() {
        let catalog = Catalog::shared();
        let terms = [
            term("corpus callosum", TermCategory::Anatomy),
            term("mass", TermCategory::Finding),
        ];
        let conditions = [condition("Rare syndrome", 0.3)];
        let record = enrich(&catalog, &terms, &conditions);

        assert_eq!(record.terms.len(), 2);
        assert_eq!(record.terms[0].canonical_form, "corpus callosum");
        assert!(record.terms[0].definition.is_none());
        assert!(record.terms[0].reference_range.is_none());
        assert!(record.terms[1].definition.is_some());
        assert_eq!(record.conditions[0].name, "Rare syndrome");
        assert!(record.conditions[0].description.is_none());
    }

    #[test]
    fn empty_inputs_give_empty_record() {
        let catalog = Catalog::shared();
        assert_eq!(enrich(&catalog, &[], &[]), EnrichedRecord::default());
    }
}
