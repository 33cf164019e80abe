use std::collections::{HashMap, HashSet};

use regex::RegexBuilder;

use super::{section_index_at, validate_sections, ExtractionError};
use crate::models::{Section, Term, TermCategory, TermPosition};
use crate::pipeline::catalog::{normalize_surface, Catalog};

/// Keywords of this length or longer are discarded as malformed model output.
const MAX_KEYWORD_LEN: usize = 100;

/// Find every catalog term in `text`, one [`Term`] per canonical form.
///
/// Matching is case-insensitive and word-bounded; where surfaces overlap the
/// longest one at the earliest offset wins. Terms are returned in order of
/// first occurrence and each position records its containing section.
pub fn extract_terms(
    catalog: &Catalog,
    text: &str,
    sections: &[Section],
) -> Result<Vec<Term>, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyText);
    }
    validate_sections(text, sections)?;

    let mut terms: Vec<Term> = Vec::new();
    let mut by_canonical: HashMap<&str, usize> = HashMap::new();

    for m in catalog.term_matcher().find_iter(text) {
        let Some(entry) = catalog.entry_for_surface(m.as_str()) else {
            tracing::debug!(offset = m.start(), "Matched surface missing from index");
            continue;
        };
        let Some(section_index) = section_index_at(sections, m.start()) else {
            continue;
        };
        let position = TermPosition {
            offset: m.start(),
            length: m.len(),
            section: sections[section_index].name,
            section_index,
        };

        match by_canonical.get(entry.canonical_form.as_str()) {
            Some(&i) => terms[i].positions.push(position),
            None => {
                by_canonical.insert(entry.canonical_form.as_str(), terms.len());
                terms.push(Term {
                    surface_form: m.as_str().to_string(),
                    canonical_form: entry.canonical_form.clone(),
                    category: entry.category,
                    section_name: position.section,
                    positions: vec![position],
                });
            }
        }
    }

    tracing::debug!(terms = terms.len(), "Terms extracted");
    Ok(terms)
}

// ═══════════════════════════════════════════════════════════
// Augmentation
// ═══════════════════════════════════════════════════════════

/// A secondary term source (keyword lists, semantic matchers).
///
/// Augmenters propose additional terms; they never see their output override
/// pattern matches, see [`merge_augmented`].
pub trait TermAugmenter: Send + Sync {
    fn augment(&self, text: &str, sections: &[Section]) -> Vec<Term>;
}

/// Augmenter over a fixed keyword list, e.g. the keyword output of a
/// language model parsed with [`parse_keywords`].
pub struct KeywordAugmenter {
    keywords: Vec<String>,
    category: TermCategory,
}

impl KeywordAugmenter {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            category: TermCategory::Finding,
        }
    }

    pub fn with_category(mut self, category: TermCategory) -> Self {
        self.category = category;
        self
    }
}

impl TermAugmenter for KeywordAugmenter {
    fn augment(&self, text: &str, sections: &[Section]) -> Vec<Term> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();

        for keyword in &self.keywords {
            let keyword = keyword.trim_matches(|c: char| !c.is_alphanumeric());
            let canonical = normalize_surface(keyword);
            if canonical.is_empty() || !seen.insert(canonical.clone()) {
                continue;
            }
            let pattern = keyword
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            let Ok(regex) = RegexBuilder::new(&format!(r"\b{pattern}\b"))
                .case_insensitive(true)
                .build()
            else {
                continue;
            };

            let positions: Vec<TermPosition> = regex
                .find_iter(text)
                .filter_map(|m| {
                    let section_index = section_index_at(sections, m.start())?;
                    Some(TermPosition {
                        offset: m.start(),
                        length: m.len(),
                        section: sections[section_index].name,
                        section_index,
                    })
                })
                .collect();

            if let Some(first) = positions.first() {
                terms.push(Term {
                    surface_form: text[first.range()].to_string(),
                    canonical_form: canonical,
                    category: self.category,
                    section_name: first.section,
                    positions,
                });
            }
        }
        terms
    }
}

/// Add augmented terms to the pattern-matched set.
///
/// Pattern terms are never removed or altered. An augmented term is dropped
/// when its canonical form is already present, and any of its positions that
/// overlap a pattern match are discarded.
pub fn merge_augmented(pattern_terms: Vec<Term>, augmented: Vec<Term>) -> Vec<Term> {
    let claimed: Vec<(usize, usize)> = pattern_terms
        .iter()
        .flat_map(|t| t.positions.iter().map(|p| (p.offset, p.offset + p.length)))
        .collect();
    let overlaps = |p: &TermPosition| {
        claimed
            .iter()
            .any(|&(start, end)| p.offset < end && start < p.offset + p.length)
    };

    let mut known: HashSet<String> = pattern_terms
        .iter()
        .map(|t| t.canonical_form.clone())
        .collect();
    let mut merged = pattern_terms;

    for mut term in augmented {
        if known.contains(&term.canonical_form) {
            continue;
        }
        term.positions.retain(|p| !overlaps(p));
        let Some(first) = term.positions.first() else {
            continue;
        };
        term.section_name = first.section;
        known.insert(term.canonical_form.clone());
        merged.push(term);
    }
    merged
}

/// Parse a comma- or newline-separated keyword list.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|k| !k.is_empty() && k.len() < MAX_KEYWORD_LEN)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionName;
    use crate::pipeline::extraction::segment;

    const REPORT: &str = "CLINICAL HISTORY: 45-year-old with headache.\nFINDINGS: 2.3 cm mass in right frontal lobe with contrast enhancement using gadolinium.\nIMPRESSION: Findings suggestive of glioma.";

    fn extract(text: &str) -> Vec<Term> {
        let catalog = Catalog::shared();
        let sections = segment(&catalog, text);
        extract_terms(&catalog, text, &sections).unwrap()
    }

    fn canonical(terms: &[Term]) -> Vec<&str> {
        terms.iter().map(|t| t.canonical_form.as_str()).collect()
    }

    #[test]
    fn end_to_end_terms() {
        let terms = extract(REPORT);
        let found = canonical(&terms);
        for expected in [
            "headache",
            "mass",
            "frontal lobe",
            "contrast enhancement",
            "gadolinium",
            "glioma",
        ] {
            assert!(found.contains(&expected), "missing {expected} in {found:?}");
        }
        let glioma = terms.iter().find(|t| t.canonical_form == "glioma").unwrap();
        assert_eq!(glioma.category, TermCategory::Condition);
        assert_eq!(glioma.section_name, SectionName::Impression);
    }

    #[test]
    fn longest_surface_is_claimed() {
        let terms = extract("FINDINGS: Right lung cancer with hilar lymphadenopathy.");
        let found = canonical(&terms);
        assert!(found.contains(&"lung cancer"));
        assert!(!found.contains(&"lung"));
    }

    #[test]
    fn synonyms_collapse_to_one_term() {
        let terms = extract("FINDINGS: Enhancing lesion. Avid enhancement noted.\nIMPRESSION: Glioblastoma, GBM.");
        let enhancement = terms
            .iter()
            .find(|t| t.canonical_form == "contrast enhancement")
            .unwrap();
        assert_eq!(enhancement.occurrences(), 2);
        assert_eq!(enhancement.surface_form, "Enhancing");
        let glioma = terms.iter().find(|t| t.canonical_form == "glioma").unwrap();
        assert_eq!(glioma.occurrences(), 2);
        assert_eq!(
            terms.iter().filter(|t| t.canonical_form == "glioma").count(),
            1
        );
    }

    #[test]
    fn positions_slice_back_to_a_catalog_surface() {
        let catalog = Catalog::shared();
        let text = "HISTORY: SOB and chest pain.\nFINDINGS: Pleural effusions.\nIMPRESSION: CHF. Elevated   BNP.";
        let sections = segment(&catalog, text);
        let terms = extract_terms(&catalog, text, &sections).unwrap();
        assert!(!terms.is_empty());

        for term in &terms {
            let entry = catalog.entry(&term.canonical_form).unwrap();
            assert!(!term.positions.is_empty());
            for position in &term.positions {
                let slice = &text[position.range()];
                let normalized = normalize_surface(slice);
                assert!(
                    entry.surfaces().any(|s| s == normalized),
                    "{slice:?} is not a surface of {}",
                    term.canonical_form
                );
                let section = &sections[position.section_index];
                assert!(section.contains(position.offset));
                assert_eq!(section.name, position.section);
            }
        }
    }

    #[test]
    fn positions_are_ordered() {
        let terms = extract("FINDINGS: mass, mass and another mass.");
        let mass = terms.iter().find(|t| t.canonical_form == "mass").unwrap();
        let offsets: Vec<usize> = mass.positions.iter().map(|p| p.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
        assert_eq!(offsets.len(), 3);
    }

    #[test]
    fn positions_carry_their_own_section() {
        let terms = extract("HISTORY: headache.\nIMPRESSION: Migraine-type headache.");
        let headache = terms.iter().find(|t| t.canonical_form == "headache").unwrap();
        assert_eq!(headache.section_name, SectionName::History);
        assert_eq!(headache.positions[0].section, SectionName::History);
        assert_eq!(headache.positions[1].section, SectionName::Impression);
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(extract(REPORT), extract(REPORT));
    }

    #[test]
    fn no_terms_in_plain_prose() {
        assert!(extract("The patient arrived on time.").is_empty());
    }

    #[test]
    fn empty_text_is_an_error() {
        let catalog = Catalog::shared();
        assert_eq!(
            extract_terms(&catalog, "  ", &[]),
            Err(ExtractionError::EmptyText)
        );
    }

    #[test]
    fn mismatched_sections_are_rejected() {
        let catalog = Catalog::shared();
        let sections = segment(&catalog, "FINDINGS: mass");
        let err = extract_terms(&catalog, "FINDINGS: mass and more", &sections).unwrap_err();
        assert!(matches!(err, ExtractionError::SectionOutOfBounds { .. }));
    }

    // ── augmentation ──

    #[test]
    fn parse_keywords_splits_and_filters() {
        let long = "x".repeat(120);
        let raw = format!("glioma, frontal mass\n\n  edema ,{long},");
        assert_eq!(
            parse_keywords(&raw),
            vec!["glioma", "frontal mass", "edema"]
        );
    }

    #[test]
    fn keyword_augmenter_finds_new_terms() {
        let catalog = Catalog::shared();
        let text = "FINDINGS: Butterfly pattern across the corpus callosum.";
        let sections = segment(&catalog, text);
        let augmenter = KeywordAugmenter::new(vec!["Corpus Callosum".into(), "absent".into()]);
        let terms = augmenter.augment(text, &sections);
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].canonical_form, "corpus callosum");
        assert_eq!(terms[0].surface_form, "corpus callosum");
        assert_eq!(terms[0].section_name, SectionName::Findings);
    }

    #[test]
    fn merge_never_removes_pattern_terms() {
        let catalog = Catalog::shared();
        let text = "FINDINGS: Frontal mass near the corpus callosum.";
        let sections = segment(&catalog, text);
        let pattern = extract_terms(&catalog, text, &sections).unwrap();
        let augmented = KeywordAugmenter::new(vec![
            "mass".into(),
            "frontal mass".into(),
            "corpus callosum".into(),
        ])
        .augment(text, &sections);

        let merged = merge_augmented(pattern.clone(), augmented);
        assert_eq!(&merged[..pattern.len()], &pattern[..]);
        let added = canonical(&merged[pattern.len()..]);
        // "mass" duplicates a pattern term; "frontal mass" overlaps one.
        assert_eq!(added, vec!["corpus callosum"]);
    }
}
