//! Immutable lookup tables driving the extraction pipeline.
//!
//! Section headers, term surfaces, condition signatures and reference rows
//! are declared as data and compiled once into a [`Catalog`]. The catalog is
//! read-only after construction and shared across threads as `Arc<Catalog>`.

mod conditions;
mod reference;
mod sections;
mod terms;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{SectionName, TermCategory};

const MATCHER_SIZE_LIMIT: usize = 64 * (1 << 20);

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Duplicate {kind}: '{name}'")]
    Duplicate { kind: &'static str, name: String },

    #[error("Condition '{condition}' references unknown term '{term}'")]
    UnknownSignatureTerm { condition: String, term: String },

    #[error("Condition '{condition}' has invalid weight {weight}")]
    InvalidWeight { condition: String, weight: f32 },

    #[error("Condition '{condition}' has an empty signature")]
    EmptySignature { condition: String },
}

// ═══════════════════════════════════════════════════════════
// Declarative entries
// ═══════════════════════════════════════════════════════════

/// Section label and the headings that introduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub name: SectionName,
    pub headings: Vec<String>,
}

/// A canonical term with its category and alternative surface forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    pub canonical_form: String,
    pub category: TermCategory,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl TermEntry {
    /// Canonical form followed by every synonym.
    pub fn surfaces(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_form.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKey {
    /// Matches when the report contains this canonical term.
    Term(String),
    /// Matches when the report contains any term of this category.
    Category(TermCategory),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureTerm {
    pub key: SignatureKey,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSignature {
    pub name: String,
    pub signature: Vec<SignatureTerm>,
}

impl ConditionSignature {
    pub fn total_weight(&self) -> f32 {
        self.signature.iter().map(|t| t.weight).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermReference {
    pub canonical_form: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub reference_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub management: Option<String>,
}

/// Uncompiled catalog content. Also the shape of a catalog extension file,
/// where every table is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
    #[serde(default)]
    pub terms: Vec<TermEntry>,
    #[serde(default)]
    pub signatures: Vec<ConditionSignature>,
    #[serde(default)]
    pub term_reference: Vec<TermReference>,
    #[serde(default)]
    pub condition_reference: Vec<ConditionInfo>,
}

impl CatalogData {
    pub fn builtin() -> Self {
        Self {
            headers: sections::builtin_headers(),
            terms: terms::builtin_terms(),
            signatures: conditions::builtin_signatures(),
            term_reference: reference::builtin_term_reference(),
            condition_reference: reference::builtin_condition_reference(),
        }
    }

    /// Append an extension. Headings for an existing section label are added
    /// to that label; everything else is appended and validated at build time.
    pub fn merge(&mut self, extension: CatalogData) {
        for header in extension.headers {
            match self.headers.iter_mut().find(|h| h.name == header.name) {
                Some(existing) => existing.headings.extend(header.headings),
                None => self.headers.push(header),
            }
        }
        self.terms.extend(extension.terms);
        self.signatures.extend(extension.signatures);
        self.term_reference.extend(extension.term_reference);
        self.condition_reference.extend(extension.condition_reference);
    }
}

// ═══════════════════════════════════════════════════════════
// Compiled catalog
// ═══════════════════════════════════════════════════════════

/// Header regex for one section label.
#[derive(Debug)]
pub struct HeaderPattern {
    pub name: SectionName,
    pub regex: Regex,
}

#[derive(Debug)]
pub struct Catalog {
    headers: Vec<HeaderPattern>,
    terms: Vec<TermEntry>,
    term_matcher: Regex,
    surface_index: HashMap<String, usize>,
    signatures: Vec<ConditionSignature>,
    term_reference: HashMap<String, TermReference>,
    condition_reference: HashMap<String, ConditionInfo>,
}

static SHARED: LazyLock<Arc<Catalog>> = LazyLock::new(|| Arc::new(Catalog::builtin()));

impl Catalog {
    /// Compile the built-in tables.
    pub fn builtin() -> Self {
        Self::from_data(CatalogData::builtin()).expect("Invalid built-in catalog")
    }

    /// Process-wide handle to the built-in catalog, compiled on first use.
    pub fn shared() -> Arc<Catalog> {
        Arc::clone(&SHARED)
    }

    /// Built-in tables extended with the JSON file at `path`.
    pub fn with_extension_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let extension: CatalogData = serde_json::from_str(&raw)?;
        let mut data = CatalogData::builtin();
        data.merge(extension);
        let catalog = Self::from_data(data)?;
        tracing::info!(
            path = %path.display(),
            terms = catalog.terms.len(),
            conditions = catalog.signatures.len(),
            "Catalog extension loaded"
        );
        Ok(catalog)
    }

    pub fn from_data(data: CatalogData) -> Result<Self, CatalogError> {
        let surface_index = index_surfaces(&data.terms)?;
        validate_signatures(&data.signatures, &data.terms)?;

        let headers = data
            .headers
            .iter()
            .map(compile_header)
            .collect::<Result<Vec<_>, _>>()?;
        let term_matcher = compile_term_matcher(&data.terms)?;

        let mut term_reference = HashMap::new();
        for row in data.term_reference {
            let key = normalize_surface(&row.canonical_form);
            if term_reference.insert(key, row.clone()).is_some() {
                return Err(duplicate("term reference", &row.canonical_form));
            }
        }
        let mut condition_reference = HashMap::new();
        for row in data.condition_reference {
            let key = row.name.to_lowercase();
            if condition_reference.insert(key, row.clone()).is_some() {
                return Err(duplicate("condition reference", &row.name));
            }
        }

        Ok(Self {
            headers,
            terms: data.terms,
            term_matcher,
            surface_index,
            signatures: data.signatures,
            term_reference,
            condition_reference,
        })
    }

    pub fn headers(&self) -> &[HeaderPattern] {
        &self.headers
    }

    pub fn terms(&self) -> &[TermEntry] {
        &self.terms
    }

    /// One case-insensitive, word-bounded alternation over every surface form,
    /// longest surface first so the longest match wins at a given offset.
    pub fn term_matcher(&self) -> &Regex {
        &self.term_matcher
    }

    /// Catalog entry for a matched surface (any case, any inner whitespace).
    pub fn entry_for_surface(&self, surface: &str) -> Option<&TermEntry> {
        self.surface_index
            .get(&normalize_surface(surface))
            .map(|&i| &self.terms[i])
    }

    pub fn entry(&self, canonical_form: &str) -> Option<&TermEntry> {
        let key = normalize_surface(canonical_form);
        self.terms.iter().find(|t| t.canonical_form == key)
    }

    pub fn signatures(&self) -> &[ConditionSignature] {
        &self.signatures
    }

    pub fn term_reference(&self, canonical_form: &str) -> Option<&TermReference> {
        self.term_reference.get(&normalize_surface(canonical_form))
    }

    pub fn condition_info(&self, name: &str) -> Option<&ConditionInfo> {
        self.condition_reference.get(&name.to_lowercase())
    }
}

/// Lowercase and collapse runs of whitespace to one space.
pub fn normalize_surface(surface: &str) -> String {
    surface
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn duplicate(kind: &'static str, name: &str) -> CatalogError {
    CatalogError::Duplicate {
        kind,
        name: name.to_string(),
    }
}

fn index_surfaces(terms: &[TermEntry]) -> Result<HashMap<String, usize>, CatalogError> {
    let mut canonical = HashSet::new();
    let mut index = HashMap::new();

    for (i, entry) in terms.iter().enumerate() {
        if entry.canonical_form != normalize_surface(&entry.canonical_form) {
            return Err(CatalogError::InvalidPattern {
                pattern: entry.canonical_form.clone(),
                reason: "canonical form must be lowercase with single spaces".into(),
            });
        }
        if !canonical.insert(entry.canonical_form.as_str()) {
            return Err(duplicate("canonical form", &entry.canonical_form));
        }
        for surface in entry.surfaces() {
            let bounded = surface.chars().next().is_some_and(char::is_alphanumeric)
                && surface.chars().last().is_some_and(char::is_alphanumeric);
            if !bounded {
                return Err(CatalogError::InvalidPattern {
                    pattern: surface.to_string(),
                    reason: "surface must start and end with a letter or digit".into(),
                });
            }
            if index.insert(normalize_surface(surface), i).is_some() {
                return Err(duplicate("surface form", surface));
            }
        }
    }
    Ok(index)
}

fn validate_signatures(
    signatures: &[ConditionSignature],
    terms: &[TermEntry],
) -> Result<(), CatalogError> {
    let known: HashSet<&str> = terms.iter().map(|t| t.canonical_form.as_str()).collect();
    let mut names = HashSet::new();

    for condition in signatures {
        if !names.insert(condition.name.to_lowercase()) {
            return Err(duplicate("condition", &condition.name));
        }
        if condition.signature.is_empty() {
            return Err(CatalogError::EmptySignature {
                condition: condition.name.clone(),
            });
        }
        for term in &condition.signature {
            if !term.weight.is_finite() || term.weight <= 0.0 {
                return Err(CatalogError::InvalidWeight {
                    condition: condition.name.clone(),
                    weight: term.weight,
                });
            }
            if let SignatureKey::Term(canonical) = &term.key {
                if !known.contains(canonical.as_str()) {
                    return Err(CatalogError::UnknownSignatureTerm {
                        condition: condition.name.clone(),
                        term: canonical.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Spaces in a catalog phrase match any run of blanks.
fn phrase_pattern(phrase: &str, blank: &str) -> String {
    phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(blank)
}

/// Headers are recognised at the start of a line, or mid-line after strong
/// punctuation when followed by a colon. Mid-line placement is enforced by the
/// segmenter from the `lead` group.
fn compile_header(entry: &HeaderEntry) -> Result<HeaderPattern, CatalogError> {
    let mut headings: Vec<&String> = entry.headings.iter().collect();
    headings.sort_by_key(|h| std::cmp::Reverse(h.len()));

    let mut seen = HashSet::new();
    let mut alternatives = Vec::new();
    for heading in headings {
        if heading.trim().is_empty() {
            return Err(CatalogError::InvalidPattern {
                pattern: heading.clone(),
                reason: "heading is empty".into(),
            });
        }
        if !seen.insert(normalize_surface(heading)) {
            return Err(duplicate("heading", heading));
        }
        alternatives.push(phrase_pattern(heading, r"[ \t]+"));
    }

    let source = format!(
        r"(?im)(?P<lead>^[ \t]*|[.;!?][ \t]+)(?P<heading>{})[ \t]*(?P<sep>:|-(?:[ \t]|\r?$)|\r?$)",
        alternatives.join("|")
    );
    let regex = Regex::new(&source).map_err(|e| CatalogError::InvalidPattern {
        pattern: entry.name.as_str().to_string(),
        reason: e.to_string(),
    })?;
    Ok(HeaderPattern {
        name: entry.name,
        regex,
    })
}

fn compile_term_matcher(terms: &[TermEntry]) -> Result<Regex, CatalogError> {
    // Stable sort keeps catalog order among surfaces of equal length.
    let mut surfaces: Vec<&str> = terms.iter().flat_map(TermEntry::surfaces).collect();
    surfaces.sort_by_key(|s| std::cmp::Reverse(s.len()));

    let alternation = surfaces
        .iter()
        .map(|s| phrase_pattern(s, r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    // An empty alternation would match everywhere; use a pattern that never matches.
    let source = if alternation.is_empty() {
        r"[^\s\S]".to_string()
    } else {
        format!(r"(?i)\b(?:{alternation})\b")
    };

    RegexBuilder::new(&source)
        .size_limit(MATCHER_SIZE_LIMIT)
        .build()
        .map_err(|e| CatalogError::InvalidPattern {
            pattern: "term matcher".into(),
            reason: e.to_string(),
        })
}
