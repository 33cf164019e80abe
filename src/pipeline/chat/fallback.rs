//! Replies built from the record alone, used when the model is unreachable.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ReportRecord, SectionName, Term};

const MAX_CONDITIONS: usize = 5;
const MAX_QUOTE_CHARS: usize = 300;

static CONDITION_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:conditions?|diagnos\w*|diseases?)\b").expect("Invalid condition regex")
});

/// Deterministic answer to `message` from `record`.
pub fn fallback_reply(record: &ReportRecord, message: &str) -> String {
    if CONDITION_QUESTION.is_match(message) {
        return conditions_reply(record);
    }

    let lowered = message.to_lowercase();
    if let Some(term) = mentioned_term(record, &lowered) {
        return term_reply(record, term);
    }
    if let Some(name) = mentioned_section(&lowered) {
        return section_reply(record, name);
    }

    format!(
        "The language model is currently unavailable, so I can only answer from the extracted data. \
This report has {} section(s), {} identified term(s) and {} possible condition(s). \
Ask about a condition, a term or a section such as FINDINGS or IMPRESSION.",
        record.sections.len(),
        record.terms.len(),
        record.conditions.len()
    )
}

fn conditions_reply(record: &ReportRecord) -> String {
    if record.conditions.is_empty() {
        return "No conditions were identified from the terms in this report.".to_string();
    }
    let listed = record
        .conditions
        .iter()
        .take(MAX_CONDITIONS)
        .enumerate()
        .map(|(i, c)| format!("{}. {} (score {:.2})", i + 1, c.name, c.score))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Conditions suggested by the terms in this report, highest score first:\n{listed}\n\
These scores reflect term matches only and are not a diagnosis."
    )
}

fn term_reply(record: &ReportRecord, term: &Term) -> String {
    let mut reply = format!(
        "The report mentions \"{}\" ({}) {} time(s), first in the {} section.",
        term.canonical_form,
        term.category,
        term.occurrences(),
        term.section_name
    );
    let definition = record
        .enriched
        .terms
        .iter()
        .find(|e| e.canonical_form == term.canonical_form)
        .and_then(|e| e.definition.as_deref());
    if let Some(definition) = definition {
        reply.push(' ');
        reply.push_str(definition);
    }
    reply
}

fn section_reply(record: &ReportRecord, name: SectionName) -> String {
    let body = record
        .sections_named(name)
        .map(|s| s.body().trim())
        .find(|b| !b.is_empty());
    match body {
        Some(body) => {
            let quote: String = body.chars().take(MAX_QUOTE_CHARS).collect();
            let ellipsis = if quote.len() < body.len() { "…" } else { "" };
            format!("The {name} section reads: \"{quote}{ellipsis}\"")
        }
        None => format!("This report has no {name} section."),
    }
}

/// First term (in record order) whose canonical or surface form appears in
/// the message as a whole phrase. Longer forms win over shorter ones.
fn mentioned_term<'a>(record: &'a ReportRecord, lowered: &str) -> Option<&'a Term> {
    record
        .terms
        .iter()
        .filter_map(|t| {
            [&t.canonical_form, &t.surface_form]
                .into_iter()
                .map(|form| form.to_lowercase())
                .filter(|form| contains_phrase(lowered, form))
                .map(|form| form.len())
                .max()
                .map(|len| (len, t))
        })
        .fold(None, |best: Option<(usize, &Term)>, (len, t)| match best {
            Some((best_len, _)) if best_len >= len => best,
            _ => Some((len, t)),
        })
        .map(|(_, t)| t)
}

fn mentioned_section(lowered: &str) -> Option<SectionName> {
    SectionName::all()
        .iter()
        .copied()
        .filter(|n| *n != SectionName::Unlabeled)
        .find(|n| {
            let word = n.as_str().to_lowercase();
            contains_phrase(lowered, &word)
                || contains_phrase(lowered, word.trim_end_matches('s'))
        })
}

fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
