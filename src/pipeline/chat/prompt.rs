//! Deterministic prompt-context assembly.
//!
//! Blocks are added in fixed priority order: IMPRESSION, FINDINGS, top
//! conditions, clinical context, terms, then the remaining sections in
//! document order. A block that does not fit is cut to the remaining room
//! (when enough room is left to be useful) and assembly stops there.

use std::fmt::Write as _;

use crate::models::{ReportRecord, SectionName};

/// Conditions listed in the context.
const MAX_CONDITIONS: usize = 5;

/// Smallest content worth sending as a truncated block.
const MIN_TRUNCATED_CONTENT: usize = 80;

const BLOCK_SEPARATOR: &str = "\n\n";
const ELLIPSIS: char = '…';

pub const SYSTEM_PROMPT: &str = "You explain a single medical imaging report to the person who received it. \
Answer only from the report context below. If the context does not contain the answer, say so. \
Do not diagnose, do not state conclusions the report does not state, and do not recommend treatment. \
Suggest discussing findings with the clinician who ordered the study.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub text: String,
    /// Labels of the blocks included, in order.
    pub blocks: Vec<String>,
    /// True when lower-priority content was cut or left out.
    pub truncated: bool,
}

/// Build the context for `record` within `budget` characters.
pub fn build_prompt_context(record: &ReportRecord, budget: usize) -> PromptContext {
    let candidates = candidate_blocks(record);

    let mut text = String::new();
    let mut used = 0usize;
    let mut blocks = Vec::new();
    let mut truncated = false;

    for (label, content) in candidates {
        let separator = if blocks.is_empty() { 0 } else { BLOCK_SEPARATOR.len() };
        let rendered = render_block(&label, &content);
        let length = char_len(&rendered);

        if used + separator + length <= budget {
            push_block(&mut text, &rendered, separator > 0);
            used += separator + length;
            blocks.push(label);
            continue;
        }

        truncated = true;
        let overhead = separator + char_len(&render_block(&label, ""));
        let room = budget.saturating_sub(used + overhead);
        if room >= MIN_TRUNCATED_CONTENT {
            let cut = truncate_chars(&content, room - 1);
            let rendered = render_block(&label, &format!("{cut}{ELLIPSIS}"));
            push_block(&mut text, &rendered, separator > 0);
            blocks.push(label);
        }
        break;
    }

    PromptContext {
        text,
        blocks,
        truncated,
    }
}

fn candidate_blocks(record: &ReportRecord) -> Vec<(String, String)> {
    let mut candidates = Vec::new();

    for name in [SectionName::Impression, SectionName::Findings] {
        let body = joined_bodies(record, name);
        if !body.is_empty() {
            candidates.push((name.as_str().to_string(), body));
        }
    }

    if !record.conditions.is_empty() {
        let mut content = String::new();
        for c in record.conditions.iter().take(MAX_CONDITIONS) {
            let matched: Vec<&str> = c.matched_terms.iter().map(String::as_str).collect();
            let _ = writeln!(
                content,
                "- {} (score {:.2}; matched: {})",
                c.name,
                c.score,
                matched.join(", ")
            );
        }
        candidates.push(("LIKELY CONDITIONS".to_string(), content.trim_end().to_string()));
    }

    let context = format_clinical_context(record);
    if !context.is_empty() {
        candidates.push(("CLINICAL CONTEXT".to_string(), context));
    }

    if !record.terms.is_empty() {
        let content = record
            .terms
            .iter()
            .map(|t| format!("- {} ({}, {}x)", t.canonical_form, t.category, t.occurrences()))
            .collect::<Vec<_>>()
            .join("\n");
        candidates.push(("IDENTIFIED TERMS".to_string(), content));
    }

    for section in &record.sections {
        if matches!(section.name, SectionName::Impression | SectionName::Findings) {
            continue;
        }
        let body = section.body().trim();
        if !body.is_empty() {
            candidates.push((section.name.as_str().to_string(), body.to_string()));
        }
    }

    candidates
}

fn joined_bodies(record: &ReportRecord, name: SectionName) -> String {
    record
        .sections_named(name)
        .map(|s| s.body().trim())
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_clinical_context(record: &ReportRecord) -> String {
    let ctx = &record.clinical_context;
    let mut lines = Vec::new();

    if let Some(history) = &ctx.history {
        lines.push(format!("History: {history}"));
    }
    if !ctx.techniques.is_empty() {
        let techniques: Vec<&str> = ctx.techniques.iter().map(String::as_str).collect();
        lines.push(format!("Technique: {}", techniques.join(", ")));
    }
    for m in &ctx.measurements {
        let size = if m.dimensions.len() > 1 {
            m.dimensions
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(" x ")
        } else {
            m.value.to_string()
        };
        match &m.location {
            Some(location) => lines.push(format!("Measurement: {size} {} ({location})", m.unit)),
            None => lines.push(format!("Measurement: {size} {}", m.unit)),
        }
    }
    if let Some(contrast) = &ctx.contrast {
        match &contrast.route {
            Some(route) => lines.push(format!("Contrast: {} ({route})", contrast.agent)),
            None => lines.push(format!("Contrast: {}", contrast.agent)),
        }
    }
    for finding in &ctx.key_findings {
        lines.push(format!("Key finding: {finding}"));
    }

    lines.join("\n")
}

fn render_block(label: &str, content: &str) -> String {
    format!("<{label}>\n{content}\n</{label}>")
}

fn push_block(text: &mut String, rendered: &str, separated: bool) {
    if separated {
        text.push_str(BLOCK_SEPARATOR);
    }
    text.push_str(rendered);
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
