use std::cmp::Reverse;

use crate::models::{Section, SectionName};
use crate::pipeline::catalog::Catalog;

/// A recognised header occurrence.
#[derive(Debug)]
struct HeaderMatch {
    name: SectionName,
    heading: String,
    /// Start of the heading word(s).
    start: usize,
    /// First byte after the separator; the section body starts here.
    body: usize,
}

/// Split report text into named sections.
///
/// The result tiles `[0, text.len())` with no gaps or overlaps. Text before the
/// first header becomes an UNLABELED prologue; text with no headers at all is a
/// single UNLABELED section. Repeated headers produce separate sections and a
/// header immediately followed by another keeps its (empty) section.
pub fn segment(catalog: &Catalog, text: &str) -> Vec<Section> {
    if text.is_empty() {
        return Vec::new();
    }

    let headers = find_headers(catalog, text);
    let mut sections = Vec::with_capacity(headers.len() + 1);

    let first_start = headers.first().map_or(text.len(), |h| h.start);
    if first_start > 0 {
        sections.push(Section {
            name: SectionName::Unlabeled,
            heading: None,
            start_offset: 0,
            body_offset: 0,
            end_offset: first_start,
            text: text[..first_start].to_string(),
        });
    }

    for (i, header) in headers.iter().enumerate() {
        let end = headers.get(i + 1).map_or(text.len(), |next| next.start);
        sections.push(Section {
            name: header.name,
            heading: Some(header.heading.clone()),
            start_offset: header.start,
            body_offset: header.body,
            end_offset: end,
            text: text[header.body..end].to_string(),
        });
    }

    tracing::debug!(
        headers = headers.len(),
        sections = sections.len(),
        "Report segmented"
    );
    sections
}

/// All header occurrences in text order, overlaps resolved in favour of the
/// earliest and then longest match.
fn find_headers(catalog: &Catalog, text: &str) -> Vec<HeaderMatch> {
    let mut found = Vec::new();

    for pattern in catalog.headers() {
        for caps in pattern.regex.captures_iter(text) {
            let (Some(lead), Some(heading), Some(sep)) =
                (caps.name("lead"), caps.name("heading"), caps.name("sep"))
            else {
                continue;
            };
            // Mid-line headers need an explicit colon.
            let mid_line = lead.as_str().starts_with(['.', ';', '!', '?']);
            if mid_line && sep.as_str() != ":" {
                continue;
            }
            found.push(HeaderMatch {
                name: pattern.name,
                heading: heading.as_str().to_string(),
                start: heading.start(),
                body: sep.end(),
            });
        }
    }

    found.sort_by_key(|h| (h.start, Reverse(h.body)));

    let mut accepted: Vec<HeaderMatch> = Vec::with_capacity(found.len());
    for header in found {
        if accepted.last().map_or(true, |prev| header.start >= prev.body) {
            accepted.push(header);
        }
    }
    accepted
}
