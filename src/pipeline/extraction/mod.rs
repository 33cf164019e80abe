//! Text-to-structure extraction stages.
//!
//! Each stage is a pure function over the shared [`Catalog`](super::catalog::Catalog)
//! and its inputs. "Nothing found" is always an empty result; errors are
//! reserved for malformed input such as a caller-supplied section list that
//! does not tile the text.

pub mod conditions;
pub mod context;
pub mod enrich;
pub mod segment;
pub mod terms;

pub use conditions::{predict, MIN_SCORE};
pub use context::extract_context;
pub use enrich::enrich;
pub use segment::segment;
pub use terms::{extract_terms, merge_augmented, parse_keywords, KeywordAugmenter, TermAugmenter};

use thiserror::Error;

use crate::models::Section;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Report text is empty")]
    EmptyText,

    #[error("Section {index} span {start}..{end} is outside the text (length {len})")]
    SectionOutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Section {index} does not start where the previous one ends")]
    SectionsUnordered { index: usize },
}

/// Check that `sections` tile `text` exactly: ordered, contiguous, in bounds,
/// on character boundaries, with each body slice matching the text.
pub fn validate_sections(text: &str, sections: &[Section]) -> Result<(), ExtractionError> {
    let mut expected_start = 0;
    for (index, section) in sections.iter().enumerate() {
        let out_of_bounds = || ExtractionError::SectionOutOfBounds {
            index,
            start: section.start_offset,
            end: section.end_offset,
            len: text.len(),
        };

        if section.start_offset != expected_start {
            return Err(ExtractionError::SectionsUnordered { index });
        }
        if section.body_offset < section.start_offset
            || section.end_offset < section.body_offset
            || section.end_offset > text.len()
        {
            return Err(out_of_bounds());
        }
        match text.get(section.body_offset..section.end_offset) {
            Some(body) if body == section.text => {}
            _ => return Err(out_of_bounds()),
        }
        expected_start = section.end_offset;
    }

    if expected_start != text.len() {
        return Err(ExtractionError::SectionOutOfBounds {
            index: sections.len(),
            start: expected_start,
            end: text.len(),
            len: text.len(),
        });
    }
    Ok(())
}

/// Check ordering and internal consistency when the full text is not at hand.
pub(crate) fn validate_section_order(sections: &[Section]) -> Result<(), ExtractionError> {
    let mut previous_end = 0;
    for (index, section) in sections.iter().enumerate() {
        if section.start_offset < previous_end {
            return Err(ExtractionError::SectionsUnordered { index });
        }
        let body_len = section.end_offset.checked_sub(section.body_offset);
        if section.body_offset < section.start_offset || body_len != Some(section.text.len()) {
            return Err(ExtractionError::SectionOutOfBounds {
                index,
                start: section.start_offset,
                end: section.end_offset,
                len: section.text.len(),
            });
        }
        previous_end = section.end_offset;
    }
    Ok(())
}

/// Index of the section containing byte `offset`, assuming validated sections.
pub(crate) fn section_index_at(sections: &[Section], offset: usize) -> Option<usize> {
    let index = sections.partition_point(|s| s.end_offset <= offset);
    sections
        .get(index)
        .filter(|s| s.contains(offset))
        .map(|_| index)
}

fn is_sentence_break(bytes: &[u8], i: usize) -> bool {
    match bytes[i] {
        b'\n' => true,
        b'!' | b'?' => bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace()),
        // "2.3 cm" and "1. Mass" are not boundaries.
        b'.' => {
            bytes.get(i + 1).map_or(true, |b| b.is_ascii_whitespace())
                && !(i > 0 && bytes[i - 1].is_ascii_digit())
        }
        _ => false,
    }
}

/// Bounds of the sentence around byte `at` in `text`, trimmed of surrounding
/// whitespace. Sentences end at `.`, `!` or `?` followed by whitespace, or at a
/// newline.
pub(crate) fn sentence_bounds(text: &str, at: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let at = at.min(text.len());

    let mut start = (0..at)
        .rev()
        .find(|&i| is_sentence_break(bytes, i))
        .map_or(0, |i| i + 1);
    let mut end = (at..text.len())
        .find(|&i| is_sentence_break(bytes, i))
        .map_or(text.len(), |i| if bytes[i] == b'\n' { i } else { i + 1 });

    while start < end && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    (start, end)
}

/// Split `text` into trimmed, non-empty sentences and list lines.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        if is_sentence_break(bytes, i) {
            let end = if bytes[i] == b'\n' { i } else { i + 1 };
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = i + 1;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionName;

    fn section(start: usize, body: usize, text: &str, full: &str) -> Section {
        Section {
            name: SectionName::Unlabeled,
            heading: None,
            start_offset: start,
            body_offset: body,
            end_offset: body + text.len(),
            text: full[body..body + text.len()].to_string(),
        }
    }

    #[test]
    fn validate_accepts_exact_tiling() {
        let text = "abc def";
        let sections = vec![section(0, 0, "abc", text), section(3, 3, " def", text)];
        assert!(validate_sections(text, &sections).is_ok());
    }

    #[test]
    fn validate_rejects_gap() {
        let text = "abc def";
        let sections = vec![section(0, 0, "abc", text), section(4, 4, "def", text)];
        assert_eq!(
            validate_sections(text, &sections),
            Err(ExtractionError::SectionsUnordered { index: 1 })
        );
    }

    #[test]
    fn validate_rejects_short_coverage() {
        let text = "abc def";
        let sections = vec![section(0, 0, "abc", text)];
        assert!(matches!(
            validate_sections(text, &sections),
            Err(ExtractionError::SectionOutOfBounds { index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_out_of_bounds() {
        let text = "abc";
        let sections = vec![Section {
            name: SectionName::Findings,
            heading: None,
            start_offset: 0,
            body_offset: 0,
            end_offset: 10,
            text: "abc".into(),
        }];
        assert!(matches!(
            validate_sections(text, &sections),
            Err(ExtractionError::SectionOutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn empty_text_with_no_sections_is_valid() {
        assert!(validate_sections("", &[]).is_ok());
    }

    #[test]
    fn section_index_lookup() {
        let text = "abc def";
        let sections = vec![section(0, 0, "abc", text), section(3, 3, " def", text)];
        assert_eq!(section_index_at(&sections, 0), Some(0));
        assert_eq!(section_index_at(&sections, 2), Some(0));
        assert_eq!(section_index_at(&sections, 3), Some(1));
        assert_eq!(section_index_at(&sections, 7), None);
    }

    #[test]
    fn sentence_bounds_ignore_decimal_points() {
        let text = "Normal brain. A 2.3 cm mass is seen. No edema.";
        let at = text.find("mass").unwrap();
        let (start, end) = sentence_bounds(text, at);
        assert_eq!(&text[start..end], "A 2.3 cm mass is seen.");
    }

    #[test]
    fn sentences_split_lines_and_periods() {
        let text = "1. Mass in the frontal lobe.\n2. No hemorrhage. Mild edema.\n\n";
        assert_eq!(
            sentences(text),
            vec!["1. Mass in the frontal lobe.", "2. No hemorrhage.", "Mild edema."]
        );
    }
}
