//! Section heading catalog.

use super::HeaderEntry;
use crate::models::SectionName;

/// Known headings per section, as they appear in radiology, pathology and lab
/// reports. Matching is case-insensitive and tolerant of repeated spaces.
const HEADINGS: &[(SectionName, &[&str])] = &[
    (
        SectionName::History,
        &[
            "CLINICAL HISTORY",
            "HISTORY",
            "CLINICAL INFORMATION",
            "CLINICAL INDICATION",
            "CLINICAL INDICATIONS",
            "CLINICAL DATA",
            "INDICATION",
            "INDICATIONS",
            "REASON FOR EXAM",
            "REASON FOR EXAMINATION",
            "REASON FOR STUDY",
        ],
    ),
    (
        SectionName::Technique,
        &[
            "TECHNIQUE",
            "TECHNIQUES",
            "PROCEDURE",
            "PROTOCOL",
            "EXAMINATION",
            "EXAM",
        ],
    ),
    (
        SectionName::Comparison,
        &["COMPARISON", "COMPARISONS", "PRIOR STUDY", "PRIOR STUDIES"],
    ),
    (
        SectionName::Findings,
        &["FINDINGS", "FINDING", "OBSERVATIONS", "RESULTS", "RESULT"],
    ),
    (
        SectionName::Impression,
        &[
            "IMPRESSION",
            "IMPRESSIONS",
            "CONCLUSION",
            "CONCLUSIONS",
            "ASSESSMENT",
            "DIAGNOSIS",
            "SUMMARY",
            "OPINION",
            "INTERPRETATION",
        ],
    ),
    (
        SectionName::Recommendation,
        &[
            "RECOMMENDATION",
            "RECOMMENDATIONS",
            "PLAN",
            "FOLLOW-UP",
            "FOLLOW UP",
        ],
    ),
];

pub(super) fn builtin_headers() -> Vec<HeaderEntry> {
    HEADINGS
        .iter()
        .map(|(name, headings)| HeaderEntry {
            name: *name,
            headings: headings.iter().map(|h| h.to_string()).collect(),
        })
        .collect()
}
