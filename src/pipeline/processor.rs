//! Report processing orchestrator.
//!
//! Drives one report through the extraction stages:
//! segment → terms → (conditions ∥ context) → enrich.
//!
//! Stage failures are non-fatal: the affected field is left empty and a
//! `StageDiagnostic` is recorded. Only unusable input fails the whole report.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use chrono::Utc;

use crate::models::{
    ClinicalContext, ConditionCandidate, PipelineStage, ReportRecord, Section, StageDiagnostic,
    Term,
};
use crate::pipeline::catalog::Catalog;
use crate::pipeline::extraction::{
    enrich, extract_context, extract_terms, merge_augmented, predict, segment, ExtractionError,
    TermAugmenter,
};
use crate::pipeline::pdf::SourceError;
use crate::pipeline::store::StoreError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Input that cannot be processed at all. No record is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Report text is empty")]
    EmptyText,
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Text extraction failed: {0}")]
    Source(#[from] SourceError),

    #[error("Report store error: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs the extraction pipeline over one report text.
///
/// Holds only the shared read-only catalog, so one processor serves any
/// number of concurrent calls.
pub struct ReportProcessor {
    catalog: Arc<Catalog>,
}

impl ReportProcessor {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Process `text` into a complete record.
    pub fn process(
        &self,
        id: &str,
        filename: &str,
        text: &str,
    ) -> Result<ReportRecord, InputError> {
        self.process_with(id, filename, text, None)
    }

    /// Process with an optional secondary term source. Augmented terms are
    /// merged after pattern extraction and never replace pattern matches.
    pub fn process_with(
        &self,
        id: &str,
        filename: &str,
        text: &str,
        augmenter: Option<&dyn TermAugmenter>,
    ) -> Result<ReportRecord, InputError> {
        self.run_stages(id, filename, text, augmenter, predict, extract_context)
    }

    fn run_stages<P, C>(
        &self,
        id: &str,
        filename: &str,
        text: &str,
        augmenter: Option<&dyn TermAugmenter>,
        predict_stage: P,
        context_stage: C,
    ) -> Result<ReportRecord, InputError>
    where
        P: FnOnce(&Catalog, &[Term], &[Section]) -> Vec<ConditionCandidate> + Send,
        C: FnOnce(&[Section]) -> Result<ClinicalContext, ExtractionError> + Send,
    {
        if text.trim().is_empty() {
            return Err(InputError::EmptyText);
        }
        let started = Instant::now();
        let catalog = self.catalog.as_ref();
        let mut diagnostics = Vec::new();

        tracing::info!(report_id = %id, chars = text.len(), "Processing: segmenting report");
        let sections = segment(catalog, text);

        let mut terms = match extract_terms(catalog, text, &sections) {
            Ok(terms) => terms,
            Err(e) => {
                diagnostics.push(diagnostic(id, PipelineStage::TermExtraction, e.to_string()));
                Vec::new()
            }
        };
        if let Some(augmenter) = augmenter {
            let before = terms.len();
            terms = merge_augmented(terms, augmenter.augment(text, &sections));
            tracing::debug!(report_id = %id, added = terms.len() - before, "Terms augmented");
        }

        let (conditions, clinical_context) = join_stages(
            id,
            || predict_stage(catalog, &terms, &sections),
            || context_stage(&sections),
            &mut diagnostics,
        );

        let enriched = enrich(catalog, &terms, &conditions);

        tracing::info!(
            report_id = %id,
            sections = sections.len(),
            terms = terms.len(),
            conditions = conditions.len(),
            top_condition = conditions.first().map(|c| c.name.as_str()),
            diagnostics = diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Processing complete"
        );

        Ok(ReportRecord {
            id: id.to_string(),
            filename: filename.to_string(),
            original_text: text.to_string(),
            sections,
            terms,
            conditions,
            clinical_context,
            enriched,
            diagnostics,
            processed_at: Utc::now(),
        })
    }
}

/// Run condition prediction and context extraction on their own threads and
/// wait for both. They share only read-only inputs. A stage that errors or
/// panics leaves its field empty and adds a diagnostic.
fn join_stages<P, C>(
    id: &str,
    predict_stage: P,
    context_stage: C,
    diagnostics: &mut Vec<StageDiagnostic>,
) -> (Vec<ConditionCandidate>, ClinicalContext)
where
    P: FnOnce() -> Vec<ConditionCandidate> + Send,
    C: FnOnce() -> Result<ClinicalContext, ExtractionError> + Send,
{
    let (conditions, context) = thread::scope(|scope| {
        let predictor = scope.spawn(predict_stage);
        let extractor = scope.spawn(context_stage);
        (predictor.join(), extractor.join())
    });

    let conditions = conditions.unwrap_or_else(|_| {
        diagnostics.push(diagnostic(
            id,
            PipelineStage::ConditionPrediction,
            "condition prediction panicked".into(),
        ));
        Vec::new()
    });
    let context = match context {
        Ok(Ok(context)) => context,
        Ok(Err(e)) => {
            diagnostics.push(diagnostic(id, PipelineStage::ContextExtraction, e.to_string()));
            ClinicalContext::default()
        }
        Err(_) => {
            diagnostics.push(diagnostic(
                id,
                PipelineStage::ContextExtraction,
                "context extraction panicked".into(),
            ));
            ClinicalContext::default()
        }
    };
    (conditions, context)
}

fn diagnostic(id: &str, stage: PipelineStage, message: String) -> StageDiagnostic {
    tracing::warn!(report_id = %id, stage = ?stage, error = %message, "Stage failed, field left empty");
    StageDiagnostic { stage, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SectionName, TermCategory};
    use crate::pipeline::extraction::KeywordAugmenter;

    const REPORT: &str = "CLINICAL HISTORY: 45-year-old with headache.\nFINDINGS: 2.3 cm mass in right frontal lobe with contrast enhancement using gadolinium.\nIMPRESSION: Findings suggestive of glioma.";

    fn processor() -> ReportProcessor {
        ReportProcessor::new(Catalog::shared())
    }

    #[test]
    fn end_to_end_record() {
        let record = processor().process("r1", "mri.txt", REPORT).unwrap();

        assert_eq!(record.id, "r1");
        assert_eq!(record.filename, "mri.txt");
        assert_eq!(record.original_text, REPORT);
        assert!(record.diagnostics.is_empty());

        let history = record.sections_named(SectionName::History).next().unwrap();
        assert!(history.text.contains("45-year-old with headache"));
        let findings = record.sections_named(SectionName::Findings).next().unwrap();
        assert!(findings.text.contains("2.3 cm mass"));
        let impression = record.sections_named(SectionName::Impression).next().unwrap();
        assert!(impression.text.contains("glioma"));

        let ctx = &record.clinical_context;
        assert_eq!(ctx.measurements[0].value, 2.3);
        assert_eq!(ctx.measurements[0].unit, "cm");
        assert_eq!(ctx.contrast.as_ref().unwrap().agent, "gadolinium");

        let top = record.top_condition().unwrap();
        assert_eq!(top.name, "Glioma");
        assert!(top.score > crate::pipeline::extraction::MIN_SCORE);
        assert!(top.matched_terms.contains("glioma"));

        assert_eq!(record.enriched.terms.len(), record.terms.len());
        assert_eq!(record.enriched.conditions.len(), record.conditions.len());
        assert!(record.enriched.conditions[0].description.is_some());
    }

    #[test]
    fn empty_text_fails_fast() {
        assert_eq!(
            processor().process("r1", "empty.txt", " \n\t").unwrap_err(),
            InputError::EmptyText
        );
    }

    #[test]
    fn text_without_matches_yields_empty_fields() {
        let record = processor()
            .process("r2", "note.txt", "The patient arrived on time.")
            .unwrap();
        assert_eq!(record.sections.len(), 1);
        assert!(record.terms.is_empty());
        assert!(record.conditions.is_empty());
        assert_eq!(record.clinical_context, ClinicalContext::default());
        assert!(record.diagnostics.is_empty());
    }

    #[test]
    fn augmenter_adds_but_never_replaces() {
        let augmenter = KeywordAugmenter::new(vec!["glioma".into(), "suggestive".into()])
            .with_category(TermCategory::Finding);
        let plain = processor().process("r3", "a.txt", REPORT).unwrap();
        let augmented = processor()
            .process_with("r3", "a.txt", REPORT, Some(&augmenter))
            .unwrap();

        assert_eq!(&augmented.terms[..plain.terms.len()], &plain.terms[..]);
        let extra: Vec<&str> = augmented.terms[plain.terms.len()..]
            .iter()
            .map(|t| t.canonical_form.as_str())
            .collect();
        assert_eq!(extra, vec!["suggestive"]);
    }

    #[test]
    fn panicking_predictor_leaves_rest_of_record() {
        let record = processor()
            .run_stages(
                "r5",
                "a.txt",
                REPORT,
                None,
                |_, _, _| panic!("predictor failed"),
                extract_context,
            )
            .unwrap();

        assert!(record.conditions.is_empty());
        assert!(record.enriched.conditions.is_empty());
        assert_eq!(
            record.diagnostics,
            vec![StageDiagnostic {
                stage: PipelineStage::ConditionPrediction,
                message: "condition prediction panicked".into(),
            }]
        );
        assert!(record.term("glioma").is_some());
        assert_eq!(record.clinical_context.measurements[0].value, 2.3);
        assert_eq!(record.enriched.terms.len(), record.terms.len());
    }

    #[test]
    fn failing_context_stage_is_a_diagnostic() {
        let record = processor()
            .run_stages("r6", "a.txt", REPORT, None, predict, |_| {
                Err(ExtractionError::EmptyText)
            })
            .unwrap();

        assert_eq!(record.clinical_context, ClinicalContext::default());
        assert_eq!(record.diagnostics.len(), 1);
        assert_eq!(record.diagnostics[0].stage, PipelineStage::ContextExtraction);
        assert_eq!(record.diagnostics[0].message, "Report text is empty");
        assert_eq!(record.top_condition().unwrap().name, "Glioma");
    }

    #[test]
    fn processing_is_deterministic() {
        let a = processor().process("r4", "a.txt", REPORT).unwrap();
        let b = processor().process("r4", "a.txt", REPORT).unwrap();
        assert_eq!(a.sections, b.sections);
        assert_eq!(a.terms, b.terms);
        assert_eq!(a.conditions, b.conditions);
        assert_eq!(a.clinical_context, b.clinical_context);
    }
}
