//! Process-scoped application state.
//!
//! `CoreState` owns the report store, the processor and the chat service.
//! It is built once at startup, wrapped in `Arc`, and handed to the API
//! layer. Dropping it clears every stored report.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{ReportRecord, ReportSummary};
use crate::pipeline::catalog::{Catalog, CatalogError};
use crate::pipeline::chat::{ChatError, ChatReply, ChatService, ChatTurn, LlmClient, OllamaClient};
use crate::pipeline::extraction::KeywordAugmenter;
use crate::pipeline::pdf::extract_upload;
use crate::pipeline::processor::{ProcessingError, ReportProcessor};
use crate::pipeline::store::{ReportStore, StoreError};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    store: ReportStore,
    processor: ReportProcessor,
    chat: ChatService,
    config: AppConfig,
}

impl CoreState {
    /// Build from configuration: load the catalog (with the optional
    /// extension file) and connect the chat client.
    pub fn from_config(config: AppConfig) -> Result<Self, CoreError> {
        let catalog = match &config.catalog_path {
            Some(path) => Arc::new(Catalog::with_extension_file(path)?),
            None => Catalog::shared(),
        };
        let client = OllamaClient::new(&config.llm_url, config.llm_timeout_secs)?;
        Ok(Self::with_parts(config, catalog, Arc::new(client)))
    }

    /// Build from explicit parts. Tests pass a mock chat client here.
    pub fn with_parts(config: AppConfig, catalog: Arc<Catalog>, client: Arc<dyn LlmClient>) -> Self {
        let chat = ChatService::new(
            client,
            &config.llm_model,
            config.llm_retries,
            config.prompt_budget,
        );
        Self {
            store: ReportStore::new(),
            processor: ReportProcessor::new(catalog),
            chat,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    pub fn chat_model(&self) -> &str {
        self.chat.model()
    }

    // -----------------------------------------------------------------------
    // Report operations
    // -----------------------------------------------------------------------

    /// Process `text` and store the record under `id`, replacing any
    /// previous record atomically. Keywords, when given, augment the
    /// pattern-matched terms.
    pub fn process_report(
        &self,
        id: &str,
        filename: &str,
        text: &str,
        keywords: &[String],
    ) -> Result<Arc<ReportRecord>, ProcessingError> {
        self.store
            .upsert_with(id, || self.build(id, filename, text, keywords))
    }

    /// Reprocess a stored report. Fails with `NotFound` when `id` is not
    /// stored, including when it is evicted while waiting for its gate.
    pub fn reprocess_report(
        &self,
        id: &str,
        filename: &str,
        text: &str,
        keywords: &[String],
    ) -> Result<Arc<ReportRecord>, ProcessingError> {
        self.store
            .replace_with(id, || self.build(id, filename, text, keywords))
    }

    /// Extract text from an uploaded file, then process it.
    pub fn process_upload(
        &self,
        id: &str,
        filename: &str,
        bytes: &[u8],
        keywords: &[String],
    ) -> Result<Arc<ReportRecord>, ProcessingError> {
        let text = extract_upload(filename, bytes)?;
        self.process_report(id, filename, &text, keywords)
    }

    /// Extract text from an uploaded file, then reprocess the stored report.
    pub fn reprocess_upload(
        &self,
        id: &str,
        filename: &str,
        bytes: &[u8],
        keywords: &[String],
    ) -> Result<Arc<ReportRecord>, ProcessingError> {
        let text = extract_upload(filename, bytes)?;
        self.reprocess_report(id, filename, &text, keywords)
    }

    fn build(
        &self,
        id: &str,
        filename: &str,
        text: &str,
        keywords: &[String],
    ) -> Result<ReportRecord, ProcessingError> {
        let record = if keywords.is_empty() {
            self.processor.process(id, filename, text)?
        } else {
            let augmenter = KeywordAugmenter::new(keywords.to_vec());
            self.processor
                .process_with(id, filename, text, Some(&augmenter))?
        };
        Ok(record)
    }

    pub fn get_report(&self, id: &str) -> Result<Arc<ReportRecord>, StoreError> {
        self.store.get(id)
    }

    pub fn list_reports(&self) -> Result<Vec<ReportSummary>, StoreError> {
        self.store.list()
    }

    pub fn remove_report(&self, id: &str) -> Result<(), StoreError> {
        self.store.remove(id)?;
        tracing::info!(report_id = %id, "Report evicted");
        Ok(())
    }

    /// Answer a question about a stored report. Blocking.
    pub fn chat(
        &self,
        id: &str,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<ChatReply, StoreError> {
        let record = self.store.get(id)?;
        Ok(self.chat.reply(&record, message, history))
    }
}

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Chat client error: {0}")]
    ChatClient(#[from] ChatError),
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::thread;

    use super::*;
    use crate::pipeline::chat::{MockLlmClient, ReplySource};
    use crate::pipeline::pdf::SourceError;
    use crate::pipeline::processor::InputError;

    const REPORT: &str = "FINDINGS: 2.3 cm mass in right frontal lobe.\nIMPRESSION: Findings suggestive of glioma.";

    fn state(mock: MockLlmClient) -> CoreState {
        CoreState::with_parts(AppConfig::default(), Catalog::shared(), Arc::new(mock))
    }

    #[test]
    fn process_then_get() {
        let core = state(MockLlmClient::new("ok"));
        let stored = core.process_report("r1", "a.txt", REPORT, &[]).unwrap();
        let fetched = core.get_report("r1").unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(fetched.top_condition().unwrap().name, "Glioma");
    }

    #[test]
    fn empty_text_creates_no_record() {
        let core = state(MockLlmClient::new("ok"));
        let err = core.process_report("r1", "a.txt", "   ", &[]).unwrap_err();
        assert!(matches!(err, ProcessingError::Input(InputError::EmptyText)));
        assert_eq!(
            core.get_report("r1").unwrap_err(),
            StoreError::NotFound("r1".into())
        );
    }

    #[test]
    fn failed_reprocess_keeps_previous_record() {
        let core = state(MockLlmClient::new("ok"));
        core.process_report("r1", "a.txt", REPORT, &[]).unwrap();
        assert!(core.process_report("r1", "a.txt", "", &[]).is_err());
        assert_eq!(core.get_report("r1").unwrap().original_text, REPORT);
    }

    #[test]
    fn keywords_augment_terms() {
        let core = state(MockLlmClient::new("ok"));
        let record = core
            .process_report("r1", "a.txt", REPORT, &["suggestive".to_string()])
            .unwrap();
        assert!(record.term("suggestive").is_some());
    }

    #[test]
    fn unsupported_upload_is_rejected() {
        let core = state(MockLlmClient::new("ok"));
        let err = core
            .process_upload("r1", "scan.png", &[0x89, b'P', b'N', b'G'], &[])
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Source(SourceError::UnsupportedFormat(_))
        ));
        assert!(core.store().is_empty());
    }

    #[test]
    fn text_upload_is_processed() {
        let core = state(MockLlmClient::new("ok"));
        let record = core
            .process_upload("r1", "report.txt", REPORT.as_bytes(), &[])
            .unwrap();
        assert_eq!(record.filename, "report.txt");
    }

    #[test]
    fn reprocess_replaces_only_stored_reports() {
        let core = state(MockLlmClient::new("ok"));
        let err = core
            .reprocess_report("r1", "a.txt", REPORT, &[])
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::Store(StoreError::NotFound(ref id)) if id == "r1"
        ));
        assert!(core.store().is_empty());

        core.process_report("r1", "a.txt", "IMPRESSION: pneumonia.", &[])
            .unwrap();
        let record = core
            .reprocess_upload("r1", "b.txt", REPORT.as_bytes(), &[])
            .unwrap();
        assert_eq!(record.filename, "b.txt");
        assert_eq!(core.get_report("r1").unwrap().original_text, REPORT);
    }

    #[test]
    fn remove_then_get_is_not_found() {
        let core = state(MockLlmClient::new("ok"));
        core.process_report("r1", "a.txt", REPORT, &[]).unwrap();
        core.remove_report("r1").unwrap();
        assert!(core.get_report("r1").is_err());
        assert!(core.remove_report("r1").is_err());
    }

    #[test]
    fn chat_on_unknown_report_is_not_found() {
        let core = state(MockLlmClient::new("ok"));
        assert_eq!(
            core.chat("nope", "hi", &[]).unwrap_err(),
            StoreError::NotFound("nope".into())
        );
    }

    #[test]
    fn chat_falls_back_when_backend_down() {
        let core = state(MockLlmClient::failing(ChatError::Connection(
            "http://localhost:11434".into(),
        )));
        core.process_report("r1", "a.txt", REPORT, &[]).unwrap();
        let reply = core.chat("r1", "What condition is this?", &[]).unwrap();
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.reply.contains("Glioma"));
    }

    #[test]
    fn different_ids_process_concurrently() {
        let core = Arc::new(state(MockLlmClient::new("ok")));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let core = Arc::clone(&core);
                thread::spawn(move || {
                    core.process_report(&format!("r{i}"), "a.txt", REPORT, &[])
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(core.list_reports().unwrap().len(), 8);
    }

    #[test]
    fn extension_catalog_from_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"terms":[{{"canonical_form":"chordoma","category":"CONDITION","synonyms":[]}}]}}"#
        )
        .unwrap();
        let config = AppConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..AppConfig::default()
        };
        let core = CoreState::from_config(config).unwrap();
        let record = core
            .process_report("r1", "a.txt", "IMPRESSION: Chordoma.", &[])
            .unwrap();
        assert!(record.term("chordoma").is_some());
    }

    #[test]
    fn bad_catalog_path_fails_startup() {
        let config = AppConfig {
            catalog_path: Some("/nonexistent/catalog.json".into()),
            ..AppConfig::default()
        };
        assert!(matches!(
            CoreState::from_config(config),
            Err(CoreError::Catalog(_))
        ));
    }
}
