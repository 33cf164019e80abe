use std::sync::Arc;

use serde::Serialize;

use super::fallback::fallback_reply;
use super::prompt::{build_prompt_context, SYSTEM_PROMPT};
use super::{ChatRole, ChatTurn, LlmClient};
use crate::models::ReportRecord;

/// Prior turns forwarded to the model.
const MAX_HISTORY_TURNS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub source: ReplySource,
}

/// Answers questions about one report. Always produces a reply.
pub struct ChatService {
    client: Arc<dyn LlmClient>,
    model: String,
    retries: u32,
    budget: usize,
}

impl ChatService {
    pub fn new(client: Arc<dyn LlmClient>, model: &str, retries: u32, budget: usize) -> Self {
        Self {
            client,
            model: model.to_string(),
            retries,
            budget,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Blocking: call from a worker thread, not an async task.
    pub fn reply(&self, record: &ReportRecord, message: &str, history: &[ChatTurn]) -> ChatReply {
        let messages = self.messages(record, message, history);

        let mut attempt = 0;
        loop {
            match self.client.chat(&self.model, &messages) {
                Ok(reply) => {
                    tracing::info!(
                        report_id = %record.id,
                        attempts = attempt + 1,
                        reply_chars = reply.len(),
                        "Chat reply from model"
                    );
                    return ChatReply {
                        reply,
                        source: ReplySource::Model,
                    };
                }
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(report_id = %record.id, attempt, error = %e, "Chat call failed, retrying");
                }
                Err(e) => {
                    tracing::warn!(report_id = %record.id, error = %e, "Chat backend unavailable, using fallback");
                    return ChatReply {
                        reply: fallback_reply(record, message),
                        source: ReplySource::Fallback,
                    };
                }
            }
        }
    }

    fn messages(&self, record: &ReportRecord, message: &str, history: &[ChatTurn]) -> Vec<ChatTurn> {
        let context = build_prompt_context(record, self.budget);
        tracing::debug!(
            report_id = %record.id,
            blocks = context.blocks.len(),
            truncated = context.truncated,
            "Prompt context built"
        );

        let system = format!("{SYSTEM_PROMPT}\n\n{}", context.text);
        let recent: Vec<&ChatTurn> = history
            .iter()
            .filter(|t| t.role != ChatRole::System)
            .collect();
        let skip = recent.len().saturating_sub(MAX_HISTORY_TURNS);

        let mut messages = Vec::with_capacity(MAX_HISTORY_TURNS + 2);
        messages.push(ChatTurn::new(ChatRole::System, system));
        messages.extend(recent.into_iter().skip(skip).cloned());
        messages.push(ChatTurn::new(ChatRole::User, message));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalog::Catalog;
    use crate::pipeline::chat::{ChatError, MockLlmClient};
    use crate::pipeline::processor::ReportProcessor;

    const REPORT: &str = "FINDINGS: 2.3 cm mass in right frontal lobe.\nIMPRESSION: Findings suggestive of glioma.";

    fn record() -> ReportRecord {
        ReportProcessor::new(Catalog::shared())
            .process("s1", "chat.txt", REPORT)
            .unwrap()
    }

    fn service(mock: &Arc<MockLlmClient>, retries: u32) -> ChatService {
        ChatService::new(mock.clone(), "medllama2", retries, 2000)
    }

    #[test]
    fn model_reply_is_returned() {
        let mock = Arc::new(MockLlmClient::new("It is a brain tumor finding."));
        let reply = service(&mock, 1).reply(&record(), "What is this?", &[]);
        assert_eq!(reply.source, ReplySource::Model);
        assert_eq!(reply.reply, "It is a brain tumor finding.");
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn prompt_carries_context_and_question() {
        let mock = Arc::new(MockLlmClient::new("ok"));
        service(&mock, 0).reply(&record(), "Explain the impression", &[]);
        let sent = mock.last_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, ChatRole::System);
        assert!(sent[0].content.starts_with(SYSTEM_PROMPT));
        assert!(sent[0].content.contains("<IMPRESSION>"));
        assert_eq!(sent[1], ChatTurn::new(ChatRole::User, "Explain the impression"));
    }

    #[test]
    fn history_is_capped_to_recent_turns() {
        let mock = Arc::new(MockLlmClient::new("ok"));
        let history: Vec<ChatTurn> = (0..10)
            .map(|i| {
                let role = if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant };
                ChatTurn::new(role, format!("turn {i}"))
            })
            .collect();
        service(&mock, 0).reply(&record(), "next", &history);
        let sent = mock.last_messages();
        assert_eq!(sent.len(), MAX_HISTORY_TURNS + 2);
        assert_eq!(sent[1].content, "turn 4");
        assert_eq!(sent[MAX_HISTORY_TURNS].content, "turn 9");
    }

    #[test]
    fn retryable_errors_are_retried_then_fall_back() {
        let mock = Arc::new(MockLlmClient::failing(ChatError::Timeout(60)));
        let reply = service(&mock, 2).reply(&record(), "What is the diagnosis?", &[]);
        assert_eq!(mock.calls(), 3);
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.reply.contains("Glioma"));
    }

    #[test]
    fn non_retryable_error_falls_back_immediately() {
        let mock = Arc::new(MockLlmClient::failing(ChatError::Upstream {
            status: 404,
            body: "model not found".into(),
        }));
        let reply = service(&mock, 3).reply(&record(), "show findings", &[]);
        assert_eq!(mock.calls(), 1);
        assert_eq!(reply.source, ReplySource::Fallback);
        assert!(reply.reply.starts_with("The FINDINGS section reads"));
    }

    #[test]
    fn reply_source_serializes_lowercase() {
        let reply = ChatReply {
            reply: "x".into(),
            source: ReplySource::Fallback,
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["source"], "fallback");
    }
}
