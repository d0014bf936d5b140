//! Answer composition - grounded generation over retrieved elements.

use std::sync::Arc;

use crate::error::GenerationError;
use crate::pipeline::prompts::format_answer_prompt;
use crate::traits::ai::ChatModel;
use crate::types::hit::{Answer, Citation, RetrievalHit};

/// Feeds retrieved, cited elements plus the query to the chat capability
/// and returns the generated text with its citations.
///
/// Citations come strictly from the hits, in the order the hits were used;
/// nothing is fabricated.
pub struct AnswerComposer<C> {
    chat: Arc<C>,
}

impl<C: ChatModel> AnswerComposer<C> {
    /// Create a composer over a chat capability.
    pub fn new(chat: Arc<C>) -> Self {
        Self { chat }
    }

    /// Generate a grounded answer for the query from the given hits.
    ///
    /// On capability failure the error carries the citations retrieval
    /// already resolved, so the caller keeps partial value.
    pub async fn answer(
        &self,
        query: &str,
        hits: &[RetrievalHit],
    ) -> Result<Answer, GenerationError> {
        let citations: Vec<Citation> = hits.iter().map(RetrievalHit::citation).collect();

        let contexts = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                format!(
                    "Context {n}:\nSource: {document} (page {page}, {element_type})\nSummary: {summary}\nRaw: {raw}",
                    n = i + 1,
                    document = hit.document_id,
                    page = hit.page_number,
                    element_type = hit.element.element_type(),
                    summary = hit.summary,
                    raw = hit.element.content.searchable_text(),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = format_answer_prompt(&contexts, query);

        match self.chat.generate(&prompt).await {
            Ok(text) => Ok(Answer {
                text: text.trim().to_string(),
                citations,
            }),
            Err(source) => Err(GenerationError::Capability { source, citations }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChat;
    use crate::types::element::{Element, ElementContent, ElementId};

    fn hit(document_id: &str, page: u32, seq: u32, summary: &str, raw: &str) -> RetrievalHit {
        let element = Element::new(
            document_id,
            page,
            seq,
            ElementContent::Text {
                text: raw.to_string(),
            },
        )
        .with_summary(summary);
        RetrievalHit {
            element_id: element.element_id.clone(),
            document_id: document_id.to_string(),
            page_number: page,
            semantic_score: 1.0,
            keyword_score: 0.0,
            fused_score: 0.6,
            summary: summary.to_string(),
            element,
        }
    }

    #[tokio::test]
    async fn citations_follow_hit_order() {
        let chat = MockChat::new().with_response("Question:", "The total is 42.");
        let composer = AnswerComposer::new(Arc::new(chat));
        let hits = vec![
            hit("report", 3, 0, "totals table", "| total | 42 |"),
            hit("report", 1, 0, "intro", "Introduction text"),
        ];

        let answer = composer.answer("What is the total?", &hits).await.unwrap();
        assert_eq!(answer.text, "The total is 42.");
        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].element_id, ElementId::new("report", 3, 0));
        assert_eq!(answer.citations[1].page_number, 1);
    }

    #[tokio::test]
    async fn prompt_contains_summary_and_raw_content() {
        let chat = MockChat::new();
        let chat_handle = chat.clone();
        let composer = AnswerComposer::new(Arc::new(chat));
        let hits = vec![hit("report", 1, 0, "a summary", "the raw block")];

        composer.answer("question?", &hits).await.unwrap();

        let calls = chat_handle.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("Summary: a summary"));
        assert!(calls[0].contains("Raw: the raw block"));
        assert!(calls[0].contains("Question: question?"));
    }

    #[tokio::test]
    async fn capability_failure_still_returns_citations() {
        let chat = MockChat::new().failing();
        let composer = AnswerComposer::new(Arc::new(chat));
        let hits = vec![hit("report", 2, 1, "summary", "raw")];

        let err = composer.answer("question?", &hits).await.unwrap_err();
        let GenerationError::Capability { citations, .. } = err;
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].page_number, 2);
    }
}
