//! Element summarization - the summary is the search key.

use std::sync::Arc;

use crate::error::SummarizationError;
use crate::pipeline::prompts::format_summary_prompt;
use crate::traits::ai::ChatModel;
use crate::types::config::IngestConfig;
use crate::types::element::{Element, ElementContent};

/// Produces the short natural-language summary used as the embedding and
/// search key for an element.
pub struct Summarizer<C> {
    chat: Arc<C>,
    max_summary_chars: usize,
}

impl<C: ChatModel> Summarizer<C> {
    /// Create a summarizer over a chat capability.
    pub fn new(chat: Arc<C>, config: &IngestConfig) -> Self {
        Self {
            chat,
            max_summary_chars: config.max_summary_chars,
        }
    }

    /// Summarize one element.
    ///
    /// Images with an empty transcript get a placeholder summary without a
    /// capability call. Fails only when the chat capability is unavailable,
    /// never on content shape; the result is always non-empty and bounded.
    pub async fn summarize(&self, element: &Element) -> Result<String, SummarizationError> {
        if let ElementContent::Image { transcript, .. } = &element.content {
            if transcript.trim().is_empty() {
                return Ok(placeholder_summary(element.page_number));
            }
        }

        let prompt = format_summary_prompt(
            element.element_type(),
            element.content.searchable_text(),
        );
        let response = self.chat.generate(&prompt).await?;
        let trimmed = response.trim();

        let summary = if trimmed.is_empty() {
            format!("{} on page {}", element.element_type(), element.page_number)
        } else {
            truncate_chars(trimmed, self.max_summary_chars)
        };

        Ok(summary)
    }
}

fn placeholder_summary(page_number: u32) -> String {
    format!("image on page {page_number} with no recoverable text")
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
