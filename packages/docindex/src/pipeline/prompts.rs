//! LLM prompts for summarization and answer generation.

use crate::types::element::ElementType;

/// Prompt for summarizing a prose text block.
pub const TEXT_SUMMARY_PROMPT: &str = r#"Summarize the following text block concisely for retrieval.

Keep the key facts, names, and figures someone might search for. Two to three sentences.

Text:
{block}"#;

/// Prompt for describing a table.
pub const TABLE_SUMMARY_PROMPT: &str = r#"Describe the following table in plain English.

State what the table is about and its key figures. Do not restate every cell.

<table>
{block}
</table>"#;

/// Prompt for summarizing OCR text recovered from an image.
pub const IMAGE_SUMMARY_PROMPT: &str = r#"Summarize the following text recovered from an image.

Keep names, numbers, and labels someone might search for. Two to three sentences.

OCR text:
{block}"#;

/// Prompt for grounded answer generation.
pub const ANSWER_PROMPT: &str = r#"You are a helpful assistant. Use the following contexts to answer the user's question.

{contexts}

Question: {question}
Answer:"#;

/// Format the type-appropriate summarization prompt for a content block.
pub fn format_summary_prompt(element_type: ElementType, block: &str) -> String {
    let template = match element_type {
        ElementType::Text => TEXT_SUMMARY_PROMPT,
        ElementType::Table => TABLE_SUMMARY_PROMPT,
        ElementType::Image => IMAGE_SUMMARY_PROMPT,
    };
    template.replace("{block}", block)
}

/// Format the answer prompt from assembled context blocks and the question.
pub fn format_answer_prompt(contexts: &str, question: &str) -> String {
    ANSWER_PROMPT
        .replace("{contexts}", contexts)
        .replace("{question}", question)
}
