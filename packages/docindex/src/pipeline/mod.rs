//! The ingestion and retrieval pipeline.
//!
//! Data flow: PDF → extractor → {summarizer → indexer → vector store;
//! raw element → raw content store}. Query → hybrid retriever → ranked
//! cited elements → answer composer.

pub mod answer;
pub mod engine;
pub mod extract;
pub mod index;
pub mod prompts;
pub mod retrieve;
pub mod summarize;

pub use answer::AnswerComposer;
pub use engine::{document_id, Engine};
pub use extract::ElementExtractor;
pub use index::Indexer;
pub use prompts::{format_answer_prompt, format_summary_prompt};
pub use retrieve::HybridRetriever;
pub use summarize::Summarizer;
