//! Multi-Modal PDF Ingestion and Retrieval Library
//!
//! Turns raw PDFs into indexed, summarized, citable elements and answers
//! natural-language questions against that index with hybrid retrieval.
//!
//! # Design Philosophy
//!
//! - Every external collaborator is an injected capability trait: the
//!   document parser, OCR, embedding and chat models, and both stores.
//!   No ambient singletons, so every component tests against in-memory
//!   fakes.
//! - The summary is the index key: each element gets one short generated
//!   summary that is embedded for the semantic channel and scanned by the
//!   keyword channel.
//! - Every hit resolves back to raw content. A citation that cannot be
//!   resolved is dropped, never returned.
//!
//! # Usage
//!
//! ```rust,ignore
//! use docindex::{document_id, Engine, MemoryRawStore, MemoryVectorStore};
//! use docindex::ai::OpenAi;
//!
//! let ai = OpenAi::from_env()?;
//! let engine = Engine::new(
//!     parser,
//!     ocr,
//!     ai.clone(),
//!     ai,
//!     MemoryRawStore::new(),
//!     MemoryVectorStore::new(),
//! );
//!
//! let doc_id = document_id("report.pdf", &pdf_bytes);
//! let report = engine.ingest_document(&doc_id, &pdf_bytes).await?;
//!
//! let answer = engine.answer("What was Q3 revenue?", 5, None).await?;
//! for citation in &answer.citations {
//!     println!("{citation}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability abstractions (parser, OCR, AI, stores)
//! - [`types`] - Domain data types (elements, hits, reports, config)
//! - [`pipeline`] - Extraction, summarization, indexing, retrieval,
//!   answering, and the [`Engine`] facade
//! - [`stores`] - In-memory store implementations
//! - [`testing`] - Mock capabilities for testing
//! - [`error`] - The error taxonomy

pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    CapabilityError, CitationResolutionError, EngineError, ExtractionError, GenerationError,
    IndexWriteError, Result, StoreError, SummarizationError,
};
pub use traits::{
    ai::{ChatModel, Embedder},
    parser::{BlockKind, DocumentParser, OcrEngine, ParsedBlock, ParsedDocument},
    store::{
        cosine_similarity, EntryPayload, RawContentStore, StoredEntry, VectorMatch, VectorStore,
    },
};
pub use types::{
    config::{EngineConfig, IngestConfig, RetrievalConfig},
    document::{Document, ElementFailure, ElementSummary, IngestReport},
    element::{Element, ElementContent, ElementId, ElementType},
    hit::{Answer, Citation, RetrievalHit},
};

// Re-export the pipeline components and the Engine facade
pub use pipeline::{
    document_id, AnswerComposer, ElementExtractor, Engine, HybridRetriever, Indexer, Summarizer,
};

// Re-export stores
pub use stores::{MemoryRawStore, MemoryVectorStore};

// Re-export testing utilities
pub use testing::{MockChat, MockEmbedder, MockOcr, MockParser};

#[cfg(feature = "openai")]
pub use ai::OpenAi;
