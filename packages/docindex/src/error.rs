//! Typed errors for the engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the failure class: extraction, summarization, index writes, citation
//! resolution, and answer generation each have their own type.

use thiserror::Error;

use crate::types::element::ElementId;
use crate::types::hit::Citation;

/// Boxed error source from an external capability or store backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of an injected external capability (network, service outage,
/// timeout). Capability traits return this; pipeline components wrap it
/// into the failure class of the call site.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CapabilityError(#[source] pub BoxError);

impl CapabilityError {
    /// Wrap an underlying error.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self(source.into())
    }

    /// Create from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// Failure inside a store capability (raw content store or vector store).
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(#[source] pub BoxError);

impl StoreError {
    /// Wrap an underlying error.
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self(source.into())
    }

    /// Create from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into().into())
    }
}

/// The document could not be turned into elements.
///
/// Fatal to the ingestion call that hit it.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The document could not be opened at all.
    #[error("document could not be opened: {reason}")]
    Unreadable { reason: String },

    /// The document opened but contains zero extractable pages.
    ///
    /// A document with pages but no elements on some pages is not an error.
    #[error("document has no extractable pages")]
    EmptyDocument,

    /// The parser capability failed mid-document.
    #[error("parser error: {0}")]
    Parser(#[source] BoxError),
}

/// The summarization capability was unavailable.
///
/// Retryable by the caller; fatal only to the single element being
/// summarized, never to the rest of the document.
#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("summarization capability unavailable: {0}")]
    Capability(#[from] CapabilityError),
}

/// A store write failed while indexing an element.
///
/// Fatal to the ingestion call. The indexer rolls back the raw entry of
/// the failing element so no partially-visible element survives.
#[derive(Debug, Error)]
pub enum IndexWriteError {
    #[error("raw store write failed for {element_id}: {source}")]
    RawStore {
        element_id: ElementId,
        #[source]
        source: StoreError,
    },

    #[error("vector store write failed for {element_id}: {source}")]
    VectorStore {
        element_id: ElementId,
        #[source]
        source: StoreError,
    },

    #[error("embedding failed for {element_id}: {source}")]
    Embedding {
        element_id: ElementId,
        #[source]
        source: CapabilityError,
    },

    #[error("failed to clear prior elements of document {document_id}: {source}")]
    Replace {
        document_id: String,
        #[source]
        source: StoreError,
    },
}

/// An indexed element could not be resolved to raw content.
///
/// Signals an index/raw-store inconsistency. Logged and dropped per hit;
/// never fatal to the query.
#[derive(Debug, Error)]
#[error("raw content missing for indexed element {element_id}")]
pub struct CitationResolutionError {
    pub element_id: ElementId,
}

/// The chat capability failed while generating an answer.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The capability call failed. The citations already resolved by
    /// retrieval are carried along so the caller keeps partial value.
    #[error("chat capability unavailable: {source}")]
    Capability {
        #[source]
        source: CapabilityError,
        citations: Vec<Citation>,
    },
}

/// Top-level error for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error(transparent)]
    IndexWrite(#[from] IndexWriteError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A store was unavailable on the query path.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The query could not be embedded.
    #[error("query embedding failed: {0}")]
    QueryEmbedding(#[source] CapabilityError),

    /// Operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
