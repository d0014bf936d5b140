//! Document types and ingestion reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::element::ElementId;

/// An ingested document: a stable identifier plus the ordered list of its
/// element ids. Immutable once ingested; re-ingestion replaces the whole
/// element set atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub document_id: String,
    /// Element ids in page order, then top-to-bottom within a page.
    pub element_ids: Vec<ElementId>,
    pub ingested_at: DateTime<Utc>,
}

/// Summary of one indexed element, returned to the ingestion caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSummary {
    pub element_id: ElementId,
    pub summary: String,
}

/// One element that failed during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementFailure {
    pub element_id: ElementId,
    pub reason: String,
}

/// Outcome of one ingestion call.
///
/// Partial success is explicit: element-level failures are listed, never
/// silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub document_id: String,
    /// Elements produced by the extractor.
    pub elements_extracted: usize,
    /// Elements that made it into both stores.
    pub elements_indexed: usize,
    /// Per-element summaries in document order, for display by the caller.
    pub summaries: Vec<ElementSummary>,
    /// Elements that failed, with the reason.
    pub failed: Vec<ElementFailure>,
}

impl IngestReport {
    /// Create an empty report for a document.
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            elements_extracted: 0,
            elements_indexed: 0,
            summaries: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Whether every extracted element was indexed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.elements_indexed == self.elements_extracted
    }
}
