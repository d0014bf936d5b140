//! Storage capability traits.
//!
//! Ownership is split: the [`RawContentStore`] exclusively owns raw element
//! content, the [`VectorStore`] owns summaries-as-vectors plus entry
//! payloads. The indexer keeps the two consistent; every index entry must
//! resolve to raw content.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::element::{Element, ElementId, ElementType};

/// Payload stored alongside each vector.
///
/// Carries the summary text as well: the keyword channel scans it, which
/// gates keyword visibility on the vector write (the visibility-granting
/// step of indexing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPayload {
    pub document_id: String,
    pub element_type: ElementType,
    pub page_number: u32,
    pub summary: String,
}

/// One ranked result from [`VectorStore::query`].
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub element_id: ElementId,
    /// Similarity score in the store's native metric.
    pub score: f32,
    pub payload: EntryPayload,
}

/// One stored entry from [`VectorStore::scan`].
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub element_id: ElementId,
    pub payload: EntryPayload,
}

/// Durable key-value store mapping element ids to raw content.
#[async_trait]
pub trait RawContentStore: Send + Sync {
    /// Store an element under its id, overwriting any previous entry.
    async fn put(&self, element: &Element) -> Result<(), StoreError>;

    /// Fetch an element by id.
    async fn get(&self, element_id: &ElementId) -> Result<Option<Element>, StoreError>;

    /// Delete one element.
    async fn delete(&self, element_id: &ElementId) -> Result<(), StoreError>;

    /// Delete every element of a document. Returns how many were removed.
    async fn delete_document(&self, document_id: &str) -> Result<usize, StoreError>;

    /// List stored elements, optionally restricted to one document.
    async fn list(&self, document_id: Option<&str>) -> Result<Vec<Element>, StoreError>;
}

/// Nearest-neighbour index over embedded summaries.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace the entry for an element id.
    async fn upsert(
        &self,
        element_id: &ElementId,
        vector: &[f32],
        payload: EntryPayload,
    ) -> Result<(), StoreError>;

    /// Delete one entry.
    async fn delete(&self, element_id: &ElementId) -> Result<(), StoreError>;

    /// Delete every entry of a document. Returns how many were removed.
    async fn delete_document(&self, document_id: &str) -> Result<usize, StoreError>;

    /// Return the `k` nearest entries to the query vector, optionally
    /// restricted to one document, ranked by similarity descending.
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        document_id: Option<&str>,
    ) -> Result<Vec<VectorMatch>, StoreError>;

    /// Iterate stored entries. The keyword channel scans summaries with
    /// this.
    async fn scan(&self, document_id: Option<&str>) -> Result<Vec<StoredEntry>, StoreError>;
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
