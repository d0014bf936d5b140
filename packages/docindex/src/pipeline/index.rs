//! Indexing - two-phase writes keeping both stores consistent.

use std::sync::Arc;
use tracing::warn;

use crate::error::IndexWriteError;
use crate::traits::ai::Embedder;
use crate::traits::store::{EntryPayload, RawContentStore, VectorStore};
use crate::types::element::{Element, ElementId};

/// Writes summarized elements into the raw content store and the vector
/// store as one logical unit per element.
///
/// The raw write lands first; the vector upsert is the visibility-granting
/// step. If the vector write fails, the raw entry is rolled back so no
/// partially-visible element survives. Idempotent per element id.
pub struct Indexer<E, R, V> {
    embedder: Arc<E>,
    raw: Arc<R>,
    vector: Arc<V>,
}

impl<E: Embedder, R: RawContentStore, V: VectorStore> Indexer<E, R, V> {
    /// Create an indexer over the embedding capability and both stores.
    pub fn new(embedder: Arc<E>, raw: Arc<R>, vector: Arc<V>) -> Self {
        Self {
            embedder,
            raw,
            vector,
        }
    }

    /// Remove a document's prior elements from both stores.
    ///
    /// Vector entries go first so nothing stays retrievable while its raw
    /// content is being deleted. Returns the number of entries that were
    /// retrievable before the call.
    pub async fn clear_document(&self, document_id: &str) -> Result<usize, IndexWriteError> {
        let removed = self
            .vector
            .delete_document(document_id)
            .await
            .map_err(|source| IndexWriteError::Replace {
                document_id: document_id.to_string(),
                source,
            })?;

        self.raw
            .delete_document(document_id)
            .await
            .map_err(|source| IndexWriteError::Replace {
                document_id: document_id.to_string(),
                source,
            })?;

        Ok(removed)
    }

    /// Index one summarized element into both stores.
    pub async fn index_element(&self, element: &Element) -> Result<(), IndexWriteError> {
        self.raw
            .put(element)
            .await
            .map_err(|source| IndexWriteError::RawStore {
                element_id: element.element_id.clone(),
                source,
            })?;

        let vector = match self.embedder.embed(&element.summary).await {
            Ok(vector) => vector,
            Err(source) => {
                self.rollback_raw(&element.element_id).await;
                return Err(IndexWriteError::Embedding {
                    element_id: element.element_id.clone(),
                    source,
                });
            }
        };

        if vector.len() != self.embedder.dimensions() {
            self.rollback_raw(&element.element_id).await;
            return Err(IndexWriteError::Embedding {
                element_id: element.element_id.clone(),
                source: crate::error::CapabilityError::msg(format!(
                    "embedding has {} dimensions, expected {}",
                    vector.len(),
                    self.embedder.dimensions()
                )),
            });
        }

        let payload = EntryPayload {
            document_id: element.document_id.clone(),
            element_type: element.element_type(),
            page_number: element.page_number,
            summary: element.summary.clone(),
        };

        if let Err(source) = self.vector.upsert(&element.element_id, &vector, payload).await {
            self.rollback_raw(&element.element_id).await;
            return Err(IndexWriteError::VectorStore {
                element_id: element.element_id.clone(),
                source,
            });
        }

        Ok(())
    }

    async fn rollback_raw(&self, element_id: &ElementId) {
        if let Err(e) = self.raw.delete(element_id).await {
            warn!(
                element_id = %element_id,
                error = %e,
                "rollback of raw entry failed; entry left orphaned for reconciliation"
            );
        }
    }
}
