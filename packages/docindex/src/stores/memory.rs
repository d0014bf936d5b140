//! In-memory store implementations for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::traits::store::{
    cosine_similarity, EntryPayload, RawContentStore, StoredEntry, VectorMatch, VectorStore,
};
use crate::types::element::{Element, ElementId};

/// In-memory raw content store.
///
/// Not durable; data is lost on restart.
#[derive(Default)]
pub struct MemoryRawStore {
    elements: RwLock<HashMap<ElementId, Element>>,
}

impl MemoryRawStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.elements.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RawContentStore for MemoryRawStore {
    async fn put(&self, element: &Element) -> Result<(), StoreError> {
        self.elements
            .write()
            .unwrap()
            .insert(element.element_id.clone(), element.clone());
        Ok(())
    }

    async fn get(&self, element_id: &ElementId) -> Result<Option<Element>, StoreError> {
        Ok(self.elements.read().unwrap().get(element_id).cloned())
    }

    async fn delete(&self, element_id: &ElementId) -> Result<(), StoreError> {
        self.elements.write().unwrap().remove(element_id);
        Ok(())
    }

    async fn delete_document(&self, document_id: &str) -> Result<usize, StoreError> {
        let mut elements = self.elements.write().unwrap();
        let before = elements.len();
        elements.retain(|_, e| e.document_id != document_id);
        Ok(before - elements.len())
    }

    async fn list(&self, document_id: Option<&str>) -> Result<Vec<Element>, StoreError> {
        Ok(self
            .elements
            .read()
            .unwrap()
            .values()
            .filter(|e| document_id.map_or(true, |d| e.document_id == d))
            .cloned()
            .collect())
    }
}

/// In-memory vector store with brute-force cosine ranking.
#[derive(Default)]
pub struct MemoryVectorStore {
    entries: RwLock<HashMap<ElementId, (Vec<f32>, EntryPayload)>>,
}

impl MemoryVectorStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(
        &self,
        element_id: &ElementId,
        vector: &[f32],
        payload: EntryPayload,
    ) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap()
            .insert(element_id.clone(), (vector.to_vec(), payload));
        Ok(())
    }

    async fn delete(&self, element_id: &ElementId) -> Result<(), StoreError> {
        self.entries.write().unwrap().remove(element_id);
        Ok(())
    }

    async fn delete_document(&self, document_id: &str) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, (_, payload)| payload.document_id != document_id);
        Ok(before - entries.len())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        document_id: Option<&str>,
    ) -> Result<Vec<VectorMatch>, StoreError> {
        let entries = self.entries.read().unwrap();

        let mut matches: Vec<VectorMatch> = entries
            .iter()
            .filter(|(_, (_, payload))| document_id.map_or(true, |d| payload.document_id == d))
            .map(|(element_id, (stored, payload))| VectorMatch {
                element_id: element_id.clone(),
                score: cosine_similarity(vector, stored),
                payload: payload.clone(),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.element_id.cmp(&b.element_id))
        });
        matches.truncate(k);

        Ok(matches)
    }

    async fn scan(&self, document_id: Option<&str>) -> Result<Vec<StoredEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|(_, (_, payload))| document_id.map_or(true, |d| payload.document_id == d))
            .map(|(element_id, (_, payload))| StoredEntry {
                element_id: element_id.clone(),
                payload: payload.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::element::ElementContent;

    fn text_element(document_id: &str, page: u32, seq: u32, text: &str) -> Element {
        Element::new(
            document_id,
            page,
            seq,
            ElementContent::Text {
                text: text.to_string(),
            },
        )
    }

    fn payload(document_id: &str, page: u32, summary: &str) -> EntryPayload {
        EntryPayload {
            document_id: document_id.to_string(),
            element_type: crate::types::element::ElementType::Text,
            page_number: page,
            summary: summary.to_string(),
        }
    }

    #[tokio::test]
    async fn raw_store_crud() {
        let store = MemoryRawStore::new();
        let element = text_element("doc", 1, 0, "Hello world");

        store.put(&element).await.unwrap();
        assert_eq!(store.len(), 1);

        let fetched = store.get(&element.element_id).await.unwrap();
        assert_eq!(
            fetched.unwrap().content.searchable_text(),
            "Hello world"
        );

        store.delete(&element.element_id).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn raw_store_delete_document_scopes_by_owner() {
        let store = MemoryRawStore::new();
        store.put(&text_element("a", 1, 0, "one")).await.unwrap();
        store.put(&text_element("a", 2, 0, "two")).await.unwrap();
        store.put(&text_element("b", 1, 0, "three")).await.unwrap();

        let removed = store.delete_document("a").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list(Some("b")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn vector_store_ranks_by_similarity() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&ElementId::new("doc", 1, 0), &[1.0, 0.0], payload("doc", 1, "near"))
            .await
            .unwrap();
        store
            .upsert(&ElementId::new("doc", 1, 1), &[0.0, 1.0], payload("doc", 1, "far"))
            .await
            .unwrap();

        let matches = store.query(&[0.9, 0.1], 10, None).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].payload.summary, "near");
        assert!(matches[0].score > matches[1].score);
    }

    #[tokio::test]
    async fn vector_store_filters_by_document() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&ElementId::new("a", 1, 0), &[1.0, 0.0], payload("a", 1, "s"))
            .await
            .unwrap();
        store
            .upsert(&ElementId::new("b", 1, 0), &[1.0, 0.0], payload("b", 1, "s"))
            .await
            .unwrap();

        let matches = store.query(&[1.0, 0.0], 10, Some("a")).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].payload.document_id, "a");

        let scanned = store.scan(Some("b")).await.unwrap();
        assert_eq!(scanned.len(), 1);
    }

    #[tokio::test]
    async fn vector_store_upsert_overwrites() {
        let store = MemoryVectorStore::new();
        let id = ElementId::new("doc", 1, 0);
        store
            .upsert(&id, &[1.0, 0.0], payload("doc", 1, "old"))
            .await
            .unwrap();
        store
            .upsert(&id, &[0.0, 1.0], payload("doc", 1, "new"))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let scanned = store.scan(None).await.unwrap();
        assert_eq!(scanned[0].payload.summary, "new");
    }
}
