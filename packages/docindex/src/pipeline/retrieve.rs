//! Hybrid retrieval - semantic and keyword channels fused into one ranking.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{CitationResolutionError, EngineError, Result};
use crate::traits::ai::Embedder;
use crate::traits::store::{RawContentStore, StoredEntry, VectorStore};
use crate::types::config::RetrievalConfig;
use crate::types::element::ElementId;
use crate::types::hit::RetrievalHit;

/// Answers a query against the indexed corpus.
///
/// The semantic channel asks the vector store for nearest neighbours of
/// the embedded query; the keyword channel scores term overlap against the
/// stored summaries. The keyword path catches queries that share
/// vocabulary with summaries but are semantically distant - exact numbers,
/// proper nouns, table headers.
pub struct HybridRetriever<E, R, V> {
    embedder: Arc<E>,
    raw: Arc<R>,
    vector: Arc<V>,
    config: RetrievalConfig,
}

struct Candidate {
    element_id: ElementId,
    document_id: String,
    page_number: u32,
    summary: String,
    semantic: Option<f32>,
    keyword: Option<f32>,
}

impl<E: Embedder, R: RawContentStore, V: VectorStore> HybridRetriever<E, R, V> {
    /// Create a retriever over the embedding capability and both stores.
    pub fn new(embedder: Arc<E>, raw: Arc<R>, vector: Arc<V>, config: RetrievalConfig) -> Self {
        Self {
            embedder,
            raw,
            vector,
            config,
        }
    }

    /// Retrieve up to `top_k` hits for a query, optionally restricted to
    /// one document.
    ///
    /// An empty corpus, or no candidate clearing the minimum score, yields
    /// an empty list, not an error. Hits whose raw content cannot be
    /// resolved are logged and dropped, never fatal to the query.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        document_id: Option<&str>,
    ) -> Result<Vec<RetrievalHit>> {
        if query.trim().is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let entries = self.vector.scan(document_id).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(query)
            .await
            .map_err(EngineError::QueryEmbedding)?;

        let semantic = self
            .vector
            .query(&query_vector, self.config.candidate_k_semantic, document_id)
            .await?;
        let keyword = keyword_candidates(query, &entries, self.config.candidate_k_keyword);

        debug!(
            semantic = semantic.len(),
            keyword = keyword.len(),
            "candidate sets collected"
        );

        let semantic_norm = normalize(&semantic.iter().map(|m| m.score).collect::<Vec<_>>());
        let keyword_norm = normalize(&keyword.iter().map(|(_, score)| *score).collect::<Vec<_>>());

        let mut merged: HashMap<ElementId, Candidate> = HashMap::new();

        for (m, norm) in semantic.iter().zip(semantic_norm) {
            merged
                .entry(m.element_id.clone())
                .or_insert_with(|| Candidate {
                    element_id: m.element_id.clone(),
                    document_id: m.payload.document_id.clone(),
                    page_number: m.payload.page_number,
                    summary: m.payload.summary.clone(),
                    semantic: None,
                    keyword: None,
                })
                .semantic = Some(norm);
        }

        for ((entry, _), norm) in keyword.iter().zip(keyword_norm) {
            merged
                .entry(entry.element_id.clone())
                .or_insert_with(|| Candidate {
                    element_id: entry.element_id.clone(),
                    document_id: entry.payload.document_id.clone(),
                    page_number: entry.payload.page_number,
                    summary: entry.payload.summary.clone(),
                    semantic: None,
                    keyword: None,
                })
                .keyword = Some(norm);
        }

        let mut ranked: Vec<(Candidate, f32, f32, f32)> = merged
            .into_values()
            .map(|candidate| {
                let s = candidate.semantic.unwrap_or(0.0);
                let k = candidate.keyword.unwrap_or(0.0);
                let mut fused =
                    self.config.semantic_weight * s + self.config.keyword_weight() * k;
                if candidate.semantic.is_some() && candidate.keyword.is_some() {
                    fused += self.config.dual_presence_bonus;
                }
                (candidate, s, k, fused)
            })
            .filter(|(_, _, _, fused)| *fused >= self.config.min_score)
            .collect();

        ranked.sort_by(|a, b| {
            b.3.partial_cmp(&a.3)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.page_number.cmp(&b.0.page_number))
                .then_with(|| a.0.element_id.cmp(&b.0.element_id))
        });
        ranked.truncate(top_k);

        let mut hits = Vec::with_capacity(ranked.len());
        for (candidate, semantic_score, keyword_score, fused_score) in ranked {
            match self.raw.get(&candidate.element_id).await {
                Ok(Some(element)) => hits.push(RetrievalHit {
                    element_id: candidate.element_id,
                    document_id: candidate.document_id,
                    page_number: candidate.page_number,
                    semantic_score,
                    keyword_score,
                    fused_score,
                    summary: candidate.summary,
                    element,
                }),
                Ok(None) => {
                    let err = CitationResolutionError {
                        element_id: candidate.element_id.clone(),
                    };
                    warn!(element_id = %candidate.element_id, "{err}; dropping hit");
                }
                Err(e) => {
                    warn!(
                        element_id = %candidate.element_id,
                        error = %e,
                        "raw store lookup failed; dropping hit"
                    );
                }
            }
        }

        Ok(hits)
    }
}

/// Score the keyword channel: term overlap against stored summaries, with
/// a full-phrase match scoring highest.
pub(crate) fn keyword_score(query: &str, text: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let text_lower = text.to_lowercase();

    if text_lower.contains(query_lower.trim()) && !query_lower.trim().is_empty() {
        return 1.0;
    }

    let terms: Vec<&str> = query_lower
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .collect();
    if terms.is_empty() {
        return 0.0;
    }

    let matched = terms
        .iter()
        .filter(|term| text_lower.contains(*term))
        .count();
    matched as f32 / terms.len() as f32
}

fn keyword_candidates(
    query: &str,
    entries: &[StoredEntry],
    limit: usize,
) -> Vec<(StoredEntry, f32)> {
    let mut scored: Vec<(StoredEntry, f32)> = entries
        .iter()
        .filter_map(|entry| {
            let score = keyword_score(query, &entry.payload.summary);
            (score > 0.0).then(|| (entry.clone(), score))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.element_id.cmp(&b.0.element_id))
    });
    scored.truncate(limit);
    scored
}

/// Min-max normalize scores to [0, 1] within one channel. A single
/// candidate, or all-equal scores, normalize to 1.0.
pub(crate) fn normalize(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    scores
        .iter()
        .map(|score| {
            if (max - min).abs() < f32::EPSILON {
                1.0
            } else {
                (score - min) / (max - min)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{MemoryRawStore, MemoryVectorStore};
    use crate::testing::MockEmbedder;
    use crate::traits::store::EntryPayload;
    use crate::types::element::{Element, ElementContent, ElementType};

    async fn seed(
        raw: &MemoryRawStore,
        vector: &MemoryVectorStore,
        document_id: &str,
        page: u32,
        seq: u32,
        summary: &str,
        embedding: &[f32],
    ) -> ElementId {
        let element = Element::new(
            document_id,
            page,
            seq,
            ElementContent::Text {
                text: format!("raw for {summary}"),
            },
        )
        .with_summary(summary);
        let id = element.element_id.clone();

        raw.put(&element).await.unwrap();
        vector
            .upsert(
                &id,
                embedding,
                EntryPayload {
                    document_id: document_id.to_string(),
                    element_type: ElementType::Text,
                    page_number: page,
                    summary: summary.to_string(),
                },
            )
            .await
            .unwrap();
        id
    }

    fn retriever(
        raw: Arc<MemoryRawStore>,
        vector: Arc<MemoryVectorStore>,
        embedder: MockEmbedder,
    ) -> HybridRetriever<MockEmbedder, MemoryRawStore, MemoryVectorStore> {
        HybridRetriever::new(Arc::new(embedder), raw, vector, RetrievalConfig::default())
    }

    #[test]
    fn normalize_empty() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn normalize_single_is_one() {
        assert_eq!(normalize(&[5.0]), vec![1.0]);
    }

    #[test]
    fn normalize_range() {
        let result = normalize(&[10.0, 5.0, 0.0]);
        assert!((result[0] - 1.0).abs() < 1e-6);
        assert!((result[1] - 0.5).abs() < 1e-6);
        assert!((result[2] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_all_equal_is_one() {
        for score in normalize(&[3.0, 3.0, 3.0]) {
            assert!((score - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn keyword_score_rewards_full_phrase() {
        assert_eq!(keyword_score("total revenue 1,234", "the total revenue 1,234 figure"), 1.0);
        let partial = keyword_score("total revenue growth", "revenue table");
        assert!(partial > 0.0 && partial < 1.0);
        assert_eq!(keyword_score("total", "nothing relevant"), 0.0);
    }

    #[tokio::test]
    async fn empty_corpus_returns_empty() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        let retriever = retriever(raw, vector, MockEmbedder::new().with_dimensions(3));

        let hits = retriever.retrieve("anything", 5, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn blank_query_returns_empty() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        seed(&raw, &vector, "doc", 1, 0, "a summary", &[1.0, 0.0, 0.0]).await;
        let retriever = retriever(raw, vector, MockEmbedder::new().with_dimensions(3));

        assert!(retriever.retrieve("   ", 5, None).await.unwrap().is_empty());
        assert!(retriever.retrieve("query", 0, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dual_presence_outranks_single_channel() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        // Both equally similar to the query embedding; only one shares
        // vocabulary with it.
        seed(&raw, &vector, "doc", 1, 0, "quarterly revenue table", &[1.0, 0.0, 0.0]).await;
        seed(&raw, &vector, "doc", 1, 1, "unrelated prose", &[1.0, 0.0, 0.0]).await;

        let embedder = MockEmbedder::new()
            .with_dimensions(3)
            .with_embedding("quarterly revenue", vec![1.0, 0.0, 0.0]);
        let retriever = retriever(raw, vector, embedder);

        let hits = retriever.retrieve("quarterly revenue", 5, None).await.unwrap();
        assert_eq!(hits[0].summary, "quarterly revenue table");
        assert!(hits[0].keyword_score > 0.0);
        assert!(
            hits[0].fused_score >= hits[0].semantic_score,
            "dual presence must never be penalized"
        );
        assert!(hits[0].fused_score > hits[1].fused_score);
    }

    #[tokio::test]
    async fn ties_break_by_page_then_element_id() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        // Identical summaries and identical embeddings: every score ties.
        seed(&raw, &vector, "doc", 2, 0, "same summary", &[1.0, 0.0, 0.0]).await;
        seed(&raw, &vector, "doc", 1, 1, "same summary", &[1.0, 0.0, 0.0]).await;
        seed(&raw, &vector, "doc", 1, 0, "same summary", &[1.0, 0.0, 0.0]).await;

        let embedder = MockEmbedder::new()
            .with_dimensions(3)
            .with_embedding("same summary", vec![1.0, 0.0, 0.0]);
        let retriever = retriever(raw, vector, embedder);

        let hits = retriever.retrieve("same summary", 10, None).await.unwrap();
        let order: Vec<&str> = hits.iter().map(|h| h.element_id.as_str()).collect();
        assert_eq!(order, vec!["doc:1:0", "doc:1:1", "doc:2:0"]);
    }

    #[tokio::test]
    async fn top_k_bounds_results() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        for seq in 0..5 {
            seed(&raw, &vector, "doc", 1, seq, "same summary", &[1.0, 0.0, 0.0]).await;
        }
        let retriever = retriever(
            raw,
            vector,
            MockEmbedder::new().with_dimensions(3),
        );

        let hits = retriever.retrieve("same summary", 2, None).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn document_filter_scopes_results() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        seed(&raw, &vector, "a", 1, 0, "shared summary", &[1.0, 0.0, 0.0]).await;
        seed(&raw, &vector, "b", 1, 0, "shared summary", &[1.0, 0.0, 0.0]).await;

        let retriever = retriever(raw, vector, MockEmbedder::new().with_dimensions(3));
        let hits = retriever
            .retrieve("shared summary", 10, Some("a"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, "a");
    }

    #[tokio::test]
    async fn unresolvable_hit_is_dropped_not_fatal() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        let kept = seed(&raw, &vector, "doc", 1, 0, "kept summary", &[1.0, 0.0, 0.0]).await;
        let orphan = seed(&raw, &vector, "doc", 1, 1, "orphan summary", &[1.0, 0.0, 0.0]).await;
        // Simulate an index/raw-store inconsistency.
        raw.delete(&orphan).await.unwrap();

        let retriever = retriever(raw, vector, MockEmbedder::new().with_dimensions(3));
        let hits = retriever.retrieve("summary", 10, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].element_id, kept);
    }

    #[tokio::test]
    async fn min_score_threshold_filters_hits() {
        let raw = Arc::new(MemoryRawStore::new());
        let vector = Arc::new(MemoryVectorStore::new());
        seed(&raw, &vector, "doc", 1, 0, "alpha", &[1.0, 0.0, 0.0]).await;
        seed(&raw, &vector, "doc", 1, 1, "beta", &[0.0, 1.0, 0.0]).await;

        let embedder = MockEmbedder::new()
            .with_dimensions(3)
            .with_embedding("alpha", vec![1.0, 0.0, 0.0]);
        let config = RetrievalConfig::default().with_min_score(0.9);
        let retriever = HybridRetriever::new(
            Arc::new(embedder),
            raw,
            vector,
            config,
        );

        let hits = retriever.retrieve("alpha", 10, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].summary, "alpha");
    }
}
