//! The engine facade - wires the pipeline components over injected
//! capabilities.

use chrono::Utc;
use futures::future::join_all;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{EngineError, Result};
use crate::pipeline::answer::AnswerComposer;
use crate::pipeline::extract::ElementExtractor;
use crate::pipeline::index::Indexer;
use crate::pipeline::retrieve::HybridRetriever;
use crate::pipeline::summarize::Summarizer;
use crate::traits::ai::{ChatModel, Embedder};
use crate::traits::parser::{DocumentParser, OcrEngine};
use crate::traits::store::{RawContentStore, VectorStore};
use crate::types::config::EngineConfig;
use crate::types::document::{Document, ElementFailure, ElementSummary, IngestReport};
use crate::types::hit::{Answer, RetrievalHit};

/// The ingestion-and-retrieval engine.
///
/// All capabilities are injected: parser, OCR, chat, embedder, and both
/// stores. The engine owns no ambient state beyond a corpus lock that
/// keeps re-ingestion serialized against queries, so a query observes
/// either the old or the new element set of a document, never a mix.
pub struct Engine<P, O, C, E, R, V> {
    extractor: ElementExtractor<P, O>,
    summarizer: Summarizer<C>,
    indexer: Indexer<E, R, V>,
    retriever: HybridRetriever<E, R, V>,
    composer: AnswerComposer<C>,
    raw: Arc<R>,
    vector: Arc<V>,
    config: EngineConfig,
    /// Writers are the store-mutation phases of ingestion and deletion;
    /// readers are queries. Extraction, summarization, and embedding run
    /// outside this lock.
    corpus_lock: RwLock<()>,
}

impl<P, O, C, E, R, V> Engine<P, O, C, E, R, V>
where
    P: DocumentParser,
    O: OcrEngine,
    C: ChatModel,
    E: Embedder,
    R: RawContentStore,
    V: VectorStore,
{
    /// Create an engine with default configuration.
    pub fn new(parser: P, ocr: O, chat: C, embedder: E, raw: R, vector: V) -> Self {
        Self::with_config(parser, ocr, chat, embedder, raw, vector, EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(
        parser: P,
        ocr: O,
        chat: C,
        embedder: E,
        raw: R,
        vector: V,
        config: EngineConfig,
    ) -> Self {
        let parser = Arc::new(parser);
        let ocr = Arc::new(ocr);
        let chat = Arc::new(chat);
        let embedder = Arc::new(embedder);
        let raw = Arc::new(raw);
        let vector = Arc::new(vector);

        Self {
            extractor: ElementExtractor::new(parser, ocr, &config.ingest),
            summarizer: Summarizer::new(Arc::clone(&chat), &config.ingest),
            indexer: Indexer::new(
                Arc::clone(&embedder),
                Arc::clone(&raw),
                Arc::clone(&vector),
            ),
            retriever: HybridRetriever::new(
                embedder,
                Arc::clone(&raw),
                Arc::clone(&vector),
                config.retrieval.clone(),
            ),
            composer: AnswerComposer::new(chat),
            raw,
            vector,
            config,
            corpus_lock: RwLock::new(()),
        }
    }

    /// Ingest one PDF: extract, summarize, and index its elements.
    ///
    /// Re-ingesting a document id replaces its prior element set. Element
    /// failures during summarization are isolated and reported; a store
    /// failure aborts the call with the failing element rolled back.
    pub async fn ingest_document(
        &self,
        document_id: &str,
        pdf_bytes: &[u8],
    ) -> Result<IngestReport> {
        let elements = self.extractor.extract(document_id, pdf_bytes).await?;

        let mut report = IngestReport::new(document_id);
        report.elements_extracted = elements.len();
        info!(document_id, elements = elements.len(), "extracted elements");

        // Summarize with bounded concurrency, outside the corpus lock.
        // Elements are independent units; order is restored by join_all.
        let semaphore = Arc::new(Semaphore::new(self.config.ingest.concurrency.max(1)));
        let summarized = join_all(elements.into_iter().map(|element| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire().await.unwrap();
                let result = self.summarizer.summarize(&element).await;
                (element, result)
            }
        }))
        .await;

        let mut ready = Vec::with_capacity(summarized.len());
        for (element, result) in summarized {
            match result {
                Ok(summary) => ready.push(element.with_summary(summary)),
                Err(e) => {
                    warn!(
                        element_id = %element.element_id,
                        error = %e,
                        "summarization failed; skipping element"
                    );
                    report.failed.push(ElementFailure {
                        element_id: element.element_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Store-mutation phase: replace the prior element set atomically
        // with respect to queries.
        {
            let _guard = self.corpus_lock.write().await;
            self.indexer.clear_document(document_id).await?;
            for element in &ready {
                self.indexer.index_element(element).await?;
                report.elements_indexed += 1;
                report.summaries.push(ElementSummary {
                    element_id: element.element_id.clone(),
                    summary: element.summary.clone(),
                });
            }
        }

        info!(
            document_id,
            indexed = report.elements_indexed,
            failed = report.failed.len(),
            "ingestion complete"
        );
        Ok(report)
    }

    /// Retrieve up to `top_k` cited hits for a query.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        document_id: Option<&str>,
    ) -> Result<Vec<RetrievalHit>> {
        let _guard = self.corpus_lock.read().await;
        self.retriever.retrieve(query, top_k, document_id).await
    }

    /// Retrieve with cancellation support.
    pub async fn retrieve_with_cancel(
        &self,
        query: &str,
        top_k: usize,
        document_id: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Vec<RetrievalHit>> {
        tokio::select! {
            result = self.retrieve(query, top_k, document_id) => result,
            _ = cancel.cancelled() => Err(EngineError::Cancelled),
        }
    }

    /// Retrieve and compose a grounded answer with citations.
    pub async fn answer(
        &self,
        query: &str,
        top_k: usize,
        document_id: Option<&str>,
    ) -> Result<Answer> {
        let hits = self.retrieve(query, top_k, document_id).await?;
        Ok(self.composer.answer(query, &hits).await?)
    }

    /// Delete a document and all of its elements from both stores.
    ///
    /// Returns the number of entries that were retrievable.
    pub async fn delete_document(&self, document_id: &str) -> Result<usize> {
        let _guard = self.corpus_lock.write().await;
        Ok(self.indexer.clear_document(document_id).await?)
    }

    /// Fetch a document's identity: its ordered element ids.
    pub async fn document(&self, document_id: &str) -> Result<Option<Document>> {
        let mut elements = self.raw.list(Some(document_id)).await?;
        if elements.is_empty() {
            return Ok(None);
        }

        elements.sort_by(|a, b| {
            a.page_number
                .cmp(&b.page_number)
                .then_with(|| a.element_id.cmp(&b.element_id))
        });
        let ingested_at = elements
            .iter()
            .map(|e| e.created_at)
            .min()
            .unwrap_or_else(Utc::now);

        Ok(Some(Document {
            document_id: document_id.to_string(),
            element_ids: elements.into_iter().map(|e| e.element_id).collect(),
            ingested_at,
        }))
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The raw content store.
    pub fn raw_store(&self) -> &R {
        &self.raw
    }

    /// The vector store.
    pub fn vector_store(&self) -> &V {
        &self.vector
    }
}

/// Derive a stable document identifier from a file name and content.
///
/// Same file name and bytes always produce the same id; a re-upload with
/// changed content gets a new id.
pub fn document_id(file_name: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hash = format!("{:x}", hasher.finalize());

    let stem = std::path::Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .trim();

    if stem.is_empty() {
        format!("doc-{}", &hash[..12])
    } else {
        format!("{}-{}", stem, &hash[..8])
    }
}
