//! Configuration types for ingestion and retrieval.

use serde::{Deserialize, Serialize};

/// Configuration for the whole engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub ingest: IngestConfig,
    pub retrieval: RetrievalConfig,
}

impl EngineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ingestion config.
    pub fn with_ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    /// Set the retrieval config.
    pub fn with_retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = retrieval;
        self
    }
}

/// Configuration for one ingestion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Number of concurrent summarization tasks. Elements of a document are
    /// independent units, so summarization parallelizes freely.
    pub concurrency: usize,

    /// Upper bound on summary length, in characters. Keeps embeddings
    /// compact and citations readable.
    pub max_summary_chars: usize,

    /// Text blocks longer than this are split into multiple elements on
    /// paragraph boundaries before summarization.
    pub max_text_block_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_summary_chars: 480,
            max_text_block_chars: 800,
        }
    }
}

impl IngestConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the summarization concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the summary length bound.
    pub fn with_max_summary_chars(mut self, max: usize) -> Self {
        self.max_summary_chars = max;
        self
    }

    /// Set the text block split threshold.
    pub fn with_max_text_block_chars(mut self, max: usize) -> Self {
        self.max_text_block_chars = max;
        self
    }
}

/// Configuration for hybrid retrieval.
///
/// Fusion weighting is deliberately configuration, not a constant: the
/// right balance between the semantic and keyword channels depends on the
/// corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Weight of the semantic channel in the fused score (0.0 to 1.0).
    /// The remaining weight goes to the keyword channel.
    pub semantic_weight: f32,

    /// Bonus added when an element appears in both candidate sets, so
    /// dual presence is rewarded over either channel alone.
    pub dual_presence_bonus: f32,

    /// Candidates drawn from the semantic channel before fusion.
    pub candidate_k_semantic: usize,

    /// Candidates drawn from the keyword channel before fusion.
    pub candidate_k_keyword: usize,

    /// Minimum fused score a hit must reach to be returned.
    pub min_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.6,
            dual_presence_bonus: 0.1,
            candidate_k_semantic: 20,
            candidate_k_keyword: 20,
            min_score: 0.0,
        }
    }
}

impl RetrievalConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of the keyword channel.
    pub fn keyword_weight(&self) -> f32 {
        1.0 - self.semantic_weight
    }

    /// Set the semantic channel weight.
    pub fn with_semantic_weight(mut self, weight: f32) -> Self {
        self.semantic_weight = weight;
        self
    }

    /// Set the dual-presence bonus.
    pub fn with_dual_presence_bonus(mut self, bonus: f32) -> Self {
        self.dual_presence_bonus = bonus;
        self
    }

    /// Set per-channel candidate counts.
    pub fn with_candidate_k(mut self, semantic: usize, keyword: usize) -> Self {
        self.candidate_k_semantic = semantic;
        self.candidate_k_keyword = keyword;
        self
    }

    /// Set the minimum fused score.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }
}
