//! Embedding and chat capability traits.
//!
//! These are separate capabilities: the embedder must be the same model at
//! index time and query time, while the chat model serves both per-element
//! summarization and final answer generation.

use async_trait::async_trait;

use crate::error::CapabilityError;

/// Capability that embeds text into fixed-length vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;

    /// Embed multiple texts. Default implementation calls `embed`
    /// sequentially; batch-capable backends should override.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Vector dimensionality this embedder produces.
    fn dimensions(&self) -> usize;
}

/// Capability that generates text from a prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError>;
}
