//! OpenAI-backed implementation of the chat and embedding capabilities.
//!
//! A reference implementation: chat completions for summarization and
//! answers, the embeddings endpoint for vectors.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::CapabilityError;
use crate::traits::ai::{ChatModel, Embedder};

/// OpenAI client implementing [`ChatModel`] and [`Embedder`].
///
/// Defaults to `gpt-4o` for generation and `text-embedding-3-small`
/// (1536 dimensions) for embeddings, with temperature 0 so summaries stay
/// stable across runs.
#[derive(Clone)]
pub struct OpenAi {
    client: Client,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    embedding_dimensions: usize,
    base_url: String,
}

impl OpenAi {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            chat_model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, CapabilityError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| CapabilityError::msg("OPENAI_API_KEY not set"))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Set the embedding model and its dimensionality
    /// (default: text-embedding-3-small, 1536).
    pub fn with_embedding_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embedding_model = model.into();
        self.embedding_dimensions = dimensions;
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl ChatModel for OpenAi {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError> {
        let request = ChatRequest {
            model: self.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(CapabilityError::new)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::msg(format!(
                "OpenAI chat error {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(CapabilityError::new)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| CapabilityError::msg("empty chat response"))
    }
}

#[async_trait]
impl Embedder for OpenAi {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        vectors
            .pop()
            .ok_or_else(|| CapabilityError::msg("empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, CapabilityError> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(CapabilityError::new)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CapabilityError::msg(format!(
                "OpenAI embeddings error {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(CapabilityError::new)?;
        if parsed.data.len() != texts.len() {
            return Err(CapabilityError::msg(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        self.embedding_dimensions
    }
}
