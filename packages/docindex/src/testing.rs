//! Mock capability implementations for testing.
//!
//! All mocks share state through `Arc`, so a clone kept by the test
//! observes (and can reconfigure) the instance handed to the engine,
//! without real parsers, OCR, or model calls.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{CapabilityError, ExtractionError};
use crate::traits::ai::{ChatModel, Embedder};
use crate::traits::parser::{DocumentParser, OcrEngine, ParsedBlock, ParsedDocument};

/// A mock document parser that returns configured page blocks.
///
/// The page count tracks the highest page a block was added to; block
/// order follows insertion order.
#[derive(Clone, Default)]
pub struct MockParser {
    blocks: Arc<RwLock<Vec<ParsedBlock>>>,
    page_count: Arc<RwLock<u32>>,
    fail: Arc<RwLock<bool>>,
    calls: Arc<RwLock<usize>>,
}

impl MockParser {
    /// Create an empty parser (zero pages).
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, block: ParsedBlock) {
        let mut page_count = self.page_count.write().unwrap();
        if block.page_number > *page_count {
            *page_count = block.page_number;
        }
        self.blocks.write().unwrap().push(block);
    }

    /// Add a text block on a page.
    pub fn with_text(self, page_number: u32, text: impl Into<String>) -> Self {
        let order = self.blocks.read().unwrap().len() as u32;
        self.push(ParsedBlock::text(page_number, order, text));
        self
    }

    /// Add a table block on a page.
    pub fn with_table(self, page_number: u32, markdown: impl Into<String>) -> Self {
        let order = self.blocks.read().unwrap().len() as u32;
        self.push(ParsedBlock::table(page_number, order, markdown));
        self
    }

    /// Add an image block on a page.
    pub fn with_image(self, page_number: u32, bytes: impl Into<Vec<u8>>) -> Self {
        let order = self.blocks.read().unwrap().len() as u32;
        self.push(ParsedBlock::image(page_number, order, bytes));
        self
    }

    /// Declare empty pages up to a count, without adding blocks.
    pub fn with_page_count(self, page_count: u32) -> Self {
        let mut current = self.page_count.write().unwrap();
        if page_count > *current {
            *current = page_count;
        }
        drop(current);
        self
    }

    /// Make every parse call fail.
    pub fn failing(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    /// Drop all configured blocks and pages.
    pub fn reset(&self) {
        self.blocks.write().unwrap().clear();
        *self.page_count.write().unwrap() = 0;
    }

    /// Number of parse calls made.
    pub fn calls(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl DocumentParser for MockParser {
    async fn parse(&self, _bytes: &[u8]) -> Result<ParsedDocument, ExtractionError> {
        *self.calls.write().unwrap() += 1;

        if *self.fail.read().unwrap() {
            return Err(ExtractionError::Unreadable {
                reason: "mock parser failure".to_string(),
            });
        }

        Ok(ParsedDocument {
            page_count: *self.page_count.read().unwrap(),
            blocks: self.blocks.read().unwrap().clone(),
        })
    }
}

/// A mock OCR engine keyed by exact image bytes.
///
/// Unknown images transcribe to the empty string, matching a scan with no
/// recoverable text.
#[derive(Clone, Default)]
pub struct MockOcr {
    transcripts: Arc<RwLock<HashMap<Vec<u8>, String>>>,
    fail: Arc<RwLock<bool>>,
    calls: Arc<RwLock<usize>>,
}

impl MockOcr {
    /// Create an OCR engine that transcribes everything to "".
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transcript for an image.
    pub fn with_transcript(self, image: impl Into<Vec<u8>>, text: impl Into<String>) -> Self {
        self.transcripts
            .write()
            .unwrap()
            .insert(image.into(), text.into());
        self
    }

    /// Make every transcribe call fail.
    pub fn failing(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    /// Number of transcribe calls made.
    pub fn calls(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    async fn transcribe(&self, image: &[u8]) -> Result<String, CapabilityError> {
        *self.calls.write().unwrap() += 1;

        if *self.fail.read().unwrap() {
            return Err(CapabilityError::msg("mock OCR failure"));
        }

        Ok(self
            .transcripts
            .read()
            .unwrap()
            .get(image)
            .cloned()
            .unwrap_or_default())
    }
}

/// A mock embedder producing deterministic sha-seeded vectors.
///
/// The same text always embeds to the same vector; different texts get
/// different vectors. Exact vectors can be pinned per text.
#[derive(Clone)]
pub struct MockEmbedder {
    dimensions: usize,
    overrides: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    fail: Arc<RwLock<bool>>,
    calls: Arc<RwLock<usize>>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            dimensions: 64,
            overrides: Arc::default(),
            fail: Arc::default(),
            calls: Arc::default(),
        }
    }
}

impl MockEmbedder {
    /// Create an embedder with the default dimensionality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the vector dimensionality.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Pin the vector returned for an exact text. The vector length must
    /// match the configured dimensionality.
    pub fn with_embedding(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.overrides.write().unwrap().insert(text.into(), vector);
        self
    }

    /// Make every embed call fail.
    pub fn failing(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    /// Number of embed calls made.
    pub fn calls(&self) -> usize {
        *self.calls.read().unwrap()
    }

    fn deterministic_vector(&self, text: &str) -> Vec<f32> {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        (0..self.dimensions)
            .map(|i| {
                let byte = hash[i % hash.len()] as f32;
                (byte / 127.5) - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        *self.calls.write().unwrap() += 1;

        if *self.fail.read().unwrap() {
            return Err(CapabilityError::msg("mock embedder failure"));
        }

        Ok(self
            .overrides
            .read()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.deterministic_vector(text)))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A mock chat model with substring-matched canned responses.
///
/// The first configured `(substring, response)` pair whose substring
/// appears in the prompt wins; otherwise a fixed default reply is
/// returned. Prompts are recorded for assertions.
#[derive(Clone, Default)]
pub struct MockChat {
    responses: Arc<RwLock<Vec<(String, String)>>>,
    fail: Arc<RwLock<bool>>,
    fail_on: Arc<RwLock<Vec<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockChat {
    /// Create a chat model that answers everything with a default reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned response for prompts containing a substring. An empty
    /// substring matches every prompt.
    pub fn with_response(self, substring: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .push((substring.into(), response.into()));
        self
    }

    /// Make every generate call fail.
    pub fn failing(self) -> Self {
        *self.fail.write().unwrap() = true;
        self
    }

    /// Toggle failure at runtime (the engine holds the same shared state).
    pub fn set_failing(&self, failing: bool) {
        *self.fail.write().unwrap() = failing;
    }

    /// Fail only for prompts containing a substring.
    pub fn with_failure_on(self, substring: impl Into<String>) -> Self {
        self.fail_on.write().unwrap().push(substring.into());
        self
    }

    /// Prompts received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn generate(&self, prompt: &str) -> Result<String, CapabilityError> {
        self.calls.write().unwrap().push(prompt.to_string());

        if *self.fail.read().unwrap() {
            return Err(CapabilityError::msg("mock chat failure"));
        }
        if self
            .fail_on
            .read()
            .unwrap()
            .iter()
            .any(|s| prompt.contains(s))
        {
            return Err(CapabilityError::msg("mock chat failure"));
        }

        let responses = self.responses.read().unwrap();
        let reply = responses
            .iter()
            .find(|(substring, _)| prompt.contains(substring))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| "Mock reply.".to_string());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embedder_is_deterministic() {
        let embedder = MockEmbedder::new().with_dimensions(16);

        let a = embedder.embed("hello").await.unwrap();
        let b = embedder.embed("hello").await.unwrap();
        let c = embedder.embed("world").await.unwrap();

        assert_eq!(a.len(), 16);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(embedder.calls(), 3);
    }

    #[tokio::test]
    async fn chat_matches_substrings_in_order() {
        let chat = MockChat::new()
            .with_response("table", "A table description.")
            .with_response("", "Fallback.");

        assert_eq!(
            chat.generate("summarize this table please").await.unwrap(),
            "A table description."
        );
        assert_eq!(chat.generate("anything else").await.unwrap(), "Fallback.");
        assert_eq!(chat.calls().len(), 2);
    }

    #[tokio::test]
    async fn chat_failure_scoped_to_substring() {
        let chat = MockChat::new().with_failure_on("poison");

        assert!(chat.generate("normal prompt").await.is_ok());
        assert!(chat.generate("contains poison block").await.is_err());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let parser = MockParser::new();
        let handle = parser.clone();

        let parser = parser.with_text(1, "block");
        let parsed = parser.parse(b"ignored").await.unwrap();
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(handle.calls(), 1);

        handle.reset();
        let parsed = parser.parse(b"ignored").await.unwrap();
        assert_eq!(parsed.page_count, 0);
        assert!(parsed.blocks.is_empty());
    }

    #[tokio::test]
    async fn ocr_defaults_to_empty_transcript() {
        let ocr = MockOcr::new().with_transcript(vec![1u8], "known");

        assert_eq!(ocr.transcribe(&[1u8]).await.unwrap(), "known");
        assert_eq!(ocr.transcribe(&[2u8]).await.unwrap(), "");
    }
}
