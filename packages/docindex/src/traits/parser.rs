//! Document parser and OCR capability traits.
//!
//! The engine never parses PDF bytes itself: an injected [`DocumentParser`]
//! yields typed page blocks, and an injected [`OcrEngine`] recovers text
//! from image blocks.

use async_trait::async_trait;

use crate::error::{CapabilityError, ExtractionError};

/// Output of the parser capability for one document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Total pages in the document. Zero means nothing was extractable.
    pub page_count: u32,

    /// Segmented blocks across all pages, in no guaranteed order; the
    /// extractor sorts by page then position.
    pub blocks: Vec<ParsedBlock>,
}

impl ParsedDocument {
    /// Create an empty parse result for a page count.
    pub fn new(page_count: u32) -> Self {
        Self {
            page_count,
            blocks: Vec::new(),
        }
    }

    /// Add a block.
    pub fn with_block(mut self, block: ParsedBlock) -> Self {
        self.blocks.push(block);
        self
    }
}

/// One segmented region of a page, before element assembly.
#[derive(Debug, Clone)]
pub struct ParsedBlock {
    /// 1-based page of origin.
    pub page_number: u32,

    /// Top-to-bottom position on the page.
    pub order: u32,

    pub kind: BlockKind,
}

impl ParsedBlock {
    /// A prose text block.
    pub fn text(page_number: u32, order: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            order,
            kind: BlockKind::Text(text.into()),
        }
    }

    /// A table, serialized as markdown or delimited text.
    pub fn table(page_number: u32, order: u32, markdown: impl Into<String>) -> Self {
        Self {
            page_number,
            order,
            kind: BlockKind::Table(markdown.into()),
        }
    }

    /// An image region.
    pub fn image(page_number: u32, order: u32, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            page_number,
            order,
            kind: BlockKind::Image(bytes.into()),
        }
    }
}

/// The content variants a parser can produce.
#[derive(Debug, Clone)]
pub enum BlockKind {
    Text(String),
    Table(String),
    Image(Vec<u8>),
}

/// Capability that segments a PDF into typed page blocks.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Parse a document. Fails only when the document cannot be opened;
    /// a readable document with few or no blocks is a valid result.
    async fn parse(&self, bytes: &[u8]) -> Result<ParsedDocument, ExtractionError>;
}

/// Capability that transcribes text out of an image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Transcribe an image. An empty string is a valid result for images
    /// with no recoverable text.
    async fn transcribe(&self, image: &[u8]) -> Result<String, CapabilityError>;
}
