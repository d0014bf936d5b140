//! Element extraction - turn one PDF into ordered typed elements.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::traits::parser::{BlockKind, DocumentParser, OcrEngine, ParsedBlock};
use crate::types::config::IngestConfig;
use crate::types::element::{Element, ElementContent};

/// Turns one PDF into an ordered sequence of typed elements.
///
/// Elements come out in page order, then top-to-bottom within a page; that
/// ordering is a presentation aid, not a ranking signal. Summaries are left
/// empty for the summarizer.
pub struct ElementExtractor<P, O> {
    parser: Arc<P>,
    ocr: Arc<O>,
    max_text_block_chars: usize,
}

impl<P: DocumentParser, O: OcrEngine> ElementExtractor<P, O> {
    /// Create an extractor over parser and OCR capabilities.
    pub fn new(parser: Arc<P>, ocr: Arc<O>, config: &IngestConfig) -> Self {
        Self {
            parser,
            ocr,
            max_text_block_chars: config.max_text_block_chars,
        }
    }

    /// Extract all elements of a document.
    ///
    /// Fails when the document cannot be opened or has zero extractable
    /// pages. Pages without elements are fine. An image whose OCR yields
    /// nothing (or whose OCR call fails) still produces an element with an
    /// empty transcript.
    pub async fn extract(
        &self,
        document_id: &str,
        pdf_bytes: &[u8],
    ) -> Result<Vec<Element>, ExtractionError> {
        let parsed = self.parser.parse(pdf_bytes).await?;
        if parsed.page_count == 0 {
            return Err(ExtractionError::EmptyDocument);
        }

        let mut blocks = parsed.blocks;
        blocks.sort_by_key(|b| (b.page_number, b.order));

        let mut elements = Vec::new();
        let mut next_seq: HashMap<u32, u32> = HashMap::new();

        for block in blocks {
            let ParsedBlock {
                page_number, kind, ..
            } = block;

            match kind {
                BlockKind::Text(text) => {
                    for piece in split_text_block(&text, self.max_text_block_chars) {
                        if piece.trim().is_empty() {
                            continue;
                        }
                        let seq = take_seq(&mut next_seq, page_number);
                        elements.push(Element::new(
                            document_id,
                            page_number,
                            seq,
                            ElementContent::Text { text: piece },
                        ));
                    }
                }
                BlockKind::Table(markdown) => {
                    if markdown.trim().is_empty() {
                        continue;
                    }
                    let seq = take_seq(&mut next_seq, page_number);
                    elements.push(Element::new(
                        document_id,
                        page_number,
                        seq,
                        ElementContent::Table { markdown },
                    ));
                }
                BlockKind::Image(bytes) => {
                    let transcript = match self.ocr.transcribe(&bytes).await {
                        Ok(text) => text.trim().to_string(),
                        Err(e) => {
                            warn!(
                                page = page_number,
                                error = %e,
                                "OCR failed; keeping element with empty transcript"
                            );
                            String::new()
                        }
                    };
                    let seq = take_seq(&mut next_seq, page_number);
                    elements.push(Element::new(
                        document_id,
                        page_number,
                        seq,
                        ElementContent::Image { bytes, transcript },
                    ));
                }
            }
        }

        debug!(
            document_id,
            pages = parsed.page_count,
            elements = elements.len(),
            "extraction complete"
        );
        Ok(elements)
    }
}

fn take_seq(next_seq: &mut HashMap<u32, u32>, page_number: u32) -> u32 {
    let seq = next_seq.entry(page_number).or_insert(0);
    let current = *seq;
    *seq += 1;
    current
}

/// Split a long text block on paragraph boundaries.
///
/// Paragraphs longer than the limit are hard-split at character
/// boundaries.
pub(crate) fn split_text_block(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let paragraph_len = paragraph.chars().count();

        if !current.is_empty() && current.chars().count() + paragraph_len + 2 > max_chars {
            pieces.push(std::mem::take(&mut current));
        }

        if paragraph_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = paragraph.chars().collect();
            for chunk in chars.chunks(max_chars) {
                pieces.push(chunk.iter().collect());
            }
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    if pieces.is_empty() {
        vec![text.to_string()]
    } else {
        pieces
    }
}
