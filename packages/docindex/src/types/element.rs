//! Element types - the atomic unit of extraction and retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable identifier of one extracted element.
///
/// Formatted as `{document_id}:{page}:{seq}` where `seq` is the 0-based
/// position of the element within its page. The `Ord` impl gives queries a
/// deterministic final tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(String);

impl ElementId {
    /// Compose an id from its parts.
    pub fn new(document_id: &str, page_number: u32, sequence: u32) -> Self {
        Self(format!("{document_id}:{page_number}:{sequence}"))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What kind of content an element carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Text,
    Table,
    Image,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Text => "text",
            ElementType::Table => "table",
            ElementType::Image => "image",
        };
        f.write_str(name)
    }
}

/// Type-dependent payload of an element.
///
/// Tables stay serialized (markdown), never rasterized, so the raw content
/// remains useful for faithful citation. Images carry the original bytes
/// plus the OCR transcript; an empty transcript is a valid state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementContent {
    Text {
        text: String,
    },
    Table {
        markdown: String,
    },
    Image {
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
        transcript: String,
    },
}

impl ElementContent {
    /// The element type this content belongs to.
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementContent::Text { .. } => ElementType::Text,
            ElementContent::Table { .. } => ElementType::Table,
            ElementContent::Image { .. } => ElementType::Image,
        }
    }

    /// Text used as summarization input and for citation display.
    ///
    /// For images this is the OCR transcript, which may be empty.
    pub fn searchable_text(&self) -> &str {
        match self {
            ElementContent::Text { text } => text,
            ElementContent::Table { markdown } => markdown,
            ElementContent::Image { transcript, .. } => transcript,
        }
    }
}

/// One extracted unit of a document: a text block, a table, or an image.
///
/// Created during ingestion, never mutated after indexing; deleted only
/// when its owning document is deleted or re-ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub element_id: ElementId,
    pub document_id: String,
    /// 1-based page of origin.
    pub page_number: u32,
    pub content: ElementContent,
    /// Short generated description used as the embedding/search key and
    /// for display. Empty until the summarizer has run.
    pub summary: String,
    /// SHA-256 of the raw content, for idempotence checks.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Element {
    /// Create a new element with an empty summary.
    pub fn new(
        document_id: impl Into<String>,
        page_number: u32,
        sequence: u32,
        content: ElementContent,
    ) -> Self {
        let document_id = document_id.into();
        let content_hash = Self::hash_content(&content);
        Self {
            element_id: ElementId::new(&document_id, page_number, sequence),
            document_id,
            page_number,
            content,
            summary: String::new(),
            content_hash,
            created_at: Utc::now(),
        }
    }

    /// Calculate the SHA-256 hash of element content.
    pub fn hash_content(content: &ElementContent) -> String {
        let mut hasher = Sha256::new();
        match content {
            ElementContent::Text { text } => hasher.update(text.as_bytes()),
            ElementContent::Table { markdown } => hasher.update(markdown.as_bytes()),
            ElementContent::Image { bytes, transcript } => {
                hasher.update(bytes);
                hasher.update(transcript.as_bytes());
            }
        }
        format!("{:x}", hasher.finalize())
    }

    /// The element type of this element's content.
    pub fn element_type(&self) -> ElementType {
        self.content.element_type()
    }

    /// Attach the generated summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_id_format() {
        let id = ElementId::new("report", 2, 1);
        assert_eq!(id.as_str(), "report:2:1");
    }

    #[test]
    fn content_hash_is_stable() {
        let a = ElementContent::Text {
            text: "Hello, world!".to_string(),
        };
        let b = ElementContent::Text {
            text: "Hello, world!".to_string(),
        };
        assert_eq!(Element::hash_content(&a), Element::hash_content(&b));
        assert_eq!(Element::hash_content(&a).len(), 64); // SHA-256 hex
    }

    #[test]
    fn hash_distinguishes_transcript() {
        let plain = ElementContent::Image {
            bytes: vec![1, 2, 3],
            transcript: String::new(),
        };
        let transcribed = ElementContent::Image {
            bytes: vec![1, 2, 3],
            transcript: "invoice total".to_string(),
        };
        assert_ne!(
            Element::hash_content(&plain),
            Element::hash_content(&transcribed)
        );
    }

    #[test]
    fn image_bytes_round_trip_as_base64() {
        let element = Element::new(
            "doc",
            1,
            0,
            ElementContent::Image {
                bytes: vec![0, 159, 146, 150],
                transcript: "scan".to_string(),
            },
        );
        let json = serde_json::to_string(&element).unwrap();
        assert!(json.contains("AJ+Slg==")); // base64, not a byte array
        let back: Element = serde_json::from_str(&json).unwrap();
        match back.content {
            ElementContent::Image { bytes, .. } => assert_eq!(bytes, vec![0, 159, 146, 150]),
            _ => panic!("expected image content"),
        }
    }

    #[test]
    fn searchable_text_per_type() {
        let table = ElementContent::Table {
            markdown: "| a | b |".to_string(),
        };
        assert_eq!(table.searchable_text(), "| a | b |");
        assert_eq!(table.element_type(), ElementType::Table);
    }
}
