//! Retrieval hits, citations, and answers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::element::{Element, ElementId};

/// One ranked result of a hybrid query, resolved back to raw content.
///
/// Transient: produced per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub element_id: ElementId,
    pub document_id: String,
    pub page_number: u32,
    /// Normalized semantic-channel score; 0.0 when the element was absent
    /// from the semantic candidate set.
    pub semantic_score: f32,
    /// Normalized keyword-channel score; 0.0 when absent from the keyword
    /// candidate set.
    pub keyword_score: f32,
    /// Fused ranking score.
    pub fused_score: f32,
    /// The summary that matched.
    pub summary: String,
    /// The resolved element with its raw content.
    pub element: Element,
}

impl RetrievalHit {
    /// Provenance pointer for this hit.
    pub fn citation(&self) -> Citation {
        Citation {
            document_id: self.document_id.clone(),
            page_number: self.page_number,
            element_id: self.element_id.clone(),
        }
    }
}

/// A resolved pointer from a hit back to its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub page_number: u32,
    pub element_id: ElementId,
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (page {})", self.document_id, self.page_number)
    }
}

/// A generated answer with its citations, in the order the hits were used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub citations: Vec<Citation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_display() {
        let citation = Citation {
            document_id: "annual-report".to_string(),
            page_number: 12,
            element_id: ElementId::new("annual-report", 12, 3),
        };
        assert_eq!(citation.to_string(), "annual-report (page 12)");
    }
}
