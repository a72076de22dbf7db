//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One page of extracted document text.
///
/// Lives only until it has been chunked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage {
    /// Document identifier (the file name)
    pub document_id: String,

    /// 1-indexed page number
    pub page_number: u32,

    /// Full page text
    pub text: String,
}

impl SourcePage {
    /// Create a new page.
    pub fn new(document_id: impl Into<String>, page_number: u32, text: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            page_number,
            text: text.into(),
        }
    }
}

/// A bounded, contiguous slice of a page that gets embedded and retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Passage text
    pub text: String,

    /// Document the passage came from
    pub document_id: String,

    /// Page the passage came from (1-indexed)
    pub page_number: u32,

    /// Position of the passage within its page (0-based)
    pub position: u32,

    /// Start and end character offsets within the page text
    pub char_range: (usize, usize),
}

/// A passage returned by a search, with its relevance to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The retrieved passage
    pub passage: Passage,

    /// Cosine similarity between the query and the passage
    pub relevance: f32,
}

/// A document that could not be ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFailure {
    /// Path of the document
    pub path: PathBuf,

    /// Why the document was skipped
    pub reason: String,
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of documents that contributed pages
    pub documents: u32,

    /// Documents that failed extraction
    pub failures: Vec<IngestFailure>,

    /// Number of pages extracted
    pub pages: u32,

    /// Number of passages created
    pub passages: u32,

    /// Total bytes of extracted page text
    pub bytes: u64,

    /// File names carried by more than one indexed document. Citations name
    /// documents by file name, so passages from these cannot be told apart.
    #[serde(default)]
    pub shared_names: Vec<String>,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Description of the index currently held by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Distinct documents represented in the index
    pub documents: usize,

    /// Indexed passages
    pub passages: usize,

    /// Embedding dimension
    pub dimensions: usize,

    /// Embedding provider and model, e.g. `ollama/nomic-embed-text`
    pub embedder: String,

    /// When the index was built
    pub built_at: DateTime<Utc>,

    /// How long the build took, in seconds
    pub build_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_serialization() {
        let passage = Passage {
            text: "The lease term is five years.".to_string(),
            document_id: "lease.pdf".to_string(),
            page_number: 2,
            position: 0,
            char_range: (0, 29),
        };

        let json = serde_json::to_string(&passage).unwrap();
        let back: Passage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, passage);
    }

    #[test]
    fn test_ingest_report_default() {
        let report = IngestReport::default();
        assert_eq!(report.documents, 0);
        assert!(report.failures.is_empty());
    }
}
