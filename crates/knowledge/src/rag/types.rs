//! RAG response types.

use serde::{Deserialize, Serialize};

/// A passage the answer was grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    /// Document the passage came from (e.g. "lease.pdf")
    pub document_id: String,

    /// Page the passage came from (1-indexed)
    pub page_number: u32,

    /// Short snippet of the passage, marked with "..." when truncated
    pub excerpt: String,
}

/// Answer to a question plus the passages it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Generated answer text
    pub answer: String,

    /// One citation per retrieved passage, in ranking order
    pub citations: Vec<SourceCitation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_result_serialization() {
        let result = RetrievalResult {
            answer: "The term is five years [1].".to_string(),
            citations: vec![SourceCitation {
                document_id: "lease.pdf".to_string(),
                page_number: 2,
                excerpt: "The term of this lease is five years...".to_string(),
            }],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["citations"][0]["document_id"], "lease.pdf");
        assert_eq!(json["citations"][0]["page_number"], 2);

        let back: RetrievalResult = serde_json::from_value(json).unwrap();
        assert_eq!(back.citations, result.citations);
    }
}
