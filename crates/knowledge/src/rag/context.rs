//! Prompt context assembly and citation excerpts.

use crate::rag::types::SourceCitation;
use crate::types::SearchHit;
use unicode_segmentation::UnicodeSegmentation;

/// Marker appended to excerpts that were cut short.
pub const TRUNCATION_MARKER: &str = "...";

/// Render retrieved passages as numbered, attributed blocks for the prompt.
///
/// ```text
/// [1] lease.pdf (page 3)
/// The term of this lease ...
///
/// [2] ...
/// ```
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[{}] {} (page {})\n{}",
                i + 1,
                hit.passage.document_id,
                hit.passage.page_number,
                hit.passage.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One citation per hit, in the same order.
pub fn citations(hits: &[SearchHit], excerpt_chars: usize) -> Vec<SourceCitation> {
    hits.iter()
        .map(|hit| SourceCitation {
            document_id: hit.passage.document_id.clone(),
            page_number: hit.passage.page_number,
            excerpt: excerpt(&hit.passage.text, excerpt_chars),
        })
        .collect()
}

/// First `max_chars` grapheme clusters of `text`, plus a marker if cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.grapheme_indices(true).nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
