//! Text rendering for command output.

use casebook_knowledge::rag::context::excerpt;
use casebook_knowledge::{IndexSummary, IngestReport, RetrievalResult, SearchHit};

/// Answer followed by its sources and the generation time.
pub fn answer(result: &RetrievalResult, generation_secs: f64) -> String {
    let mut out = String::new();
    out.push_str(result.answer.trim_end());
    out.push_str("\n\nSources:\n");

    if result.citations.is_empty() {
        out.push_str("  (none)\n");
    }

    for (i, citation) in result.citations.iter().enumerate() {
        out.push_str(&format!(
            "  [{}] {} (page {})\n      {}\n",
            i + 1,
            citation.document_id,
            citation.page_number,
            citation.excerpt
        ));
    }

    out.push_str(&format!("\nGenerated in {:.2} sec", generation_secs));
    out
}

/// Ranked passages with their relevance scores.
pub fn hits(hits: &[SearchHit], excerpt_chars: usize) -> String {
    if hits.is_empty() {
        return "No matching passages.".to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {} (page {}) relevance {:.3}\n   {}",
                i + 1,
                hit.passage.document_id,
                hit.passage.page_number,
                hit.relevance,
                excerpt(&hit.passage.text, excerpt_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ingestion summary, with a note when documents share a file name.
pub fn report(report: &IngestReport) -> String {
    let mut out = format!(
        "Indexed {} documents ({} pages, {} passages, {} bytes) in {:.2}s, {} failed",
        report.documents,
        report.pages,
        report.passages,
        report.bytes,
        report.duration_secs,
        report.failures.len()
    );

    if !report.shared_names.is_empty() {
        out.push_str(&format!(
            "\nNote: several documents are named {}; sources cite file names only",
            report.shared_names.join(", ")
        ));
    }

    out
}

pub fn summary(summary: &IndexSummary) -> String {
    format!(
        "{} documents, {} passages, {} dimensions ({}), built {} in {:.2}s",
        summary.documents,
        summary.passages,
        summary.dimensions,
        summary.embedder,
        summary.built_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.build_secs
    )
}
