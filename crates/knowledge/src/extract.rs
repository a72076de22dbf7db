//! Document text extraction, page by page.

use crate::types::SourcePage;
use casebook_core::{AppError, AppResult};
use std::fs;
use std::path::Path;

/// Page separator used by plain-text and markdown documents.
const FORM_FEED: char = '\x0c';

/// Document kind classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Markdown,
    Unsupported,
}

impl DocumentKind {
    /// Detect document kind from file extension.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("txt") => Self::PlainText,
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Unsupported,
        }
    }

    /// Whether documents of this kind can be extracted.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "text",
            Self::Markdown => "markdown",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Turns a document on disk into its pages.
///
/// Pages come back in document order with 1-indexed page numbers. A failure
/// is reported as `AppError::Extraction` and concerns only that document.
pub trait PageExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> AppResult<Vec<SourcePage>>;
}

/// Extractor for PDF, plain-text and markdown files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileExtractor;

impl PageExtractor for FileExtractor {
    fn extract(&self, path: &Path) -> AppResult<Vec<SourcePage>> {
        let document_id = document_id(path);
        let kind = DocumentKind::from_path(path);

        tracing::debug!("Extracting {:?} as {}", path, kind.as_str());

        let texts = match kind {
            DocumentKind::Pdf => extract_pdf(path)?,
            DocumentKind::PlainText => split_pages(&read_text(path)?),
            DocumentKind::Markdown => split_pages(&read_text(path)?)
                .iter()
                .map(|page| clean_markdown(page))
                .collect(),
            DocumentKind::Unsupported => {
                return Err(AppError::Extraction(format!(
                    "Unsupported document type: {:?}",
                    path
                )))
            }
        };

        Ok(texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| SourcePage::new(document_id.clone(), i as u32 + 1, text))
            .collect())
    }
}

/// Document identifier for a path: its file name.
///
/// Only the file name is kept, so `a/lease.pdf` and `b/lease.pdf` share an
/// identifier. Ingestion reports such collisions in
/// [`IngestReport::shared_names`](crate::types::IngestReport::shared_names).
pub fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn extract_pdf(path: &Path) -> AppResult<Vec<String>> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::Extraction(format!("Failed to read {:?}: {}", path, e)))?;

    // pdf-extract panics on some malformed fonts and encodings
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))
        .map_err(|_| AppError::Extraction(format!("PDF parser crashed on {:?}", path)))?;

    pages.map_err(|e| AppError::Extraction(format!("PDF extraction failed for {:?}: {}", path, e)))
}

fn read_text(path: &Path) -> AppResult<String> {
    fs::read_to_string(path)
        .map_err(|e| AppError::Extraction(format!("Failed to read {:?}: {}", path, e)))
}

/// Split text into pages on form feeds. Text without one is a single page.
fn split_pages(text: &str) -> Vec<String> {
    text.split(FORM_FEED).map(str::to_string).collect()
}

/// Strip heading markers, rules and code fences from markdown.
fn clean_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.lines() {
        let trimmed = line.trim_start_matches('#').trim();

        if trimmed.starts_with("---") || trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }

        if !trimmed.is_empty() {
            result.push_str(trimmed);
            result.push('\n');
        }
    }

    result.trim().to_string()
}
