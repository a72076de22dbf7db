//! Document discovery and ingestion.
//!
//! Turns user-supplied paths into passages. Extraction failures are local to
//! the document: it is skipped, logged and recorded in the report.

use crate::chunker::Chunker;
use crate::extract::{document_id, DocumentKind, PageExtractor};
use crate::progress::ProgressReporter;
use crate::types::{IngestFailure, IngestReport, Passage};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// Output of an ingestion run.
#[derive(Debug, Clone)]
pub struct Ingestion {
    /// Passages from every successfully extracted document, in discovery order
    pub passages: Vec<Passage>,

    /// What was processed and what failed
    pub report: IngestReport,
}

/// Expand paths into the list of documents to ingest.
///
/// Files are taken as given; directories are walked recursively in file-name
/// order, keeping supported document kinds and skipping hidden entries.
/// Paths that do not exist are returned as failures.
pub fn discover_documents(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<IngestFailure>) {
    let mut documents = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            {
                match entry {
                    Ok(entry) => {
                        let entry_path = entry.path();
                        if entry.file_type().is_file()
                            && DocumentKind::from_path(entry_path).is_supported()
                        {
                            documents.push(entry_path.to_path_buf());
                        }
                    }
                    Err(e) => tracing::warn!("Skipping unreadable entry under {:?}: {}", path, e),
                }
            }
        } else {
            tracing::warn!("Path does not exist: {:?}", path);
            failures.push(IngestFailure {
                path: path.clone(),
                reason: "path does not exist".to_string(),
            });
        }
    }

    (documents, failures)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Extract and chunk every document under `paths`.
pub fn ingest(
    paths: &[PathBuf],
    extractor: &dyn PageExtractor,
    chunker: &Chunker,
    progress: &ProgressReporter,
) -> Ingestion {
    let start = Instant::now();

    let (documents, failures) = discover_documents(paths);
    let total = documents.len() as u64;

    tracing::info!("Ingesting {} documents", total);

    let mut report = IngestReport {
        failures,
        ..Default::default()
    };
    let mut passages = Vec::new();
    let mut names: BTreeMap<String, u32> = BTreeMap::new();

    for (i, path) in documents.iter().enumerate() {
        progress.extract(i as u64 + 1, Some(total), &document_id(path));

        let pages = match extractor.extract(path) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                report.failures.push(IngestFailure {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let document_passages = chunker.chunk(&pages);

        tracing::debug!(
            "Processed {:?}: {} pages, {} passages",
            path,
            pages.len(),
            document_passages.len()
        );

        *names.entry(document_id(path)).or_insert(0) += 1;
        report.documents += 1;
        report.pages += pages.len() as u32;
        report.bytes += pages.iter().map(|p| p.text.len() as u64).sum::<u64>();
        report.passages += document_passages.len() as u32;
        passages.extend(document_passages);
    }

    report.shared_names = names
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect();
    for name in &report.shared_names {
        tracing::warn!("Several documents are named {}; their citations will look alike", name);
    }

    report.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Ingestion completed: {} documents, {} failed, {} pages, {} passages, {} bytes in {:.2}s",
        report.documents,
        report.failures.len(),
        report.pages,
        report.passages,
        report.bytes,
        report.duration_secs
    );

    Ingestion { passages, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FileExtractor;
    use crate::progress::ProgressEvent;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn chunker() -> Chunker {
        Chunker::new(1000, 200).unwrap()
    }

    #[test]
    fn test_discover_walks_directories_in_name_order() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("sub")).unwrap();
        fs::create_dir_all(temp.path().join(".casebook")).unwrap();
        fs::write(temp.path().join("b.txt"), "b").unwrap();
        fs::write(temp.path().join("a.md"), "a").unwrap();
        fs::write(temp.path().join("sub/c.pdf"), "c").unwrap();
        fs::write(temp.path().join("image.png"), "png").unwrap();
        fs::write(temp.path().join(".casebook/hidden.txt"), "h").unwrap();

        let (documents, failures) = discover_documents(&[temp.path().to_path_buf()]);
        let names: Vec<String> = documents.iter().map(|p| document_id(p)).collect();

        assert_eq!(names, vec!["a.md", "b.txt", "c.pdf"]);
        assert!(failures.is_empty());
    }

    #[test]
    fn test_discover_reports_missing_paths() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.pdf");

        let (documents, failures) = discover_documents(&[missing.clone()]);
        assert!(documents.is_empty());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, missing);
    }

    #[test]
    fn test_ingest_continues_past_failed_document() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a_broken.pdf"), "garbage").unwrap();
        fs::write(temp.path().join("b_notes.txt"), "Page one.\x0cPage two.").unwrap();

        let ingestion = ingest(
            &[temp.path().to_path_buf()],
            &FileExtractor,
            &chunker(),
            &ProgressReporter::noop(),
        );

        assert_eq!(ingestion.report.documents, 1);
        assert_eq!(ingestion.report.failures.len(), 1);
        assert!(ingestion.report.failures[0].path.ends_with("a_broken.pdf"));
        assert_eq!(ingestion.report.pages, 2);
        assert_eq!(ingestion.report.passages, 2);
        assert_eq!(ingestion.report.bytes, 18);
        assert_eq!(ingestion.passages[1].text, "Page two.");
        assert_eq!(ingestion.passages[1].page_number, 2);
    }

    #[test]
    fn test_ingest_reports_shared_file_names() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("a")).unwrap();
        fs::create_dir_all(temp.path().join("b")).unwrap();
        fs::write(temp.path().join("a/lease.txt"), "First lease.").unwrap();
        fs::write(temp.path().join("b/lease.txt"), "Second lease.").unwrap();
        fs::write(temp.path().join("b/nda.txt"), "Secrecy.").unwrap();

        let ingestion = ingest(
            &[temp.path().to_path_buf()],
            &FileExtractor,
            &chunker(),
            &ProgressReporter::noop(),
        );

        assert_eq!(ingestion.report.documents, 3);
        assert_eq!(ingestion.report.shared_names, vec!["lease.txt"]);
    }

    #[test]
    fn test_ingest_emits_extract_progress() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("one.txt"), "One.").unwrap();
        fs::write(temp.path().join("two.txt"), "Two.").unwrap();

        let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::new(Arc::new(move |e| sink.lock().unwrap().push(e)));

        ingest(&[temp.path().to_path_buf()], &FileExtractor, &chunker(), &reporter);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.phase == "extract" && e.total == Some(2)));
        assert_eq!(events[1].message, "reading two.txt");
    }
}
