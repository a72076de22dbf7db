//! Page chunking with configurable size and overlap.
//!
//! Passages never cross a page boundary. Splits prefer natural boundaries
//! (paragraphs, lines, sentences, words) via `text-splitter` and fall back to
//! a hard character cut.

use crate::types::{Passage, SourcePage};
use casebook_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Splits pages into overlapping, bounded passages.
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    splitter: TextSplitter<Characters>,
}

impl Chunker {
    /// Create a chunker producing passages of at most `chunk_size` characters
    /// with `chunk_overlap` characters shared between neighbours.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        // Untrimmed chunks keep their offsets meaningful within the page
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunk configuration: {}", e)))?
            .with_trim(false);

        Ok(Self {
            chunk_size,
            chunk_overlap,
            splitter: TextSplitter::new(config),
        })
    }

    /// Chunk every page, in order.
    pub fn chunk(&self, pages: &[SourcePage]) -> Vec<Passage> {
        let passages: Vec<Passage> = pages.iter().flat_map(|page| self.chunk_page(page)).collect();

        tracing::debug!(
            "Chunked {} pages into {} passages (size: {}, overlap: {})",
            pages.len(),
            passages.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        passages
    }

    /// Chunk a single page.
    pub fn chunk_page(&self, page: &SourcePage) -> Vec<Passage> {
        let text = page.text.as_str();
        if text.trim().is_empty() {
            return Vec::new();
        }

        let total_chars = text.chars().count();
        if total_chars <= self.chunk_size {
            return vec![passage(page, 0, text.to_string(), (0, total_chars))];
        }

        let mut passages = Vec::new();
        // chunk_indices yields non-decreasing byte offsets; convert them to
        // character offsets incrementally.
        let mut last_byte = 0;
        let mut last_char = 0;

        for (byte_offset, chunk) in self.splitter.chunk_indices(text) {
            last_char += text[last_byte..byte_offset].chars().count();
            last_byte = byte_offset;

            if chunk.trim().is_empty() {
                continue;
            }

            let start = last_char;
            let end = start + chunk.chars().count();
            passages.push(passage(
                page,
                passages.len() as u32,
                chunk.to_string(),
                (start, end),
            ));
        }

        passages
    }
}

fn passage(page: &SourcePage, position: u32, text: String, char_range: (usize, usize)) -> Passage {
    Passage {
        text,
        document_id: page.document_id.clone(),
        page_number: page.page_number,
        position,
        char_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker() -> Chunker {
        Chunker::new(1000, 200).unwrap()
    }

    fn chars(text: &str, range: (usize, usize)) -> String {
        text.chars().skip(range.0).take(range.1 - range.0).collect()
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(Chunker::new(0, 0), Err(AppError::Config(_))));
        assert!(matches!(Chunker::new(100, 100), Err(AppError::Config(_))));
        assert!(matches!(Chunker::new(100, 150), Err(AppError::Config(_))));
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_page_is_single_passage() {
        let page = SourcePage::new("nda.pdf", 1, "  Confidential information excludes public data.\n");
        let passages = chunker().chunk_page(&page);

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, page.text);
        assert_eq!(passages[0].document_id, "nda.pdf");
        assert_eq!(passages[0].page_number, 1);
        assert_eq!(passages[0].position, 0);
    }

    #[test]
    fn test_page_at_exact_chunk_size_is_single_passage() {
        let page = SourcePage::new("doc.txt", 4, "b".repeat(1000));
        let passages = chunker().chunk_page(&page);

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].char_range, (0, 1000));
    }

    #[test]
    fn test_blank_page_yields_nothing() {
        let pages = vec![
            SourcePage::new("doc.pdf", 1, ""),
            SourcePage::new("doc.pdf", 2, " \n\t "),
        ];
        assert!(chunker().chunk(&pages).is_empty());
    }

    #[test]
    fn test_fifty_and_fifteen_hundred_char_pages() {
        let pages = vec![
            SourcePage::new("brief.pdf", 1, "x".repeat(50)),
            SourcePage::new("brief.pdf", 2, "a".repeat(1500)),
        ];

        let passages = chunker().chunk(&pages);
        assert_eq!(passages.len(), 3);

        assert_eq!(passages[0].page_number, 1);
        assert_eq!(passages[0].text.chars().count(), 50);

        let first = &passages[1];
        let second = &passages[2];
        assert_eq!(first.page_number, 2);
        assert_eq!(second.page_number, 2);
        assert_eq!(first.char_range, (0, 1000));
        assert_eq!(first.text.chars().count(), 1000);
        assert_eq!(second.char_range, (800, 1500));
        assert_eq!(second.text.chars().count(), 700);
        assert_eq!(second.position, 1);
    }

    #[test]
    fn test_passages_reconstruct_page() {
        let text: String = (1..=40)
            .map(|i| {
                format!(
                    "Clause {}. The Licensee shall not sublicense the Software without prior written consent. ",
                    i
                )
            })
            .collect();
        let page = SourcePage::new("license.txt", 3, text.clone());

        let passages = chunker().chunk_page(&page);
        assert!(passages.len() > 2);

        let mut rebuilt = String::new();
        let mut covered = 0;
        for (i, passage) in passages.iter().enumerate() {
            assert_eq!(passage.position as usize, i);
            assert!(passage.text.chars().count() <= 1000);
            assert_eq!(passage.text, chars(&text, passage.char_range));

            let (start, end) = passage.char_range;
            assert!(start <= covered, "gap before passage {}", i);
            if i > 0 {
                assert!(covered - start <= 200, "overlap too large before passage {}", i);
            }
            rebuilt.push_str(&chars(&text, (covered, end)));
            covered = end;
        }

        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_multibyte_text_ranges_are_characters() {
        let text = "Ação rescisória é cabível. ".repeat(80);
        let page = SourcePage::new("acordao.txt", 1, text.clone());

        let passages = chunker().chunk_page(&page);
        assert!(passages.len() > 1);
        for passage in &passages {
            assert_eq!(passage.text, chars(&text, passage.char_range));
        }
        assert_eq!(passages.last().unwrap().char_range.1, text.chars().count());
    }

    #[test]
    fn test_chunk_preserves_page_order() {
        let pages = vec![
            SourcePage::new("a.pdf", 1, "First page."),
            SourcePage::new("a.pdf", 2, "Second page."),
            SourcePage::new("b.pdf", 1, "Other document."),
        ];

        let passages = chunker().chunk(&pages);
        let provenance: Vec<(&str, u32)> = passages
            .iter()
            .map(|p| (p.document_id.as_str(), p.page_number))
            .collect();
        assert_eq!(provenance, vec![("a.pdf", 1), ("a.pdf", 2), ("b.pdf", 1)]);
    }
}
