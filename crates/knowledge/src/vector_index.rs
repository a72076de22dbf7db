//! In-memory vector index with diversity-aware search.
//!
//! Search gathers the most similar candidates by cosine similarity and then
//! re-ranks them with maximal marginal relevance (MMR), so near-duplicate
//! passages do not crowd out the rest of the results.

use crate::embeddings::EmbeddingProvider;
use crate::progress::ProgressReporter;
use crate::types::{Passage, SearchHit};
use casebook_core::{AppError, AppResult};
use std::collections::HashSet;
use std::sync::Arc;

/// Passages sent to the embedder per request while building.
const EMBED_BATCH_SIZE: usize = 32;

/// Search tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    /// Candidates gathered before re-ranking (raised to `k` when smaller)
    pub fetch_k: usize,

    /// 1.0 ranks by relevance only, 0.0 by diversity only
    pub mmr_lambda: f32,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            fetch_k: 20,
            mmr_lambda: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    passage: Passage,
    embedding: Vec<f32>,
}

/// Collection of embedded passages supporting similarity search.
///
/// An index starts unbuilt. `build` fills it from one batch of passages and
/// a later `build` replaces the whole contents.
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    options: IndexOptions,
    entries: Option<Vec<IndexedEntry>>,
}

impl VectorIndex {
    /// Create an empty, unbuilt index.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, options: IndexOptions) -> Self {
        Self {
            embedder,
            options,
            entries: None,
        }
    }

    /// Embed and store `passages`, replacing any previous contents.
    pub async fn build(&mut self, passages: Vec<Passage>) -> AppResult<usize> {
        self.build_with_progress(passages, &ProgressReporter::noop())
            .await
    }

    /// Like [`build`](Self::build), emitting `embed` progress events per batch.
    ///
    /// On error the previous contents are left untouched.
    pub async fn build_with_progress(
        &mut self,
        passages: Vec<Passage>,
        progress: &ProgressReporter,
    ) -> AppResult<usize> {
        if passages.is_empty() {
            return Err(AppError::EmptyInput("no passages to index".to_string()));
        }

        let total = passages.len();
        let model = self.embedder.model_name().to_string();
        tracing::info!(
            "Building vector index: {} passages with {}/{}",
            total,
            self.embedder.provider_name(),
            model
        );

        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(total);
        for batch in passages.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|p| p.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            if vectors.len() != texts.len() {
                return Err(AppError::Embedding(format!(
                    "Embedder returned {} vectors for {} passages",
                    vectors.len(),
                    texts.len()
                )));
            }

            embeddings.extend(vectors);
            progress.embed(embeddings.len() as u64, Some(total as u64), &model);
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or_default();
        if dimensions == 0 {
            return Err(AppError::Embedding(
                "Embedder returned empty vectors".to_string(),
            ));
        }
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(AppError::Embedding(format!(
                "Embedding dimension mismatch: passage {} has {} dimensions, expected {}",
                bad,
                embeddings[bad].len(),
                dimensions
            )));
        }

        let entries: Vec<IndexedEntry> = passages
            .into_iter()
            .zip(embeddings)
            .map(|(passage, embedding)| IndexedEntry { passage, embedding })
            .collect();

        self.entries = Some(entries);

        tracing::info!("Vector index built: {} entries, {} dimensions", total, dimensions);
        Ok(total)
    }

    /// Return up to `k` passages relevant to `query`, diversified with MMR.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        let entries = self.entries.as_ref().ok_or(AppError::NotBuilt)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let dimensions = self.dimensions();
        if query_embedding.len() != dimensions {
            return Err(AppError::Embedding(format!(
                "Query embedding has {} dimensions, index has {}",
                query_embedding.len(),
                dimensions
            )));
        }

        let relevance: Vec<f32> = entries
            .iter()
            .map(|entry| cosine_similarity(&query_embedding, &entry.embedding))
            .collect();

        // Stable sort keeps insertion order among equal scores
        let mut candidates: Vec<usize> = (0..entries.len()).collect();
        candidates.sort_by(|&a, &b| relevance[b].total_cmp(&relevance[a]));
        candidates.truncate(self.options.fetch_k.max(k));

        let candidate_embeddings: Vec<&[f32]> = candidates
            .iter()
            .map(|&i| entries[i].embedding.as_slice())
            .collect();
        let candidate_relevance: Vec<f32> = candidates.iter().map(|&i| relevance[i]).collect();

        let selected = mmr_select(
            &candidate_relevance,
            &candidate_embeddings,
            &candidates,
            k,
            self.options.mmr_lambda,
        );

        let hits: Vec<SearchHit> = selected
            .into_iter()
            .map(|c| SearchHit {
                passage: entries[candidates[c]].passage.clone(),
                relevance: candidate_relevance[c],
            })
            .collect();

        tracing::debug!(
            "Search returned {} hits from {} candidates (top relevance: {:.3})",
            hits.len(),
            candidates.len(),
            hits.first().map(|h| h.relevance).unwrap_or(0.0)
        );

        Ok(hits)
    }

    /// Whether `build` has succeeded at least once.
    pub fn is_built(&self) -> bool {
        self.entries.is_some()
    }

    /// Number of indexed passages.
    pub fn len(&self) -> usize {
        self.entries.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Whether the index holds no passages.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embedding dimension of the stored vectors (0 when unbuilt).
    pub fn dimensions(&self) -> usize {
        self.entries
            .as_ref()
            .and_then(|entries| entries.first())
            .map(|entry| entry.embedding.len())
            .unwrap_or(0)
    }

    /// Number of distinct documents represented in the index.
    pub fn document_count(&self) -> usize {
        self.passages()
            .map(|p| p.document_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Indexed passages in insertion order.
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.entries
            .iter()
            .flat_map(|entries| entries.iter().map(|entry| &entry.passage))
    }

    /// The embedder this index was built with.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }
}

/// Cosine similarity of two vectors; 0 when either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Greedy maximal-marginal-relevance selection.
///
/// Picks up to `k` candidates, each time taking the one maximizing
/// `lambda * relevance - (1 - lambda) * max_similarity_to_selected`.
/// Equal scores go to the lower `insertion_order`. Returns candidate indices
/// in selection order.
fn mmr_select(
    relevance: &[f32],
    embeddings: &[&[f32]],
    insertion_order: &[usize],
    k: usize,
    lambda: f32,
) -> Vec<usize> {
    let mut selected = Vec::with_capacity(k.min(relevance.len()));
    let mut remaining: Vec<usize> = (0..relevance.len()).collect();
    // Highest similarity of each candidate to anything selected so far
    let mut redundancy = vec![f32::NEG_INFINITY; relevance.len()];

    while selected.len() < k && !remaining.is_empty() {
        let mut best: Option<(usize, f32)> = None;

        for (slot, &c) in remaining.iter().enumerate() {
            let penalty = if selected.is_empty() { 0.0 } else { redundancy[c] };
            let score = lambda * relevance[c] - (1.0 - lambda) * penalty;

            let better = match best {
                None => true,
                Some((best_slot, best_score)) => {
                    score > best_score
                        || (score == best_score
                            && insertion_order[c] < insertion_order[remaining[best_slot]])
                }
            };
            if better {
                best = Some((slot, score));
            }
        }

        let Some((slot, _)) = best else { break };
        let chosen = remaining.swap_remove(slot);
        selected.push(chosen);

        for &c in &remaining {
            let sim = cosine_similarity(embeddings[c], embeddings[chosen]);
            if sim > redundancy[c] {
                redundancy[c] = sim;
            }
        }
    }

    selected
}
