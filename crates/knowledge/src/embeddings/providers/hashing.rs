//! Offline embedding provider based on hashed words and character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use casebook_core::AppResult;
use std::collections::{BTreeMap, HashSet};

/// Words too common to help tell passages apart.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "shall", "any", "such",
];

/// Hashing embedding provider for local, offline operation.
///
/// Each content word adds weight to one bucket for the whole word and one
/// bucket per character trigram, so texts sharing vocabulary (or word stems)
/// land close together. Not semantically aware like a neural model, but
/// deterministic and dependency-free, which makes it the default for
/// development and tests.
#[derive(Debug)]
pub struct HashingProvider {
    dimensions: usize,
    normalize: bool,
}

impl HashingProvider {
    /// Create a new hashing provider with specified dimensions.
    pub fn new(dimensions: usize, normalize: bool) -> Self {
        Self {
            dimensions,
            normalize,
        }
    }

    fn bucket(&self, token: &str, seed: u64) -> usize {
        let hash = token
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(seed).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let lower = text.to_lowercase();
        // Ordered so colliding buckets always accumulate in the same order.
        let mut word_freq: BTreeMap<&str, u32> = BTreeMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                embedding[self.bucket(&trigram, 37)] += (*freq as f32).sqrt();
            }

            embedding[self.bucket(word, 31)] += *freq as f32;
        }

        if self.normalize {
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in &mut embedding {
                    *v /= norm;
                }
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingProvider {
    fn provider_name(&self) -> &str {
        "hashing"
    }

    fn model_name(&self) -> &str {
        "hashing-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| self.generate_embedding(text))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_hashing_provider_embed_single() {
        let provider = HashingProvider::new(384, true);
        let embedding = provider.embed("indemnification obligations").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_hashing_provider_deterministic() {
        let provider = HashingProvider::new(384, true);
        let text = "The tenant shall pay rent monthly.";

        let embedding1 = provider.embed(text).await.unwrap();
        let embedding2 = provider.embed(text).await.unwrap();

        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_colliding_buckets_are_bitwise_stable() {
        let provider = HashingProvider::new(16, true);
        let text = "lessee lessor premises premises covenant covenant covenant remedy \
                    default default notice lessee arrears deposit deposit waiver \
                    assignment sublease renewal holdover";

        let first = provider.embed(text).await.unwrap();
        for _ in 0..500 {
            let again = provider.embed(text).await.unwrap();
            let same = first
                .iter()
                .zip(&again)
                .all(|(a, b)| a.to_bits() == b.to_bits());
            assert!(same);
        }
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let provider = HashingProvider::new(384, true);

        let query = provider.embed("termination notice period").await.unwrap();
        let related = provider
            .embed("Either party may give notice of termination within the notice period.")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Rent is payable in advance on the first business day.")
            .await
            .unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = HashingProvider::new(384, true);
        let embedding = provider.embed("").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_unnormalized_output() {
        let provider = HashingProvider::new(64, false);
        let embedding = provider.embed("lease lease lease").await.unwrap();

        assert!(norm(&embedding) > 1.0);
    }

    #[tokio::test]
    async fn test_utf8_safety() {
        let provider = HashingProvider::new(384, true);

        let text = "Cláusula de rescisão: o locatário deverá notificar 🏠 com antecedência.";
        let embedding = provider.embed(text).await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }
}
