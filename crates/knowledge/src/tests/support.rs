//! Test doubles for the embedding and generation capabilities.

use crate::embeddings::providers::HashingProvider;
use crate::embeddings::EmbeddingProvider;
use crate::types::Passage;
use async_trait::async_trait;
use casebook_core::{AppError, AppResult};
use casebook_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::{Arc, Mutex};

/// Generator that records every request and replies with fixed text.
pub struct RecordingGenerator {
    reply: String,
    requests: Mutex<Vec<LlmRequest>>,
}

impl RecordingGenerator {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> LlmRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("generator was never called")
    }
}

#[async_trait]
impl LlmClient for RecordingGenerator {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(LlmResponse {
            content: self.reply.clone(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

/// Generator that always fails, counting attempts.
#[derive(Default)]
pub struct FailingGenerator {
    calls: Mutex<usize>,
}

impl FailingGenerator {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl LlmClient for FailingGenerator {
    fn provider_name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        *self.calls.lock().unwrap() += 1;
        Err(AppError::Llm("connection refused".to_string()))
    }
}

/// Hashing embedder that fails on any text containing `poison`.
#[derive(Debug)]
pub struct PoisonedEmbedder {
    inner: HashingProvider,
    poison: String,
}

impl PoisonedEmbedder {
    pub fn new(poison: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: HashingProvider::new(128, true),
            poison: poison.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for PoisonedEmbedder {
    fn provider_name(&self) -> &str {
        "poisoned"
    }

    fn model_name(&self) -> &str {
        "hashing-v1"
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.contains(&self.poison)) {
            return Err(AppError::Embedding("embedding backend unavailable".to_string()));
        }
        self.inner.embed_batch(texts).await
    }
}

pub fn hashing_embedder() -> Arc<HashingProvider> {
    Arc::new(HashingProvider::new(256, true))
}

pub fn passage(document_id: &str, page_number: u32, text: &str) -> Passage {
    Passage {
        text: text.to_string(),
        document_id: document_id.to_string(),
        page_number,
        position: 0,
        char_range: (0, text.chars().count()),
    }
}

/// Three passages from a commercial lease.
pub fn lease_passages() -> Vec<Passage> {
    vec![
        passage(
            "lease.pdf",
            1,
            "The tenant shall pay monthly rent of 4,000 EUR on the first day of each month.",
        ),
        passage(
            "lease.pdf",
            2,
            "Either party may terminate this lease with six months written notice.",
        ),
        passage(
            "lease.pdf",
            3,
            "The landlord is responsible for structural repairs to the building.",
        ),
    ]
}
