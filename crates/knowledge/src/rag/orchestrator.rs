//! Retrieval orchestration: index building and grounded answering.

use crate::chunker::Chunker;
use crate::config::KnowledgeConfig;
use crate::embeddings::EmbeddingProvider;
use crate::extract::PageExtractor;
use crate::ingest::ingest;
use crate::progress::ProgressReporter;
use crate::rag::context::{build_context, citations};
use crate::rag::types::RetrievalResult;
use crate::types::{IndexSummary, IngestReport, Passage, SearchHit};
use crate::vector_index::{IndexOptions, VectorIndex};
use casebook_core::{AppError, AppResult};
use casebook_llm::{LlmClient, LlmRequest};
use casebook_prompt::{build_prompt, default_answer_prompt, PromptDefinition};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Whether questions can be answered yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// No successful build yet
    Unindexed,
    /// An index is in place
    Ready,
}

struct BuiltIndex {
    index: VectorIndex,
    built_at: DateTime<Utc>,
    build_secs: f64,
}

/// Builds the vector index and answers questions against it.
///
/// Handles one request at a time. A rebuild constructs a fresh index and
/// only replaces the current one once it has been built successfully.
pub struct RetrievalOrchestrator {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    config: KnowledgeConfig,
    current: Option<BuiltIndex>,
}

impl RetrievalOrchestrator {
    /// Create an orchestrator with the built-in answer prompt.
    ///
    /// `model` is the generation model passed to `generator`.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn LlmClient>,
        model: impl Into<String>,
        config: KnowledgeConfig,
    ) -> AppResult<Self> {
        config.validate()?;

        Ok(Self {
            embedder,
            generator,
            model: model.into(),
            prompt: default_answer_prompt(),
            config,
            current: None,
        })
    }

    /// Use a different answer prompt.
    pub fn with_prompt(mut self, prompt: PromptDefinition) -> Self {
        self.prompt = prompt;
        self
    }

    /// Current state.
    pub fn state(&self) -> IndexState {
        if self.current.is_some() {
            IndexState::Ready
        } else {
            IndexState::Unindexed
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// Build a new index from `passages` and make it current.
    pub async fn build(&mut self, passages: Vec<Passage>) -> AppResult<usize> {
        self.build_with_progress(passages, &ProgressReporter::noop())
            .await
    }

    /// Like [`build`](Self::build), reporting embedding progress.
    ///
    /// If the build fails the previous index, if any, stays current.
    pub async fn build_with_progress(
        &mut self,
        passages: Vec<Passage>,
        progress: &ProgressReporter,
    ) -> AppResult<usize> {
        let start = Instant::now();
        let options = IndexOptions {
            fetch_k: self.config.fetch_k,
            mmr_lambda: self.config.mmr_lambda,
        };

        let mut index = VectorIndex::new(Arc::clone(&self.embedder), options);
        let count = index.build_with_progress(passages, progress).await?;

        self.current = Some(BuiltIndex {
            index,
            built_at: Utc::now(),
            build_secs: start.elapsed().as_secs_f64(),
        });

        Ok(count)
    }

    /// Extract, chunk and index the documents under `paths`.
    ///
    /// Fails with `EmptyInput` when no passages come out of ingestion, in
    /// which case the current index is left as it was.
    pub async fn index_documents(
        &mut self,
        paths: &[PathBuf],
        extractor: &dyn PageExtractor,
        progress: &ProgressReporter,
    ) -> AppResult<IngestReport> {
        let chunker = Chunker::new(self.config.chunk_size, self.config.chunk_overlap)?;
        let ingestion = ingest(paths, extractor, &chunker, progress);

        if ingestion.passages.is_empty() {
            return Err(AppError::EmptyInput(format!(
                "no documents loaded ({} failed)",
                ingestion.report.failures.len()
            )));
        }

        self.build_with_progress(ingestion.passages, progress)
            .await?;

        Ok(ingestion.report)
    }

    /// Retrieve passages for `query` without generating an answer.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(AppError::EmptyQuestion);
        }
        let current = self.current.as_ref().ok_or(AppError::NotReady)?;
        current.index.search(query, k).await
    }

    /// Answer `question` using the configured `top_k`.
    pub async fn answer(&self, question: &str) -> AppResult<RetrievalResult> {
        self.answer_with_k(question, self.config.top_k).await
    }

    /// Answer `question` grounded on the `k` best passages.
    ///
    /// `k` must be at least 1; an answer needs some context to cite.
    pub async fn answer_with_k(&self, question: &str, k: usize) -> AppResult<RetrievalResult> {
        if question.trim().is_empty() {
            return Err(AppError::EmptyQuestion);
        }
        if k == 0 {
            return Err(AppError::Config(
                "Number of passages to retrieve must be at least 1".to_string(),
            ));
        }
        let current = self.current.as_ref().ok_or(AppError::NotReady)?;

        tracing::info!("Answering question with top {} passages", k);

        let hits = current.index.search(question, k).await?;

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), build_context(&hits));
        variables.insert("question".to_string(), question.to_string());
        let built = build_prompt(&self.prompt, variables)?;

        let mut request = LlmRequest::new(built.user, self.model.as_str()).with_temperature(0.0);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self
            .generator
            .complete(&request)
            .await
            .map_err(|e| AppError::Generation(e.to_string()))?;

        tracing::info!(
            provider = self.generator.provider_name(),
            model = %response.model,
            passages = hits.len(),
            tokens = response.usage.total_tokens,
            "Answer generated"
        );

        Ok(RetrievalResult {
            answer: response.content,
            citations: citations(&hits, self.config.excerpt_chars),
        })
    }

    /// Describe the current index, if there is one.
    pub fn summary(&self) -> Option<IndexSummary> {
        self.current.as_ref().map(|current| {
            let embedder = current.index.embedder();
            IndexSummary {
                documents: current.index.document_count(),
                passages: current.index.len(),
                dimensions: current.index.dimensions(),
                embedder: format!("{}/{}", embedder.provider_name(), embedder.model_name()),
                built_at: current.built_at,
                build_secs: current.build_secs,
            }
        })
    }
}
