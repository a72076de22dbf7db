//! Shared setup for the commands: wiring the orchestrator from configuration
//! and (re)indexing the documents the user pointed at.

use casebook_core::{config::AppConfig, AppError, AppResult};
use casebook_knowledge::{
    create_provider, FileExtractor, IngestReport, KnowledgeConfig, ProgressReporter,
    RetrievalOrchestrator,
};
use casebook_llm::create_client;
use casebook_prompt::load_prompt_or_default;
use std::path::PathBuf;
use std::sync::Arc;

/// An orchestrator bound to the document paths of one CLI invocation.
pub struct Session {
    pub orchestrator: RetrievalOrchestrator,
    paths: Vec<PathBuf>,
    extractor: FileExtractor,
    progress: ProgressReporter,
}

impl Session {
    /// Build the embedder, generator and prompt described by `config`.
    ///
    /// Nothing is indexed yet; call [`load`](Self::load).
    pub fn open(config: &AppConfig, paths: Vec<PathBuf>) -> AppResult<Self> {
        if paths.is_empty() {
            return Err(AppError::Config(
                "No documents given. Pass at least one --path".to_string(),
            ));
        }

        config.validate()?;

        let knowledge = KnowledgeConfig::load(&config.workspace)?;
        let embedder = create_provider(&knowledge.embedding)?;

        let endpoint = config.resolve_endpoint(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);
        let generator = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
            .map_err(AppError::Config)?;

        let prompt = load_prompt_or_default(&config.workspace)?;

        tracing::debug!(
            embedder = embedder.provider_name(),
            generator = generator.provider_name(),
            prompt = %prompt.id,
            "Session configured"
        );

        let orchestrator =
            RetrievalOrchestrator::new(embedder, generator, config.model.as_str(), knowledge)?
                .with_prompt(prompt);

        let progress = if config.verbose {
            ProgressReporter::new(Arc::new(|event| eprintln!("{}", event.format_simple())))
        } else {
            ProgressReporter::noop()
        };

        Ok(Self {
            orchestrator,
            paths,
            extractor: FileExtractor,
            progress,
        })
    }

    /// Ingest the session's paths and replace the index with the result.
    pub async fn load(&mut self) -> AppResult<IngestReport> {
        let report = self
            .orchestrator
            .index_documents(&self.paths, &self.extractor, &self.progress)
            .await?;

        for failure in &report.failures {
            eprintln!("Skipped {}: {}", failure.path.display(), failure.reason);
        }

        Ok(report)
    }
}
