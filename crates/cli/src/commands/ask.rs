//! Ask command handler.
//!
//! Indexes the given documents and answers a single question against them.

use super::render;
use super::session::Session;
use casebook_core::{config::AppConfig, AppResult};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

/// Answer a question from a set of documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Documents or directories to index (repeatable)
    #[arg(long = "path", required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of passages to ground the answer on
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let mut session = Session::open(config, self.paths.clone())?;
        let report = session.load().await?;

        if !self.json {
            eprintln!("{}", render::report(&report));
        }

        let top_k = self
            .top_k
            .unwrap_or_else(|| session.orchestrator.config().top_k);

        let start = Instant::now();
        let result = session
            .orchestrator
            .answer_with_k(&self.question, top_k)
            .await?;
        let generation_secs = start.elapsed().as_secs_f64();

        if self.json {
            let output = serde_json::json!({
                "answer": result.answer,
                "citations": result.citations,
                "model": config.model,
                "provider": config.provider,
                "generationSecs": generation_secs,
                "index": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", render::answer(&result, generation_secs));
        }

        Ok(())
    }
}
