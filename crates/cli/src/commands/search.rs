//! Search command handler.
//!
//! Retrieval only: ranks passages for a query without calling the model.

use super::render;
use super::session::Session;
use casebook_core::{config::AppConfig, AppResult};
use clap::Args;
use std::path::PathBuf;

/// Show the passages a question would be grounded on
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    pub query: String,

    /// Documents or directories to index (repeatable)
    #[arg(long = "path", required = true)]
    pub paths: Vec<PathBuf>,

    /// Number of passages to return
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let mut session = Session::open(config, self.paths.clone())?;
        let report = session.load().await?;

        let knowledge = session.orchestrator.config();
        let top_k = self.top_k.unwrap_or(knowledge.top_k);
        let excerpt_chars = knowledge.excerpt_chars;

        let hits = session.orchestrator.search(&self.query, top_k).await?;

        tracing::debug!("Search returned {} passages", hits.len());

        if self.json {
            let output = serde_json::json!({
                "query": self.query,
                "hits": hits,
                "index": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            eprintln!("{}", render::report(&report));
            println!("{}", render::hits(&hits, excerpt_chars));
        }

        Ok(())
    }
}
