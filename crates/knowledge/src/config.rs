//! Knowledge configuration management.
//!
//! Chunking, retrieval and embedding settings, loaded from
//! `.casebook/knowledge.yaml` when present.

use crate::embeddings::EmbeddingConfig;
use casebook_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Chunking and retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeConfig {
    /// Maximum passage length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring passages
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Passages retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Candidates considered before diversity re-ranking
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// Relevance/diversity trade-off: 1.0 is pure relevance, 0.0 pure diversity
    #[serde(default = "default_mmr_lambda")]
    pub mmr_lambda: f32,

    /// Maximum citation excerpt length in characters
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    5
}

fn default_fetch_k() -> usize {
    20
}

fn default_mmr_lambda() -> f32 {
    0.5
}

fn default_excerpt_chars() -> usize {
    200
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            fetch_k: default_fetch_k(),
            mmr_lambda: default_mmr_lambda(),
            excerpt_chars: default_excerpt_chars(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl KnowledgeConfig {
    /// Load configuration from the workspace, falling back to defaults.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        let config_path = get_config_path(workspace);

        if !config_path.exists() {
            tracing::debug!("No knowledge config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        config.validate()?;

        tracing::debug!("Loaded knowledge config from {:?}", config_path);
        Ok(config)
    }

    /// Check that the settings describe a usable pipeline.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be greater than 0".to_string()));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if !(0.0..=1.0).contains(&self.mmr_lambda) {
            return Err(AppError::Config(format!(
                "mmr_lambda must be between 0 and 1, got {}",
                self.mmr_lambda
            )));
        }

        if self.excerpt_chars == 0 {
            return Err(AppError::Config(
                "excerpt_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Get the path to the knowledge config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace
        .join(casebook_core::config::STATE_DIR)
        .join("knowledge.yaml")
}
