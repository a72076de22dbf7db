//! Error types for Casebook.
//!
//! One enum covers the whole pipeline: ingestion, embedding, indexing,
//! answer generation, plus the ambient configuration and I/O failures.
//! Only `Extraction` is ever recovered locally (the ingestion loop skips the
//! file); every other variant aborts the current operation.

use thiserror::Error;

/// Unified error type for Casebook.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text extraction failed for a single document
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// An index build was requested with nothing to index
    #[error("Nothing to index: {0}")]
    EmptyInput(String),

    /// The vector index was searched before it was built
    #[error("Vector index has not been built")]
    NotBuilt,

    /// A question was asked before any documents were indexed
    #[error("No documents indexed yet. Load documents before asking questions.")]
    NotReady,

    /// The question was empty or whitespace only
    #[error("Question cannot be empty")]
    EmptyQuestion,

    /// Embedding provider failures
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Answer generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// LLM provider transport errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
