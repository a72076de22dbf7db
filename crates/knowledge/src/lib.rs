//! Knowledge management for Casebook.
//!
//! Turns a set of documents into an in-memory vector index and answers
//! questions against it:
//!
//! 1. [`ingest`] extracts pages ([`extract`]) and splits them into passages
//!    ([`chunker`]).
//! 2. [`vector_index`] embeds passages ([`embeddings`]) and serves
//!    diversity-aware similarity search.
//! 3. [`rag`] assembles the prompt, calls the language model and attaches
//!    citations.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod extract;
pub mod ingest;
pub mod progress;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::Chunker;
pub use config::KnowledgeConfig;
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use extract::{DocumentKind, FileExtractor, PageExtractor};
pub use ingest::{discover_documents, ingest, Ingestion};
pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter};
pub use rag::{IndexState, RetrievalOrchestrator, RetrievalResult, SourceCitation};
pub use types::{IndexSummary, IngestFailure, IngestReport, Passage, SearchHit, SourcePage};
pub use vector_index::{cosine_similarity, IndexOptions, VectorIndex};
