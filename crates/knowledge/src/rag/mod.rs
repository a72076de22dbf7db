//! RAG (Retrieval-Augmented Generation) answering.
//!
//! Retrieves passages for a question, asks the language model for an answer
//! grounded in them and returns the passages as citations.

pub mod context;
pub mod orchestrator;
pub mod types;

pub use orchestrator::{IndexState, RetrievalOrchestrator};
pub use types::{RetrievalResult, SourceCitation};
