//! Cross-module tests for the retrieval pipeline.

mod support;
