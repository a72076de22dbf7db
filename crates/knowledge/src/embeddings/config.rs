//! Embedding configuration types.

use serde::{Deserialize, Serialize};

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "hashing" or "ollama"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (provider-specific)
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Whether to normalize embeddings to unit length
    #[serde(default = "default_normalize")]
    pub normalize: bool,

    /// Provider endpoint override (Ollama only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_provider() -> String {
    "hashing".to_string()
}

fn default_model() -> String {
    "hashing-v1".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_normalize() -> bool {
    true
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimensions: default_dimensions(),
            normalize: default_normalize(),
            endpoint: None,
        }
    }
}

impl EmbeddingConfig {
    /// Configuration for a local Ollama embedding model.
    pub fn ollama(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            provider: "ollama".to_string(),
            model: model.into(),
            dimensions,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "hashing");
        assert_eq!(config.model, "hashing-v1");
        assert_eq!(config.dimensions, 384);
        assert!(config.normalize);
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_yaml_roundtrip_keeps_endpoint() {
        let mut config = EmbeddingConfig::ollama("nomic-embed-text", 768);
        config.endpoint = Some("http://gpu-box:11434".to_string());

        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: EmbeddingConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
