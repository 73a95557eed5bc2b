//! Configuration for chunking and retrieval.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Environment variable overriding [`RagConfig::chunk_size`].
pub const ENV_CHUNK_SIZE: &str = "DOCCHAT_CHUNK_SIZE";
/// Environment variable overriding [`RagConfig::chunk_overlap`].
pub const ENV_CHUNK_OVERLAP: &str = "DOCCHAT_CHUNK_OVERLAP";
/// Environment variable overriding [`RagConfig::top_k`].
pub const ENV_TOP_K: &str = "DOCCHAT_TOP_K";
/// Environment variable overriding [`RagConfig::recursive`].
pub const ENV_RECURSIVE: &str = "DOCCHAT_RECURSIVE";

/// Configuration parameters for ingestion and question answering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Target maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of trailing characters carried into the next chunk.
    pub chunk_overlap: usize,
    /// Whether oversized chunks are re-split by raw length.
    pub recursive: bool,
    /// Number of chunks used to build the answer context.
    pub top_k: usize,
    /// Minimum similarity score for a chunk to enter the context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 150,
            recursive: true,
            top_k: 5,
            similarity_threshold: None,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a config from the defaults overridden by `DOCCHAT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a variable is set but cannot be parsed,
    /// or if the resulting values fail validation.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(size) = parse_var::<usize>(&lookup, ENV_CHUNK_SIZE)? {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = parse_var::<usize>(&lookup, ENV_CHUNK_OVERLAP)? {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(k) = parse_var::<usize>(&lookup, ENV_TOP_K)? {
            builder = builder.top_k(k);
        }
        if let Some(recursive) = parse_var::<bool>(&lookup, ENV_RECURSIVE)? {
            builder = builder.recursive(recursive);
        }
        builder.build()
    }

    /// Check the chunking parameters without consuming the config.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if `chunk_size == 0` or
    /// `chunk_overlap >= chunk_size`.
    pub fn validate_chunking(&self) -> Result<()> {
        validate_chunk_params(self.chunk_size, self.chunk_overlap)
    }
}

/// Shared validation for chunk size and overlap.
pub(crate) fn validate_chunk_params(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::InvalidArgument("chunk_size must be greater than zero".into()));
    }
    if overlap >= chunk_size {
        return Err(RagError::InvalidArgument(format!(
            "chunk_overlap ({overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{key} has an invalid value: '{raw}'"))),
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the target chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Enable or disable length-based re-splitting of oversized chunks.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.config.recursive = recursive;
        self
    }

    /// Set the number of chunks used for the answer context.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity score for retrieved chunks.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = Some(threshold);
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate_chunking().map_err(|e| RagError::Config(e.to_string()))?;
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_matches_ingestion_settings() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 150);
        assert!(config.recursive);
        assert_eq!(config.top_k, 5);
        assert!(config.similarity_threshold.is_none());
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(RagConfig::builder().chunk_size(0).chunk_overlap(0).build().is_err());
        assert!(RagConfig::builder().chunk_size(100).chunk_overlap(100).build().is_err());
        assert!(RagConfig::builder().top_k(0).build().is_err());

        let config = RagConfig::builder()
            .chunk_size(256)
            .chunk_overlap(32)
            .top_k(3)
            .similarity_threshold(0.25)
            .build()
            .unwrap();
        assert_eq!(config.chunk_size, 256);
        assert_eq!(config.similarity_threshold, Some(0.25));
    }

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_CHUNK_SIZE, "400"),
            (ENV_CHUNK_OVERLAP, " 40 "),
            (ENV_RECURSIVE, "false"),
        ]);
        let config = RagConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.chunk_size, 400);
        assert_eq!(config.chunk_overlap, 40);
        assert!(!config.recursive);
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn env_rejects_garbage() {
        let err = RagConfig::from_lookup(|k| (k == ENV_TOP_K).then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, RagError::Config(msg) if msg.contains(ENV_TOP_K)));
    }

    #[test]
    fn config_round_trips_through_json() {
        let json = r#"{"chunk_size":300,"chunk_overlap":20,"recursive":false,"top_k":2}"#;
        let config: RagConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.similarity_threshold, None);
        assert!(!config.recursive);
    }
}
