//! Deterministic cache key generation for transformers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::options::CallerSupport;

/// Everything that can change a transformer's output for one file.
///
/// The key includes:
/// - Transformer identifier (name and version)
/// - Source path and a hash of the source text
/// - Project config string
/// - Instrumentation flag and caller support flags
/// - Serialized transformer options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransformCacheKey {
    pub transformer: String,
    pub source_path: PathBuf,
    /// SHA-256 of the source text.
    pub source_hash: String,
    pub config_string: String,
    pub instrument: bool,
    pub caller: CallerSupport,
    pub transformer_config: String,
}

impl TransformCacheKey {
    /// Creates a new cache key builder.
    pub fn builder() -> TransformCacheKeyBuilder {
        TransformCacheKeyBuilder::new()
    }

    /// Computes the deterministic hash of this cache key.
    ///
    /// Returns a hex-encoded SHA-256 hash.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();

        let serialized = bincode::serialize(self).unwrap_or_else(|_| {
            // Non UTF-8 paths do not serialize
            format!(
                "{}\0{}\0{}\0{}\0{}\0{:?}\0{}",
                self.transformer,
                self.source_path.display(),
                self.source_hash,
                self.config_string,
                self.instrument,
                self.caller,
                self.transformer_config
            )
            .into_bytes()
        });

        hasher.update(&serialized);
        format!("{:x}", hasher.finalize())
    }
}

/// Hashes source text the same way cache keys do.
pub fn hash_source(source_text: &str) -> String {
    format!("{:x}", Sha256::digest(source_text.as_bytes()))
}

/// Builder for constructing cache keys.
#[derive(Debug)]
pub struct TransformCacheKeyBuilder {
    transformer: Option<String>,
    source_path: Option<PathBuf>,
    source_hash: Option<String>,
    config_string: String,
    instrument: bool,
    caller: CallerSupport,
    transformer_config: String,
}

impl TransformCacheKeyBuilder {
    fn new() -> Self {
        Self {
            transformer: None,
            source_path: None,
            source_hash: None,
            config_string: String::new(),
            instrument: false,
            caller: CallerSupport::default(),
            transformer_config: String::new(),
        }
    }

    /// Sets the transformer identifier, usually `name@version`.
    pub fn transformer(mut self, transformer: impl Into<String>) -> Self {
        self.transformer = Some(transformer.into());
        self
    }

    pub fn source_path(mut self, source_path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(source_path.into());
        self
    }

    /// Hashes and records the source text.
    pub fn source_text(mut self, source_text: &str) -> Self {
        self.source_hash = Some(hash_source(source_text));
        self
    }

    pub fn config_string(mut self, config_string: impl Into<String>) -> Self {
        self.config_string = config_string.into();
        self
    }

    pub fn instrument(mut self, instrument: bool) -> Self {
        self.instrument = instrument;
        self
    }

    pub fn caller(mut self, caller: CallerSupport) -> Self {
        self.caller = caller;
        self
    }

    /// Sets the serialized transformer options.
    pub fn transformer_config(mut self, transformer_config: impl Into<String>) -> Self {
        self.transformer_config = transformer_config.into();
        self
    }

    /// Builds the cache key.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer, source path or source text is
    /// missing.
    pub fn build(self) -> Result<TransformCacheKey> {
        Ok(TransformCacheKey {
            transformer: self.transformer.ok_or_else(|| missing("transformer"))?,
            source_path: self.source_path.ok_or_else(|| missing("source_path"))?,
            source_hash: self.source_hash.ok_or_else(|| missing("source_text"))?,
            config_string: self.config_string,
            instrument: self.instrument,
            caller: self.caller,
            transformer_config: self.transformer_config,
        })
    }
}

fn missing(field: &str) -> Error {
    Error::TransformerConfig {
        transformer: "cache-key".to_string(),
        message: format!("{} is required", field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TransformCacheKeyBuilder {
        TransformCacheKey::builder()
            .transformer("text@0.1.0")
            .source_path("src/a.txt")
            .source_text("hello")
            .config_string("{}")
    }

    #[test]
    fn test_cache_key_determinism() {
        let key1 = base().build().unwrap();
        let key2 = base().build().unwrap();
        assert_eq!(key1.hash(), key2.hash());
    }

    #[test]
    fn test_cache_key_different_sources() {
        let key1 = base().build().unwrap();
        let key2 = base().source_text("world").build().unwrap();
        assert_ne!(key1.hash(), key2.hash());
    }

    #[test]
    fn test_cache_key_instrument_and_caller_matter() {
        let plain = base().build().unwrap();
        let instrumented = base().instrument(true).build().unwrap();
        let esm = base().caller(CallerSupport::esm()).build().unwrap();
        assert_ne!(plain.hash(), instrumented.hash());
        assert_ne!(plain.hash(), esm.hash());
    }

    #[test]
    fn test_cache_key_requires_source() {
        let result = TransformCacheKey::builder()
            .transformer("text")
            .source_path("a.txt")
            .build();
        assert!(matches!(result, Err(Error::TransformerConfig { .. })));
    }
}
