//! Per-invocation options passed to transformers.

use serde::{Deserialize, Serialize};

use crate::cache_fs::CacheFs;
use crate::cache_key::TransformCacheKeyBuilder;
use crate::config::ProjectConfig;
use crate::error::Result;

/// Syntax and runtime features the calling environment supports.
///
/// The default describes a CommonJS runtime with none of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerSupport {
    pub supports_dynamic_import: bool,
    pub supports_export_namespace_from: bool,
    pub supports_static_esm: bool,
    pub supports_top_level_await: bool,
}

impl CallerSupport {
    /// A native ES module runtime supporting every feature.
    pub fn esm() -> Self {
        Self {
            supports_dynamic_import: true,
            supports_export_namespace_from: true,
            supports_static_esm: true,
            supports_top_level_await: true,
        }
    }
}

/// Options passed to every `cache_key` and `process` call.
///
/// `O` is the transformer's own option type; it is chosen by the transformer
/// at registration and never inspected by the host.
pub struct TransformOptions<'a, O> {
    pub cache_fs: &'a CacheFs,
    pub config: &'a ProjectConfig,
    /// Stable serialization of `config`, for cache busting.
    pub config_string: &'a str,
    pub instrument: bool,
    pub supports_dynamic_import: bool,
    pub supports_export_namespace_from: bool,
    pub supports_static_esm: bool,
    pub supports_top_level_await: bool,
    pub transformer_config: &'a O,
}

impl<'a, O> TransformOptions<'a, O> {
    /// Builds options from the host's context pieces.
    pub fn new(
        cache_fs: &'a CacheFs,
        config: &'a ProjectConfig,
        config_string: &'a str,
        instrument: bool,
        caller: CallerSupport,
        transformer_config: &'a O,
    ) -> Self {
        Self {
            cache_fs,
            config,
            config_string,
            instrument,
            supports_dynamic_import: caller.supports_dynamic_import,
            supports_export_namespace_from: caller.supports_export_namespace_from,
            supports_static_esm: caller.supports_static_esm,
            supports_top_level_await: caller.supports_top_level_await,
            transformer_config,
        }
    }

    pub fn caller(&self) -> CallerSupport {
        CallerSupport {
            supports_dynamic_import: self.supports_dynamic_import,
            supports_export_namespace_from: self.supports_export_namespace_from,
            supports_static_esm: self.supports_static_esm,
            supports_top_level_await: self.supports_top_level_await,
        }
    }
}

impl<O: Serialize> TransformOptions<'_, O> {
    /// Starts a cache key pre-filled with everything in these options that
    /// can change a transformer's output.
    ///
    /// # Errors
    ///
    /// Returns an error if the transformer options cannot be serialized; a key
    /// built without them could collide across different options.
    pub fn cache_key_builder(&self) -> Result<TransformCacheKeyBuilder> {
        let transformer_config = serde_json::to_string(self.transformer_config)?;
        Ok(crate::cache_key::TransformCacheKey::builder()
            .config_string(self.config_string)
            .instrument(self.instrument)
            .caller(self.caller())
            .transformer_config(transformer_config))
    }
}

impl<O> Clone for TransformOptions<'_, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for TransformOptions<'_, O> {}

impl<O: std::fmt::Debug> std::fmt::Debug for TransformOptions<'_, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformOptions")
            .field("cache_fs_entries", &self.cache_fs.len())
            .field("config_string", &self.config_string)
            .field("instrument", &self.instrument)
            .field("caller", &self.caller())
            .field("transformer_config", self.transformer_config)
            .finish()
    }
}
