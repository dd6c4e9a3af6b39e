//! Source transformer contract and the host that drives it.
//!
//! A [`Transformer`] turns source text into code the test runtime can load.
//! Plugins are registered by name in a [`TransformerRegistry`] and invoked by
//! a [`ScriptTransformer`] according to the [`ProjectConfig`].

pub mod cache_fs;
pub mod cache_key;
pub mod config;
pub mod error;
pub mod host;
pub mod instrument;
pub mod options;
pub mod registry;
pub mod source;
pub mod transformer;

pub use cache_fs::CacheFs;
pub use cache_key::{TransformCacheKey, TransformCacheKeyBuilder};
pub use config::{CoverageProvider, ProjectConfig, TransformEntry};
pub use error::{Error, Result};
pub use host::{Instrumentation, ScriptTransformer, TransformRequest, TransformResult};
pub use instrument::Instrumenter;
pub use options::{CallerSupport, TransformOptions};
pub use registry::TransformerRegistry;
pub use source::{RawSourceMap, SourceMap, TransformedSource};
pub use transformer::{PluginKind, Transformer, TransformerFactory, TransformerPlugin};
