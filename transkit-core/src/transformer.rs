//! The transformer contract implemented by plugins.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::options::TransformOptions;
use crate::source::TransformedSource;

/// Converts source text into code the test runtime can execute.
///
/// Only [`process`](Transformer::process) is mandatory. The other methods
/// have defaults that describe an absent capability: a transformer that
/// cannot instrument and offers no cache key.
///
/// `O` is the transformer's option type, delivered through
/// [`TransformOptions::transformer_config`].
pub trait Transformer<O = ()>: Send + Sync {
    /// Whether `process` emits coverage-instrumented code when
    /// `options.instrument` is set. When `false` the host instruments the
    /// output itself.
    fn can_instrument(&self) -> bool {
        false
    }

    /// Returns a key that identifies the output of `process` for the same
    /// arguments, or `None` if this transformer offers no cache key.
    ///
    /// Implementations must be pure: the same inputs always give the same key,
    /// and two inputs whose outputs differ must not share a key.
    fn cache_key(
        &self,
        _source_text: &str,
        _source_path: &Path,
        _options: &TransformOptions<'_, O>,
    ) -> Option<String> {
        None
    }

    /// Transforms `source_text`.
    ///
    /// The output must be valid for a runtime with the support flags in
    /// `options`. Inability to transform is reported as an error.
    fn process(
        &self,
        source_text: &str,
        source_path: &Path,
        options: &TransformOptions<'_, O>,
    ) -> Result<TransformedSource>;
}

/// Builds configured transformers from user options.
pub trait TransformerFactory<O>: Send + Sync {
    /// Creates a transformer for `options`.
    ///
    /// Invalid options may be rejected here or left to fail in `process`.
    fn create_transformer(&self, options: Option<&O>) -> Result<Box<dyn Transformer<O>>>;
}

impl<O, F> TransformerFactory<O> for F
where
    F: Fn(Option<&O>) -> Result<Box<dyn Transformer<O>>> + Send + Sync,
{
    fn create_transformer(&self, options: Option<&O>) -> Result<Box<dyn Transformer<O>>> {
        self(options)
    }
}

/// How a plugin is exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Ready,
    Factory,
}

impl PluginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Ready => "ready",
            PluginKind::Factory => "factory",
        }
    }
}

/// A registered transformer plugin: either a transformer used as-is or a
/// factory the host calls with the user's options first.
pub enum TransformerPlugin<O> {
    Ready(Arc<dyn Transformer<O>>),
    Factory(Arc<dyn TransformerFactory<O>>),
}

impl<O: 'static> TransformerPlugin<O> {
    pub fn ready(transformer: impl Transformer<O> + 'static) -> Self {
        TransformerPlugin::Ready(Arc::new(transformer))
    }

    pub fn factory(factory: impl TransformerFactory<O> + 'static) -> Self {
        TransformerPlugin::Factory(Arc::new(factory))
    }

    pub fn kind(&self) -> PluginKind {
        match self {
            TransformerPlugin::Ready(_) => PluginKind::Ready,
            TransformerPlugin::Factory(_) => PluginKind::Factory,
        }
    }

    /// Returns the transformer to invoke, creating it when this is a factory.
    pub fn instantiate(&self, options: Option<&O>) -> Result<Arc<dyn Transformer<O>>> {
        match self {
            TransformerPlugin::Ready(transformer) => Ok(Arc::clone(transformer)),
            TransformerPlugin::Factory(factory) => {
                Ok(Arc::from(factory.create_transformer(options)?))
            }
        }
    }
}

impl<O> Clone for TransformerPlugin<O> {
    fn clone(&self) -> Self {
        match self {
            TransformerPlugin::Ready(transformer) => TransformerPlugin::Ready(Arc::clone(transformer)),
            TransformerPlugin::Factory(factory) => TransformerPlugin::Factory(Arc::clone(factory)),
        }
    }
}
