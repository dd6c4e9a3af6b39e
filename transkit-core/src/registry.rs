//! Registry of named transformer plugins.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache_fs::CacheFs;
use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::options::{CallerSupport, TransformOptions};
use crate::source::TransformedSource;
use crate::transformer::{PluginKind, Transformer, TransformerPlugin};

/// Everything the host supplies for one call, minus the transformer options.
pub(crate) struct InvocationContext<'a> {
    pub cache_fs: &'a CacheFs,
    pub config: &'a ProjectConfig,
    pub config_string: &'a str,
    pub instrument: bool,
    pub caller: CallerSupport,
}

/// A transformer paired with its deserialized options.
pub(crate) trait BoundTransformer: Send + Sync {
    fn can_instrument(&self) -> bool;

    fn cache_key(
        &self,
        source_text: &str,
        source_path: &Path,
        ctx: &InvocationContext<'_>,
    ) -> Option<String>;

    fn process(
        &self,
        source_text: &str,
        source_path: &Path,
        ctx: &InvocationContext<'_>,
    ) -> Result<TransformedSource>;
}

struct Bound<O> {
    transformer: Arc<dyn Transformer<O>>,
    options: O,
}

impl<O> Bound<O> {
    fn options<'a>(&'a self, ctx: &InvocationContext<'a>) -> TransformOptions<'a, O> {
        TransformOptions::new(
            ctx.cache_fs,
            ctx.config,
            ctx.config_string,
            ctx.instrument,
            ctx.caller,
            &self.options,
        )
    }
}

impl<O: Send + Sync> BoundTransformer for Bound<O> {
    fn can_instrument(&self) -> bool {
        self.transformer.can_instrument()
    }

    fn cache_key(
        &self,
        source_text: &str,
        source_path: &Path,
        ctx: &InvocationContext<'_>,
    ) -> Option<String> {
        self.transformer
            .cache_key(source_text, source_path, &self.options(ctx))
    }

    fn process(
        &self,
        source_text: &str,
        source_path: &Path,
        ctx: &InvocationContext<'_>,
    ) -> Result<TransformedSource> {
        self.transformer
            .process(source_text, source_path, &self.options(ctx))
    }
}

/// Hides a plugin's option type behind JSON options.
trait ErasedPlugin: Send + Sync {
    fn kind(&self) -> PluginKind;
    fn bind(&self, name: &str, options: Option<&serde_json::Value>)
        -> Result<Arc<dyn BoundTransformer>>;
}

struct TypedPlugin<O> {
    plugin: TransformerPlugin<O>,
}

impl<O> ErasedPlugin for TypedPlugin<O>
where
    O: DeserializeOwned + Serialize + Default + Send + Sync + 'static,
{
    fn kind(&self) -> PluginKind {
        self.plugin.kind()
    }

    fn bind(
        &self,
        name: &str,
        options: Option<&serde_json::Value>,
    ) -> Result<Arc<dyn BoundTransformer>> {
        let typed: Option<O> = options
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| Error::TransformerConfig {
                    transformer: name.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let transformer = self.plugin.instantiate(typed.as_ref())?;
        Ok(Arc::new(Bound {
            transformer,
            options: typed.unwrap_or_default(),
        }))
    }
}

/// Named transformer plugins available to the host.
///
/// Each plugin keeps its own option type; user options are deserialized into
/// it when the host binds a transform entry.
#[derive(Default)]
pub struct TransformerRegistry {
    plugins: BTreeMap<String, Box<dyn ErasedPlugin>>,
}

impl TransformerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` under `name`, replacing any previous registration.
    pub fn register<O>(&mut self, name: &str, plugin: TransformerPlugin<O>)
    where
        O: DeserializeOwned + Serialize + Default + Send + Sync + 'static,
    {
        self.plugins
            .insert(name.to_string(), Box::new(TypedPlugin { plugin }));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn kind(&self, name: &str) -> Option<PluginKind> {
        self.plugins.get(name).map(|plugin| plugin.kind())
    }

    /// Lists registered names in sorted order.
    pub fn registered(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub(crate) fn unknown(&self, name: &str) -> Error {
        Error::UnknownTransformer {
            name: name.to_string(),
            available: self.registered().join(", "),
        }
    }

    pub(crate) fn bind(
        &self,
        name: &str,
        options: Option<&serde_json::Value>,
    ) -> Result<Arc<dyn BoundTransformer>> {
        let plugin = self.plugins.get(name).ok_or_else(|| self.unknown(name))?;
        plugin.bind(name, options)
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("plugins", &self.registered())
            .finish()
    }
}
