use std::path::Path;

use serde::de::IgnoredAny;
use transkit_core::error::{Error, Result};
use transkit_core::options::TransformOptions;
use transkit_core::source::TransformedSource;
use transkit_core::transformer::Transformer;

use crate::{export_module, VERSION};

/// Turns a JSON document into a module exporting its value.
///
/// The document is validated but emitted as written, so key order and
/// formatting survive.
pub struct JsonTransformer;

impl Transformer for JsonTransformer {
    fn can_instrument(&self) -> bool {
        true
    }

    fn cache_key(
        &self,
        source_text: &str,
        source_path: &Path,
        options: &TransformOptions<'_, ()>,
    ) -> Option<String> {
        let key = options
            .cache_key_builder()
            .ok()?
            .transformer(format!("json@{}", VERSION))
            .source_path(source_path)
            .source_text(source_text)
            .build()
            .ok()?;
        Some(key.hash())
    }

    fn process(
        &self,
        source_text: &str,
        source_path: &Path,
        options: &TransformOptions<'_, ()>,
    ) -> Result<TransformedSource> {
        serde_json::from_str::<IgnoredAny>(source_text).map_err(|e| {
            Error::plugin(format!(
                "Failed to parse {} as JSON: {}",
                source_path.display(),
                e
            ))
        })?;

        Ok(TransformedSource::Code(export_module(source_text.trim(), options)))
    }
}
