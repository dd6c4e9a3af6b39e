use std::path::Path;

use transkit_core::error::Result;
use transkit_core::options::TransformOptions;
use transkit_core::source::TransformedSource;
use transkit_core::transformer::Transformer;

use crate::{export_module, VERSION};

/// Exposes a file's contents as a string module.
pub struct RawTextTransformer;

impl Transformer for RawTextTransformer {
    // A string export has no statements to count.
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
            .transformer(format!("text@{}", VERSION))
            .source_path(source_path)
            .source_text(source_text)
            .build()
            .ok()?;
        Some(key.hash())
    }

    fn process(
        &self,
        source_text: &str,
        _source_path: &Path,
        options: &TransformOptions<'_, ()>,
    ) -> Result<TransformedSource> {
        let literal = serde_json::to_string(source_text)?;
        Ok(TransformedSource::Code(export_module(&literal, options)))
    }
}
