use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use transkit_core::error::{Error, Result};
use transkit_core::options::TransformOptions;
use transkit_core::source::{RawSourceMap, SourceMap, TransformedSource};
use transkit_core::transformer::{Transformer, TransformerFactory};

use crate::VERSION;

/// One regex substitution. `replacement` may use `$1` / `${name}` captures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceRule {
    pub pattern: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceOptions {
    #[serde(default)]
    pub rules: Vec<ReplaceRule>,
    /// Emit a line-for-line source map when the rules keep line count.
    #[serde(default)]
    pub source_map: bool,
}

/// Creates [`ReplaceTransformer`]s with their rules compiled.
pub struct ReplaceFactory;

impl TransformerFactory<ReplaceOptions> for ReplaceFactory {
    fn create_transformer(
        &self,
        options: Option<&ReplaceOptions>,
    ) -> Result<Box<dyn Transformer<ReplaceOptions>>> {
        let Some(options) = options else {
            return Ok(Box::new(ReplaceTransformer::default()));
        };
        Ok(Box::new(ReplaceTransformer::new(options)?))
    }
}

/// Applies regex substitutions in order.
#[derive(Debug, Default)]
pub struct ReplaceTransformer {
    rules: Vec<(Regex, String)>,
    source_map: bool,
}

impl ReplaceTransformer {
    pub fn new(options: &ReplaceOptions) -> Result<Self> {
        let rules = options
            .rules
            .iter()
            .map(|rule| {
                let regex = Regex::new(&rule.pattern).map_err(|e| Error::TransformerConfig {
                    transformer: "replace".to_string(),
                    message: format!("Invalid pattern '{}': {}", rule.pattern, e),
                })?;
                Ok((regex, rule.replacement.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(rules = rules.len(), "compiled replace rules");
        Ok(Self {
            rules,
            source_map: options.source_map,
        })
    }

    pub fn apply(&self, source_text: &str) -> String {
        let mut code = source_text.to_string();
        for (regex, replacement) in &self.rules {
            code = regex.replace_all(&code, replacement.as_str()).into_owned();
        }
        code
    }
}

impl Transformer<ReplaceOptions> for ReplaceTransformer {
    fn cache_key(
        &self,
        source_text: &str,
        source_path: &Path,
        options: &TransformOptions<'_, ReplaceOptions>,
    ) -> Option<String> {
        let key = options
            .cache_key_builder()
            .ok()?
            .transformer(format!("replace@{}", VERSION))
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
        _options: &TransformOptions<'_, ReplaceOptions>,
    ) -> Result<TransformedSource> {
        let code = self.apply(source_text);

        let same_lines = code.matches('\n').count() == source_text.matches('\n').count();
        let map = if self.source_map && same_lines {
            Some(SourceMap::Raw(RawSourceMap::line_identity(source_path, source_text)))
        } else {
            None
        };

        Ok(TransformedSource::mapped(code, map))
    }
}
