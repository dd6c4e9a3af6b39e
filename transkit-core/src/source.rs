//! Transformed output and source maps.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A source map in the version 3 format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceMap {
    pub version: u32,
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
}

impl RawSourceMap {
    /// Builds a map where every generated line maps to the same line of
    /// `source_path`, column zero.
    pub fn line_identity(source_path: &Path, source_text: &str) -> Self {
        let line_count = source_text.split('\n').count();
        let mappings = (0..line_count)
            .map(|line| if line == 0 { "AAAA" } else { "AACA" })
            .collect::<Vec<_>>()
            .join(";");

        Self {
            version: 3,
            sources: vec![source_path.display().to_string()],
            names: Vec::new(),
            mappings,
            file: None,
            source_root: None,
            sources_content: Some(vec![Some(source_text.to_string())]),
        }
    }
}

/// A source map attached to transformed output, either structured or as
/// JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMap {
    Raw(RawSourceMap),
    Encoded(String),
}

impl SourceMap {
    /// Returns the structured form, parsing it if the map is encoded.
    pub fn to_raw(&self) -> Result<RawSourceMap> {
        match self {
            SourceMap::Raw(map) => Ok(map.clone()),
            SourceMap::Encoded(text) => Ok(serde_json::from_str(text)?),
        }
    }
}

impl From<RawSourceMap> for SourceMap {
    fn from(map: RawSourceMap) -> Self {
        SourceMap::Raw(map)
    }
}

impl From<String> for SourceMap {
    fn from(text: String) -> Self {
        SourceMap::Encoded(text)
    }
}

/// What a transformer returns from `process`.
///
/// Callers branch on the variant: a bare `Code` carries no map information at
/// all, while `Mapped` states the map explicitly, `None` included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformedSource {
    Code(String),
    Mapped {
        code: String,
        map: Option<SourceMap>,
    },
}

impl TransformedSource {
    pub fn mapped(code: impl Into<String>, map: Option<SourceMap>) -> Self {
        TransformedSource::Mapped {
            code: code.into(),
            map,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            TransformedSource::Code(code) => code,
            TransformedSource::Mapped { code, .. } => code,
        }
    }

    pub fn map(&self) -> Option<&SourceMap> {
        match self {
            TransformedSource::Code(_) => None,
            TransformedSource::Mapped { map, .. } => map.as_ref(),
        }
    }

    pub fn into_parts(self) -> (String, Option<SourceMap>) {
        match self {
            TransformedSource::Code(code) => (code, None),
            TransformedSource::Mapped { code, map } => (code, map),
        }
    }
}

impl From<String> for TransformedSource {
    fn from(code: String) -> Self {
        TransformedSource::Code(code)
    }
}

impl From<&str> for TransformedSource {
    fn from(code: &str) -> Self {
        TransformedSource::Code(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_identity_mappings() {
        let map = RawSourceMap::line_identity(Path::new("src/a.js"), "one\ntwo\nthree");
        assert_eq!(map.mappings, "AAAA;AACA;AACA");
        assert_eq!(map.sources, vec!["src/a.js"]);
    }

    #[test]
    fn test_encoded_map_parses() {
        let raw = RawSourceMap::line_identity(Path::new("a.js"), "x");
        let encoded = SourceMap::Encoded(serde_json::to_string(&raw).unwrap());
        assert_eq!(encoded.to_raw().unwrap(), raw);
    }

    #[test]
    fn test_raw_map_uses_camel_case() {
        let raw = RawSourceMap::line_identity(Path::new("a.js"), "x");
        let json = serde_json::to_value(&raw).unwrap();
        assert!(json.get("sourcesContent").is_some());
        assert!(json.get("sourceRoot").is_none());
    }
}
