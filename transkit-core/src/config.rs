//! Project configuration as defined in `transkit.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the configuration file looked up by default.
pub const CONFIG_FILE_NAME: &str = "transkit.toml";

/// Where coverage instrumentation comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageProvider {
    /// Instrumentation is inserted into transformed source, either by the
    /// transformer itself or by the host's instrumenter.
    #[default]
    Babel,
    /// The runtime collects coverage natively; transformed code is never
    /// instrumented.
    V8,
}

impl CoverageProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageProvider::Babel => "babel",
            CoverageProvider::V8 => "v8",
        }
    }
}

/// Maps paths matching `pattern` to a registered transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformEntry {
    pub pattern: String,
    pub transformer: String,
    /// User options handed to the transformer, deserialized into its own
    /// option type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl TransformEntry {
    pub fn new(pattern: impl Into<String>, transformer: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            transformer: transformer.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = Some(options);
        self
    }
}

/// The enclosing project configuration handed to every transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default)]
    pub coverage_provider: CoverageProvider,
    #[serde(default)]
    pub collect_coverage: bool,
    #[serde(default = "default_ignore_patterns")]
    pub transform_ignore_patterns: Vec<String>,
    /// Checked in order; the first matching entry wins.
    #[serde(default, rename = "transform")]
    pub transforms: Vec<TransformEntry>,
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_ignore_patterns() -> Vec<String> {
    vec!["/node_modules/".to_string()]
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            coverage_provider: CoverageProvider::default(),
            collect_coverage: false,
            transform_ignore_patterns: default_ignore_patterns(),
            transforms: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|error| Error::Toml {
            error,
            context: path.display().to_string(),
        })
    }

    /// Loads the configuration at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serializes the configuration for use as a cache-busting input.
    ///
    /// Field order is fixed and option maps are key-sorted, so equal
    /// configurations always produce the same string.
    pub fn config_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_transform(mut self, entry: TransformEntry) -> Self {
        self.transforms.push(entry);
        self
    }
}
