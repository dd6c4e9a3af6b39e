//! Host side of the transformer contract.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache_fs::CacheFs;
use crate::config::{CoverageProvider, ProjectConfig};
use crate::error::{Error, Result};
use crate::instrument::Instrumenter;
use crate::options::CallerSupport;
use crate::registry::{BoundTransformer, InvocationContext, TransformerRegistry};
use crate::source::{SourceMap, TransformedSource};

/// Per-call inputs chosen by the test runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformRequest {
    /// Whether coverage is being collected for this file.
    pub instrument: bool,
    pub caller: CallerSupport,
}

impl TransformRequest {
    pub fn new(instrument: bool, caller: CallerSupport) -> Self {
        Self { instrument, caller }
    }
}

/// Who inserted coverage instrumentation into a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Instrumentation {
    None,
    ByTransformer,
    ByHost,
}

/// Normalized output of a host transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformResult {
    pub path: PathBuf,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<SourceMap>,
    /// Name of the transformer that ran, `None` for passthrough.
    pub transformer: Option<String>,
    pub cache_key: Option<String>,
    pub instrumentation: Instrumentation,
}

struct CompiledEntry {
    pattern: Regex,
    transformer: String,
    options: Option<serde_json::Value>,
}

/// Selects, instantiates and invokes transformers for project files.
///
/// Transformers are bound lazily, once per configured transform entry, and
/// reused for every later file that matches the same entry.
pub struct ScriptTransformer {
    config: ProjectConfig,
    config_string: String,
    registry: TransformerRegistry,
    entries: Vec<CompiledEntry>,
    ignore_patterns: Vec<Regex>,
    bound: DashMap<usize, Arc<dyn BoundTransformer>>,
    cache_fs: CacheFs,
    instrumenter: Option<Box<dyn Instrumenter>>,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Resolves relative paths against `root_dir` and normalizes separators so
/// patterns can be written with `/`. The result always starts with `/`.
fn match_target(root_dir: &Path, path: &Path) -> String {
    let resolved = if path.is_relative() {
        root_dir.join(path)
    } else {
        path.to_path_buf()
    };
    let target = resolved.to_string_lossy().replace('\\', "/");
    if target.starts_with('/') {
        target
    } else {
        format!("/{}", target)
    }
}

impl ScriptTransformer {
    /// Creates a host for `config`, resolving transformer names in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern does not compile or a transform entry
    /// names an unregistered transformer.
    pub fn new(config: ProjectConfig, registry: TransformerRegistry) -> Result<Self> {
        let config_string = config.config_string()?;

        let entries = config
            .transforms
            .iter()
            .map(|entry| {
                if !registry.contains(&entry.transformer) {
                    return Err(registry.unknown(&entry.transformer));
                }
                Ok(CompiledEntry {
                    pattern: compile(&entry.pattern)?,
                    transformer: entry.transformer.clone(),
                    options: entry.options.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ignore_patterns = config
            .transform_ignore_patterns
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            config_string,
            registry,
            entries,
            ignore_patterns,
            bound: DashMap::new(),
            cache_fs: CacheFs::new(),
            instrumenter: None,
        })
    }

    /// Sets the instrumenter applied to output of transformers that cannot
    /// instrument.
    pub fn with_instrumenter(mut self, instrumenter: impl Instrumenter + 'static) -> Self {
        self.instrumenter = Some(Box::new(instrumenter));
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn cache_fs(&self) -> &CacheFs {
        &self.cache_fs
    }

    /// Returns the name of the transformer that handles `path`, if any.
    pub fn transformer_for(&self, path: &Path) -> Option<&str> {
        self.entry_index(path)
            .map(|index| self.entries[index].transformer.as_str())
    }

    /// Binds every transform entry now instead of on first use, surfacing
    /// option errors up front.
    pub fn preload(&self) -> Result<()> {
        for index in 0..self.entries.len() {
            self.bound_transformer(index)?;
        }
        Ok(())
    }

    /// Reads `path` through the shared [`CacheFs`] and transforms it.
    pub fn transform_file(&self, path: &Path, request: &TransformRequest) -> Result<TransformResult> {
        let source = self.cache_fs.read_to_string(path)?;
        self.transform_source(path, &source, request)
    }

    /// Transforms `source`, which is the contents of `path`.
    ///
    /// Paths that are ignored or match no transform entry are returned
    /// unchanged.
    pub fn transform_source(
        &self,
        path: &Path,
        source: &str,
        request: &TransformRequest,
    ) -> Result<TransformResult> {
        let Some(index) = self.entry_index(path) else {
            debug!(path = %path.display(), "no transformer, passing through");
            return Ok(TransformResult {
                path: path.to_path_buf(),
                code: source.to_string(),
                map: None,
                transformer: None,
                cache_key: None,
                instrumentation: Instrumentation::None,
            });
        };

        let name = self.entries[index].transformer.clone();
        let transformer = self.bound_transformer(index)?;
        let ctx = self.context(request);

        let cache_key = transformer.cache_key(source, path, &ctx);
        debug!(
            path = %path.display(),
            transformer = %name,
            cache_key = cache_key.as_deref().unwrap_or("none"),
            "transforming"
        );

        let output = transformer
            .process(source, path, &ctx)
            .map_err(|e| Error::Transform {
                path: path.to_path_buf(),
                transformer: name.clone(),
                message: e.to_string(),
            })?;
        let (mut code, mut map) = output.into_parts();

        let instrumentation = if !ctx.instrument {
            Instrumentation::None
        } else if transformer.can_instrument() {
            Instrumentation::ByTransformer
        } else if let Some(instrumenter) = &self.instrumenter {
            let instrumented = instrumenter
                .instrument(&code, path, map.as_ref())
                .map_err(|e| Error::Instrument {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            match instrumented {
                TransformedSource::Code(instrumented_code) => code = instrumented_code,
                TransformedSource::Mapped {
                    code: instrumented_code,
                    map: instrumented_map,
                } => {
                    code = instrumented_code;
                    map = instrumented_map;
                }
            }
            Instrumentation::ByHost
        } else {
            warn!(
                path = %path.display(),
                transformer = %name,
                "coverage requested but no instrumenter is configured"
            );
            Instrumentation::None
        };

        Ok(TransformResult {
            path: path.to_path_buf(),
            code,
            map,
            transformer: Some(name),
            cache_key,
            instrumentation,
        })
    }

    /// Returns the transformer's cache key for `source`, or `None` when the
    /// path has no transformer or the transformer offers no key.
    pub fn cache_key_for(
        &self,
        path: &Path,
        source: &str,
        request: &TransformRequest,
    ) -> Result<Option<String>> {
        let Some(index) = self.entry_index(path) else {
            return Ok(None);
        };
        let transformer = self.bound_transformer(index)?;
        Ok(transformer.cache_key(source, path, &self.context(request)))
    }

    fn context(&self, request: &TransformRequest) -> InvocationContext<'_> {
        InvocationContext {
            cache_fs: &self.cache_fs,
            config: &self.config,
            config_string: &self.config_string,
            instrument: request.instrument
                && self.config.coverage_provider == CoverageProvider::Babel,
            caller: request.caller,
        }
    }

    fn entry_index(&self, path: &Path) -> Option<usize> {
        let target = match_target(&self.config.root_dir, path);
        if self.ignore_patterns.iter().any(|re| re.is_match(&target)) {
            return None;
        }
        self.entries
            .iter()
            .position(|entry| entry.pattern.is_match(&target))
    }

    fn bound_transformer(&self, index: usize) -> Result<Arc<dyn BoundTransformer>> {
        if let Some(bound) = self.bound.get(&index) {
            return Ok(Arc::clone(bound.value()));
        }

        // Bound under the shard lock so concurrent first calls create it once.
        let entry = &self.entries[index];
        let stored = self.bound.entry(index).or_try_insert_with(|| {
            debug!(transformer = %entry.transformer, "binding transformer");
            self.registry
                .bind(&entry.transformer, entry.options.as_ref())
        })?;
        Ok(Arc::clone(stored.value()))
    }
}
