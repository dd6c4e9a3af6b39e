//! Hook for the host's default coverage instrumentation.

use std::path::Path;

use crate::error::Result;
use crate::source::{SourceMap, TransformedSource};

/// Inserts coverage tracking into transformed code.
///
/// The host calls this for transformers that cannot instrument their own
/// output. Returning [`TransformedSource::Code`] keeps the incoming map;
/// returning [`TransformedSource::Mapped`] replaces it.
pub trait Instrumenter: Send + Sync {
    fn instrument(
        &self,
        code: &str,
        source_path: &Path,
        map: Option<&SourceMap>,
    ) -> Result<TransformedSource>;
}
