pub mod json;
pub mod replace;
pub mod text;

pub use json::JsonTransformer;
pub use replace::{ReplaceFactory, ReplaceOptions, ReplaceRule, ReplaceTransformer};
pub use text::RawTextTransformer;

use transkit_core::options::TransformOptions;
use transkit_core::registry::TransformerRegistry;
use transkit_core::transformer::TransformerPlugin;

/// Version mixed into every built-in cache key.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Registers the built-in transformers under their default names.
pub fn register_builtin(registry: &mut TransformerRegistry) {
    registry.register("text", TransformerPlugin::ready(RawTextTransformer));
    registry.register("json", TransformerPlugin::ready(JsonTransformer));
    registry.register("replace", TransformerPlugin::factory(ReplaceFactory));
}

/// Returns a registry holding only the built-in transformers.
pub fn builtin_registry() -> TransformerRegistry {
    let mut registry = TransformerRegistry::new();
    register_builtin(&mut registry);
    registry
}

/// Wraps an expression as the default export of a module.
pub(crate) fn export_module<O>(value: &str, options: &TransformOptions<'_, O>) -> String {
    if options.supports_static_esm {
        format!("export default {};\n", value)
    } else {
        format!("module.exports = {};\n", value)
    }
}
