use std::fs;
use std::path::Path;

use proptest::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use transkit_core::{
    CallerSupport, Error, Instrumentation, PluginKind, ProjectConfig, ScriptTransformer,
    SourceMap, TransformEntry, TransformRequest,
};
use transkit_transformers::builtin_registry;

fn host(config: ProjectConfig) -> ScriptTransformer {
    ScriptTransformer::new(config, builtin_registry()).unwrap()
}

fn default_host() -> ScriptTransformer {
    host(
        ProjectConfig::default()
            .with_transform(TransformEntry::new(r"\.txt$", "text"))
            .with_transform(TransformEntry::new(r"\.json$", "json")),
    )
}

#[test]
fn test_builtin_registry() {
    let registry = builtin_registry();
    assert_eq!(registry.registered(), vec!["json", "replace", "text"]);
    assert_eq!(registry.kind("text"), Some(PluginKind::Ready));
    assert_eq!(registry.kind("replace"), Some(PluginKind::Factory));
}

#[test]
fn test_text_commonjs_and_esm() {
    let host = default_host();
    let path = Path::new("fixtures/greeting.txt");

    let cjs = host
        .transform_source(path, "hi \"there\"\n", &TransformRequest::default())
        .unwrap();
    assert_eq!(cjs.code, "module.exports = \"hi \\\"there\\\"\\n\";\n");

    let esm = host
        .transform_source(path, "hi", &TransformRequest::new(false, CallerSupport::esm()))
        .unwrap();
    assert_eq!(esm.code, "export default \"hi\";\n");
}

#[test]
fn test_json_keeps_document() {
    let host = default_host();
    let result = host
        .transform_source(
            Path::new("data.json"),
            "{\"b\": 1, \"a\": [true]}\n",
            &TransformRequest::default(),
        )
        .unwrap();
    assert_eq!(result.code, "module.exports = {\"b\": 1, \"a\": [true]};\n");
    assert!(result.map.is_none());
}

#[test]
fn test_json_rejects_invalid_document() {
    let host = default_host();
    let result = host.transform_source(
        Path::new("data.json"),
        "{\"a\": }",
        &TransformRequest::default(),
    );
    match result {
        Err(Error::Transform {
            transformer,
            message,
            ..
        }) => {
            assert_eq!(transformer, "json");
            assert!(message.contains("data.json"));
        }
        other => panic!("expected transform error, got {:?}", other),
    }
}

#[test]
fn test_data_modules_count_as_instrumented() {
    let host = default_host();
    let result = host
        .transform_source(
            Path::new("data.json"),
            "[]",
            &TransformRequest::new(true, CallerSupport::default()),
        )
        .unwrap();
    assert_eq!(result.instrumentation, Instrumentation::ByTransformer);
    assert_eq!(result.code, "module.exports = [];\n");
}

#[test]
fn test_replace_with_options() {
    let config = ProjectConfig::default().with_transform(
        TransformEntry::new(r"\.js$", "replace").with_options(json!({
            "rules": [
                {"pattern": "__DEV__", "replacement": "false"},
                {"pattern": r"process\.env\.(\w+)", "replacement": "ENV.$1"}
            ],
            "source_map": true
        })),
    );
    let host = host(config);
    let source = "if (__DEV__) {\n  log(process.env.NODE_ENV);\n}\n";
    let result = host
        .transform_source(Path::new("src/index.js"), source, &TransformRequest::default())
        .unwrap();

    assert_eq!(result.code, "if (false) {\n  log(ENV.NODE_ENV);\n}\n");
    let Some(SourceMap::Raw(map)) = result.map else {
        panic!("expected a structured map");
    };
    assert_eq!(map.sources, vec!["src/index.js"]);
    assert_eq!(map.mappings, "AAAA;AACA;AACA;AACA");
    assert!(result.cache_key.is_some());
}

#[test]
fn test_replace_drops_map_when_lines_change() {
    let config = ProjectConfig::default().with_transform(
        TransformEntry::new(r"\.js$", "replace").with_options(json!({
            "rules": [{"pattern": ";", "replacement": ";\n"}],
            "source_map": true
        })),
    );
    let result = host(config)
        .transform_source(Path::new("a.js"), "a();b();", &TransformRequest::default())
        .unwrap();
    assert_eq!(result.code, "a();\nb();\n");
    assert!(result.map.is_none());
}

#[test]
fn test_replace_without_options_is_identity() {
    let config = ProjectConfig::default().with_transform(TransformEntry::new(r"\.js$", "replace"));
    let result = host(config)
        .transform_source(Path::new("a.js"), "a();", &TransformRequest::default())
        .unwrap();
    assert_eq!(result.code, "a();");
    assert_eq!(result.transformer.as_deref(), Some("replace"));
}

#[test]
fn test_replace_invalid_rule_surfaces_on_preload() {
    let config = ProjectConfig::default().with_transform(
        TransformEntry::new(r"\.js$", "replace")
            .with_options(json!({"rules": [{"pattern": "(", "replacement": ""}]})),
    );
    assert!(matches!(
        host(config).preload(),
        Err(Error::TransformerConfig { .. })
    ));
}

#[test]
fn test_replace_unknown_option_rejected() {
    let config = ProjectConfig::default().with_transform(
        TransformEntry::new(r"\.js$", "replace").with_options(json!({"rulez": []})),
    );
    assert!(matches!(
        host(config).preload(),
        Err(Error::TransformerConfig { .. })
    ));
}

#[test]
fn test_options_change_cache_key() {
    let make = |replacement: &str| {
        let config = ProjectConfig::default().with_transform(
            TransformEntry::new(r"\.js$", "replace").with_options(json!({
                "rules": [{"pattern": "a", "replacement": replacement}]
            })),
        );
        host(config)
            .cache_key_for(Path::new("a.js"), "a", &TransformRequest::default())
            .unwrap()
    };
    assert_ne!(make("b"), make("c"));
}

#[test]
fn test_transform_file_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("notes.txt");
    fs::write(&path, "remember").unwrap();

    let host = default_host();
    let result = host.transform_file(&path, &TransformRequest::default()).unwrap();
    assert_eq!(result.code, "module.exports = \"remember\";\n");
    assert_eq!(host.cache_fs().get(&path).as_deref(), Some("remember"));
}

proptest! {
    #[test]
    fn test_text_cache_key_deterministic(source in ".*", esm in any::<bool>()) {
        let host = default_host();
        let caller = if esm { CallerSupport::esm() } else { CallerSupport::default() };
        let request = TransformRequest::new(false, caller);
        let first = host.cache_key_for(Path::new("a.txt"), &source, &request).unwrap();
        let second = host.cache_key_for(Path::new("a.txt"), &source, &request).unwrap();
        prop_assert!(first.is_some());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_text_output_is_valid_string_literal(source in ".*") {
        let host = default_host();
        let result = host
            .transform_source(Path::new("a.txt"), &source, &TransformRequest::default())
            .unwrap();
        let literal = result
            .code
            .strip_prefix("module.exports = ")
            .and_then(|rest| rest.strip_suffix(";\n"))
            .unwrap();
        let decoded: String = serde_json::from_str(literal).unwrap();
        prop_assert_eq!(decoded, source);
    }
}
