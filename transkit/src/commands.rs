//! Command implementations for the CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::info;
use transkit_core::{CallerSupport, ProjectConfig, ScriptTransformer, TransformRequest};
use transkit_transformers::builtin_registry;

use crate::formatting::{print_error, print_file_header, print_key_value, print_success};

fn load_host(config_path: &Path) -> Result<ScriptTransformer> {
    let config = ProjectConfig::load_or_default(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    info!(
        config = %config_path.display(),
        transforms = config.transforms.len(),
        "loaded configuration"
    );
    Ok(ScriptTransformer::new(config, builtin_registry())?)
}

fn request(host: &ScriptTransformer, coverage: bool, esm: bool) -> TransformRequest {
    let caller = if esm {
        CallerSupport::esm()
    } else {
        CallerSupport::default()
    };
    TransformRequest::new(coverage || host.config().collect_coverage, caller)
}

pub fn cmd_transform(
    config_path: &Path,
    files: Vec<PathBuf>,
    coverage: bool,
    esm: bool,
    json: bool,
) -> Result<()> {
    let host = load_host(config_path)?;
    let request = request(&host, coverage, esm);

    let results = files
        .iter()
        .map(|file| {
            host.transform_file(file, &request)
                .with_context(|| format!("Failed to transform {}", file.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        print_file_header(
            &result.path.display().to_string(),
            result.transformer.as_deref(),
        );
        println!("{}", result.code);
    }

    Ok(())
}

pub fn cmd_cache_key(config_path: &Path, file: PathBuf, coverage: bool, esm: bool) -> Result<()> {
    let host = load_host(config_path)?;
    let request = request(&host, coverage, esm);
    let source = host.cache_fs().read_to_string(&file)?;

    match host.cache_key_for(&file, &source, &request)? {
        Some(key) => println!("{}", key),
        None => println!("(none)"),
    }

    Ok(())
}

#[derive(Serialize)]
struct TransformerInfo {
    name: String,
    kind: &'static str,
}

pub fn cmd_list(json: bool) -> Result<()> {
    let registry = builtin_registry();
    let transformers: Vec<TransformerInfo> = registry
        .registered()
        .into_iter()
        .filter_map(|name| {
            registry.kind(&name).map(|kind| TransformerInfo {
                name,
                kind: kind.as_str(),
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&transformers)?);
        return Ok(());
    }

    println!("{}", "Transformers".bold().cyan());
    println!();
    for transformer in &transformers {
        print_key_value(&transformer.name, transformer.kind);
    }
    println!();

    Ok(())
}

#[derive(Serialize)]
struct CheckReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    transforms: usize,
}

pub fn cmd_check(config_path: &Path, json: bool) -> Result<()> {
    let outcome = load_host(config_path).and_then(|host| {
        host.preload()?;
        Ok(host.config().transforms.len())
    });

    let report = match &outcome {
        Ok(transforms) => CheckReport {
            valid: true,
            error: None,
            transforms: *transforms,
        },
        Err(e) => CheckReport {
            valid: false,
            error: Some(format!("{:#}", e)),
            transforms: 0,
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(error) = &report.error {
        print_error(&format!("Invalid configuration: {}", error));
    } else {
        print_success(&format!(
            "Configuration valid ({} transforms)",
            report.transforms
        ));
    }

    if !report.valid {
        std::process::exit(1);
    }

    Ok(())
}
