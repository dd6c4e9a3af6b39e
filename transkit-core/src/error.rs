//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Unknown transformer: {name}. Registered transformers: {available}")]
    UnknownTransformer { name: String, available: String },

    #[error("Invalid options for transformer {transformer}: {message}")]
    TransformerConfig { transformer: String, message: String },

    #[error("{0}")]
    Plugin(String),

    #[error("Transformer {transformer} failed for {}: {message}", .path.display())]
    Transform {
        path: PathBuf,
        transformer: String,
        message: String,
    },

    #[error("Instrumentation failed for {}: {message}", .path.display())]
    Instrument { path: PathBuf, message: String },
}

impl Error {
    /// Builds the error a transformer returns when it cannot transform its input.
    pub fn plugin(message: impl Into<String>) -> Self {
        Error::Plugin(message.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::Toml {
            error,
            context: "transkit.toml".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
