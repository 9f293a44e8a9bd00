use std::path::PathBuf;
use thiserror::Error;

/// Fatal build errors. Any of these aborts the build before an artifact is written.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error(
        "Module not found: '{literal}' (tried {}) referenced from {referenced_from}",
        .candidates.join(", ")
    )]
    ModuleNotFound {
        literal: String,
        candidates: Vec<String>,
        referenced_from: String,
    },

    #[error("Circular import detected: {}", .chain.join(" -> "))]
    CircularImport { chain: Vec<String> },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BundleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BundleError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BundleError>;
