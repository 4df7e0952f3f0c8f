// error.rs — Error types for ontology loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading vocabulary or compatibility-rules files.
///
/// These are fatal: a run aborts before any reasoning rather than
/// proceeding on a silently mis-parsed ontology.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The path is neither a vocab directory nor a recognized document.
    /// Guards against silently loading a legacy format.
    #[error("unsupported ontology format at {path}: expected a vocab directory or a .json document")]
    UnsupportedFormat { path: PathBuf },

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid JSON of the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
