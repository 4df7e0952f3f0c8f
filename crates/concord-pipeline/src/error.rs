// error.rs — Error types for pipeline orchestration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run before any reasoning happens.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ontology or rules file problem (fatal).
    #[error(transparent)]
    Config(#[from] concord_ontology::ConfigError),

    /// A pipeline input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Extraction output was not valid JSON of the expected shape.
    #[error("failed to parse operations from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The pipeline config file exists but is not valid YAML.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}
