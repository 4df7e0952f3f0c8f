// config.rs — Pipeline configuration.
//
// Loaded from a small YAML file. The file is optional: a missing path
// yields defaults, so a bare `concord check` works out of the box. An
// existing file that fails to parse is an error — a typo'd config must
// not silently run with defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

fn default_min_alignment_score() -> f64 {
    concord_engine::align::DEFAULT_MIN_SCORE
}

/// The `reasoning` section of the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasoningConfig {
    /// Score declared localisation/temporal pairs during alignment.
    #[serde(default)]
    pub strict_context_compat: bool,

    /// Minimum multi-signal score for an aligned pair to be committed.
    #[serde(default = "default_min_alignment_score")]
    pub min_alignment_score: f64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            strict_context_compat: false,
            min_alignment_score: default_min_alignment_score(),
        }
    }
}

/// Top-level pipeline configuration.
///
/// ```yaml
/// reasoning:
///   strict_context_compat: true
///   min_alignment_score: 1.4
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    #[serde(default)]
    pub reasoning: ReasoningConfig,
}

impl PipelineConfig {
    /// Load from a YAML file; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("no config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&data).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The aligner view of this config.
    pub fn aligner_config(&self) -> concord_engine::AlignerConfig {
        concord_engine::AlignerConfig {
            strict_context_compat: self.reasoning.strict_context_compat,
            min_score: self.reasoning.min_alignment_score,
        }
    }
}
