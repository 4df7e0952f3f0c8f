// run.rs — One comparison run, end to end.
//
// Everything here is a pure function of (extracted operations, ontology,
// rules, config) → (issues, pairs, findings). No state survives the run.

use std::fs;
use std::path::Path;

use serde::Serialize;

use concord_core::{
    AlignedPair, ComplianceFinding, IdSequence, NormalizedOperation, OperationCandidate,
    ValidationIssue,
};
use concord_engine::{
    align_operations, find_mismatches, has_blocking_errors, validate_operations, FindingVerifier,
    LabelChooser, Normalizer,
};
use concord_ontology::{CompatibilityRules, HierarchyIndex, Vocabulary};

use crate::config::PipelineConfig;
use crate::error::PipelineError;

/// Everything one run produced, in stage order.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub fp_operations: Vec<NormalizedOperation>,
    pub tp_operations: Vec<NormalizedOperation>,
    pub issues: Vec<ValidationIssue>,
    /// True when validation found an error-level issue. Alignment and
    /// mismatch detection were skipped and `aligned`/`findings` are
    /// empty.
    pub blocking_errors: bool,
    pub aligned: Vec<AlignedPair>,
    pub findings: Vec<ComplianceFinding>,
}

/// Load extraction output: a JSON array of operation candidates.
pub fn load_operations(path: impl AsRef<Path>) -> Result<Vec<OperationCandidate>, PipelineError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the core over pre-extracted operations from both policies.
pub fn run_comparison(
    fp_candidates: &[OperationCandidate],
    tp_candidates: &[OperationCandidate],
    vocab: &Vocabulary,
    rules: &CompatibilityRules,
    config: &PipelineConfig,
    chooser: Option<&dyn LabelChooser>,
    verifier: &dyn FindingVerifier,
) -> RunOutcome {
    let normalizer = Normalizer::new(vocab);
    let fp_operations: Vec<NormalizedOperation> = fp_candidates
        .iter()
        .map(|op| normalizer.normalize_operation(op, chooser))
        .collect();
    let tp_operations: Vec<NormalizedOperation> = tp_candidates
        .iter()
        .map(|op| normalizer.normalize_operation(op, chooser))
        .collect();
    tracing::info!(
        "normalized {} first-party and {} third-party operations",
        fp_operations.len(),
        tp_operations.len()
    );

    let mut issue_ids = IdSequence::new("issue");
    let mut all_ops = fp_operations.clone();
    all_ops.extend(tp_operations.iter().cloned());
    let issues = validate_operations(&all_ops, &mut issue_ids);
    let blocking_errors = has_blocking_errors(&issues);

    if blocking_errors {
        tracing::warn!(
            "validation reported blocking errors ({} issues); skipping reasoning",
            issues.len()
        );
        return RunOutcome {
            fp_operations,
            tp_operations,
            issues,
            blocking_errors,
            aligned: Vec::new(),
            findings: Vec::new(),
        };
    }

    let index = HierarchyIndex::build(vocab, rules);
    let aligned = align_operations(
        &fp_operations,
        &tp_operations,
        &index,
        &config.aligner_config(),
    );
    tracing::info!("aligned {} operation pairs", aligned.len());

    let mut finding_ids = IdSequence::new("finding");
    let findings = find_mismatches(
        &aligned,
        &fp_operations,
        &tp_operations,
        &index,
        verifier,
        &mut finding_ids,
    );
    tracing::info!("emitted {} findings", findings.len());

    RunOutcome {
        fp_operations,
        tp_operations,
        issues,
        blocking_errors,
        aligned,
        findings,
    }
}
