// check.rs — The `concord check` command.

use std::fs;
use std::path::Path;

use anyhow::Context;

use concord_core::OperationCandidate;
use concord_engine::StructuralVerifier;
use concord_pipeline::{
    build_human_report, build_machine_report, build_run_summary, load_operations, run_comparison,
    PipelineConfig,
};

/// The policy ID the extraction tagged these operations with, read off
/// the first cited evidence span.
fn policy_id_of(ops: &[OperationCandidate], fallback: &str) -> String {
    ops.iter()
        .flat_map(|op| op.evidence_spans.first())
        .map(|span| span.policy_id.clone())
        .next()
        .unwrap_or_else(|| fallback.to_string())
}

pub fn execute(
    first_party: &Path,
    third_party: &Path,
    vocab_path: &Path,
    rules_path: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    strict_context: bool,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if strict_context {
        config.reasoning.strict_context_compat = true;
    }

    let vocab = concord_ontology::load_vocab(vocab_path)?;
    let rules = concord_ontology::load_rules(rules_path)?;
    let fp_ops = load_operations(first_party)?;
    let tp_ops = load_operations(third_party)?;
    tracing::info!(
        "loaded {} first-party and {} third-party operations",
        fp_ops.len(),
        tp_ops.len()
    );

    let outcome = run_comparison(
        &fp_ops,
        &tp_ops,
        &vocab,
        &rules,
        &config,
        None,
        &StructuralVerifier,
    );

    let human = build_human_report(&outcome);
    print!("{human}");

    if let Some(dir) = output {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;

        let machine = build_machine_report(
            &outcome,
            &policy_id_of(&fp_ops, "fp_policy"),
            &policy_id_of(&tp_ops, "tp_policy"),
        );
        let summary = build_run_summary(&outcome, &config);

        fs::write(
            dir.join("report.machine.json"),
            serde_json::to_string_pretty(&machine)?,
        )?;
        fs::write(dir.join("report.human.txt"), &human)?;
        fs::write(
            dir.join("summary.json"),
            serde_json::to_string_pretty(&summary)?,
        )?;
        tracing::info!("reports written to {}", dir.display());
    }

    if outcome.blocking_errors {
        anyhow::bail!("validation reported blocking errors; no reasoning was performed");
    }
    Ok(())
}
