// report.rs — Machine and human rendering of a run's output.
//
// Rendering only: the ordered issue and finding lists are presented,
// never reinterpreted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use concord_core::ValidationIssue;

use crate::config::PipelineConfig;
use crate::run::RunOutcome;

/// The machine-readable report, written as `report.machine.json`.
#[derive(Debug, Clone, Serialize)]
pub struct MachineReport {
    pub report_id: String,
    pub first_party_policy_id: String,
    pub third_party_policy_id: String,
    pub generated_at: DateTime<Utc>,
    pub blocking_errors: bool,
    pub findings: Vec<concord_core::ComplianceFinding>,
}

pub fn build_machine_report(
    outcome: &RunOutcome,
    first_party_policy_id: &str,
    third_party_policy_id: &str,
) -> MachineReport {
    MachineReport {
        report_id: format!("report_{}", Uuid::new_v4()),
        first_party_policy_id: first_party_policy_id.to_string(),
        third_party_policy_id: third_party_policy_id.to_string(),
        generated_at: Utc::now(),
        blocking_errors: outcome.blocking_errors,
        findings: outcome.findings.clone(),
    }
}

// ── Run summary ──

#[derive(Debug, Clone, Serialize)]
pub struct SummaryConfig {
    pub strict_context_compat: bool,
    pub min_alignment_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeStats {
    pub fp_operations: usize,
    pub tp_operations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateStats {
    pub issues: Vec<ValidationIssue>,
    pub blocking_errors: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReasonStats {
    pub aligned_pairs: usize,
    pub findings: usize,
}

/// Per-stage statistics for one run, written as `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub config: SummaryConfig,
    pub normalize: NormalizeStats,
    pub validate: ValidateStats,
    pub reason: ReasonStats,
}

pub fn build_run_summary(outcome: &RunOutcome, config: &PipelineConfig) -> RunSummary {
    RunSummary {
        config: SummaryConfig {
            strict_context_compat: config.reasoning.strict_context_compat,
            min_alignment_score: config.reasoning.min_alignment_score,
        },
        normalize: NormalizeStats {
            fp_operations: outcome.fp_operations.len(),
            tp_operations: outcome.tp_operations.len(),
        },
        validate: ValidateStats {
            issues: outcome.issues.clone(),
            blocking_errors: outcome.blocking_errors,
        },
        reason: ReasonStats {
            aligned_pairs: outcome.aligned.len(),
            findings: outcome.findings.len(),
        },
    }
}

// ── Human report ──

/// Render the run as readable text, written as `report.human.txt`.
pub fn build_human_report(outcome: &RunOutcome) -> String {
    let mut out = String::new();
    out.push_str("Disclosure consistency report\n");
    out.push_str("=============================\n\n");

    if outcome.blocking_errors {
        out.push_str(
            "Validation reported blocking errors; alignment and mismatch detection were skipped.\n\n",
        );
    }

    if outcome.issues.is_empty() {
        out.push_str("Validation: no issues.\n\n");
    } else {
        out.push_str(&format!("Validation: {} issue(s)\n", outcome.issues.len()));
        for issue in &outcome.issues {
            out.push_str(&format!(
                "  [{}] {} ({}, {})\n",
                issue.level, issue.message, issue.op_id, issue.policy_id
            ));
        }
        out.push('\n');
    }

    if outcome.findings.is_empty() {
        out.push_str("Findings: none.\n");
    } else {
        out.push_str(&format!("Findings: {}\n", outcome.findings.len()));
        for finding in &outcome.findings {
            out.push_str(&format!(
                "\n{} — {} [{}]\n  {}\n",
                finding.finding_id, finding.finding_type, finding.status, finding.summary
            ));
            if let Some(span) = finding.fp_evidence.first() {
                out.push_str(&format!("  first party: \"{}\"\n", span.quote));
            }
            if let Some(span) = finding.tp_evidence.first() {
                out.push_str(&format!("  third party: \"{}\"\n", span.quote));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::{
        ComplianceFinding, FindingStatus, FindingType, IssueLevel, TextSpan,
    };

    fn span(policy_id: &str, quote: &str) -> TextSpan {
        TextSpan {
            policy_id: policy_id.to_string(),
            section_id: "sec_1".to_string(),
            section_path: "Policy".to_string(),
            start_char: 0,
            end_char: quote.len(),
            quote: quote.to_string(),
        }
    }

    fn outcome_with_finding() -> RunOutcome {
        RunOutcome {
            fp_operations: Vec::new(),
            tp_operations: Vec::new(),
            issues: vec![ValidationIssue {
                issue_id: "issue_1".to_string(),
                level: IssueLevel::Warning,
                message: "operation missing modality/view".to_string(),
                op_id: "fp_1".to_string(),
                policy_id: "fp_policy".to_string(),
            }],
            blocking_errors: false,
            aligned: Vec::new(),
            findings: vec![ComplianceFinding {
                finding_id: "finding_1".to_string(),
                finding_type: FindingType::PurposeMismatch,
                status: FindingStatus::PotentiallyNonCompliant,
                summary: "third party declares purposes outside the disclosed scope".to_string(),
                fp_op_id: Some("fp_1".to_string()),
                tp_op_id: Some("tp_1".to_string()),
                fp_evidence: vec![span("fp_policy", "we may share for analytics")],
                tp_evidence: vec![span("tp_policy", "we collect for advertising")],
                metadata: serde_json::Map::new(),
            }],
        }
    }

    #[test]
    fn machine_report_carries_findings_and_ids() {
        let outcome = outcome_with_finding();
        let report = build_machine_report(&outcome, "fp_policy", "tp_policy");
        assert!(report.report_id.starts_with("report_"));
        assert_eq!(report.first_party_policy_id, "fp_policy");
        assert_eq!(report.findings.len(), 1);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("purpose_mismatch"));
    }

    #[test]
    fn summary_counts_match_the_outcome() {
        let outcome = outcome_with_finding();
        let summary = build_run_summary(&outcome, &PipelineConfig::default());
        assert_eq!(summary.validate.issues.len(), 1);
        assert_eq!(summary.reason.findings, 1);
        assert_eq!(summary.config.min_alignment_score, 1.25);
    }

    #[test]
    fn human_report_quotes_both_sides() {
        let outcome = outcome_with_finding();
        let text = build_human_report(&outcome);
        assert!(text.contains("purpose_mismatch"));
        assert!(text.contains("we may share for analytics"));
        assert!(text.contains("we collect for advertising"));
        assert!(text.contains("[warning]"));
    }

    #[test]
    fn blocked_run_renders_the_gate_notice() {
        let mut outcome = outcome_with_finding();
        outcome.blocking_errors = true;
        outcome.findings.clear();

        let text = build_human_report(&outcome);
        assert!(text.contains("blocking errors"));
        assert!(text.contains("Findings: none."));
    }
}
