// detect.rs — The mismatch rule cascade.
//
// For each aligned pair, in pair order, rules are tried in a fixed
// precedence and the first match produces exactly one finding:
//
//   1. precondition  — either side has no evidence spans → skip the
//      pair entirely (no finding; cannot cite)
//   2. under-specified — action or subject failed to normalize
//   3. contradiction — first-party view is an explicit prohibition
//      ("do_not") the third party does not share
//   4. purpose mismatch — third-party purposes outside the closure of
//      the first party's declared purposes
//   5. condition mismatch — declared legal bases differ
//   6. satisfied — the pair is consistent
//
// Every candidate finding passes through the verifier capability; a
// NOT_CONFIRMED verdict drops it, CONFIRMED and UNDER_SPECIFIED keep it
// (under-specification is itself evidence, not a claim requiring full
// entailment). The verifier call is the single suspension point in the
// pipeline — it may be a network round-trip behind the trait.

use std::collections::HashMap;

use serde_json::json;

use concord_core::{
    AlignedPair, ComplianceFinding, FindingStatus, FindingType, IdSequence, NormalizedOperation,
    Verdict,
};
use concord_ontology::HierarchyIndex;

use crate::verify::FindingVerifier;

fn unresolved_core_slots(op: &NormalizedOperation) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !op.action.is_resolved() {
        missing.push("action");
    }
    if !op.subject.is_resolved() {
        missing.push("subject");
    }
    missing
}

fn prohibits(op: &NormalizedOperation) -> bool {
    op.view.uri().is_some_and(|uri| uri.ends_with("do_not"))
}

/// What the cascade decided for one pair, before verification.
struct RuleOutcome {
    finding_type: FindingType,
    status: FindingStatus,
    summary: String,
    metadata: serde_json::Map<String, serde_json::Value>,
}

fn apply_cascade(
    fp: &NormalizedOperation,
    tp: &NormalizedOperation,
    index: &HierarchyIndex,
) -> RuleOutcome {
    let mut metadata = serde_json::Map::new();

    // Rule 2: under-specified requirement.
    let fp_unresolved = unresolved_core_slots(fp);
    let tp_unresolved = unresolved_core_slots(tp);
    if !fp_unresolved.is_empty() || !tp_unresolved.is_empty() {
        metadata.insert("fp_unresolved".to_string(), json!(fp_unresolved));
        metadata.insert("tp_unresolved".to_string(), json!(tp_unresolved));
        return RuleOutcome {
            finding_type: FindingType::UnderSpecifiedRequirement,
            status: FindingStatus::PotentiallyNonCompliant,
            summary: "action or subject could not be canonicalized for this aligned pair"
                .to_string(),
            metadata,
        };
    }

    // Rule 3: explicit prohibition vs declaration.
    if prohibits(fp) && !prohibits(tp) {
        metadata.insert("fp_view".to_string(), json!(fp.view.uri()));
        metadata.insert("tp_view".to_string(), json!(tp.view.uri()));
        return RuleOutcome {
            finding_type: FindingType::InconsistentRequirement,
            status: FindingStatus::PotentiallyNonCompliant,
            summary: "first party prohibits this operation but the third party declares it"
                .to_string(),
            metadata,
        };
    }

    // Rule 4: third-party purposes outside the first party's closure.
    let fp_purposes: Vec<&str> = fp.purposes.iter().filter_map(|p| p.uri()).collect();
    let excess: Vec<&str> = tp
        .purposes
        .iter()
        .filter_map(|p| p.uri())
        .filter(|tp_purpose| !index.purpose_in_closure(tp_purpose, fp_purposes.iter().copied()))
        .collect();
    if !excess.is_empty() {
        metadata.insert("excess_purposes".to_string(), json!(excess));
        metadata.insert("fp_purposes".to_string(), json!(fp_purposes));
        return RuleOutcome {
            finding_type: FindingType::PurposeMismatch,
            status: FindingStatus::PotentiallyNonCompliant,
            summary: format!(
                "third party declares purposes outside the disclosed scope: {}",
                excess.join(", ")
            ),
            metadata,
        };
    }

    // Rule 5: declared legal bases differ.
    let fp_basis = fp.legal_basis.as_ref().and_then(|f| f.uri());
    let tp_basis = tp.legal_basis.as_ref().and_then(|f| f.uri());
    if let (Some(fp_basis), Some(tp_basis)) = (fp_basis, tp_basis) {
        if fp_basis != tp_basis {
            metadata.insert("fp_basis".to_string(), json!(fp_basis));
            metadata.insert("tp_basis".to_string(), json!(tp_basis));
            return RuleOutcome {
                finding_type: FindingType::ConditionMismatch,
                status: FindingStatus::PotentiallyNonCompliant,
                summary: format!("declared legal bases differ ({fp_basis} vs {tp_basis})"),
                metadata,
            };
        }
    }

    // Rule 6: nothing fired — the pair is consistent.
    RuleOutcome {
        finding_type: FindingType::SatisfiedRequirement,
        status: FindingStatus::Consistent,
        summary: "third-party operation is consistent with the first-party disclosure".to_string(),
        metadata,
    }
}

/// Apply the rule cascade to every aligned pair and route each candidate
/// finding through the verifier.
pub fn find_mismatches(
    aligned: &[AlignedPair],
    fp_ops: &[NormalizedOperation],
    tp_ops: &[NormalizedOperation],
    index: &HierarchyIndex,
    verifier: &dyn FindingVerifier,
    ids: &mut IdSequence,
) -> Vec<ComplianceFinding> {
    let fp_by_id: HashMap<&str, &NormalizedOperation> =
        fp_ops.iter().map(|op| (op.op_id.as_str(), op)).collect();
    let tp_by_id: HashMap<&str, &NormalizedOperation> =
        tp_ops.iter().map(|op| (op.op_id.as_str(), op)).collect();

    let mut findings = Vec::new();
    for pair in aligned {
        let (Some(fp), Some(tp)) = (
            fp_by_id.get(pair.fp_op_id.as_str()).copied(),
            tp_by_id.get(pair.tp_op_id.as_str()).copied(),
        ) else {
            tracing::warn!(
                "aligned pair references unknown operation ({} / {}); skipped",
                pair.fp_op_id,
                pair.tp_op_id
            );
            continue;
        };

        // Rule 1 precondition: without evidence from both sides there is
        // nothing to cite, so there is no finding to make.
        if fp.evidence_spans.is_empty() || tp.evidence_spans.is_empty() {
            tracing::debug!(
                "pair {} / {} lacks evidence spans; skipped",
                pair.fp_op_id,
                pair.tp_op_id
            );
            continue;
        }

        let outcome = apply_cascade(fp, tp, index);
        let mut finding = ComplianceFinding {
            finding_id: ids.next_id(),
            finding_type: outcome.finding_type,
            status: outcome.status,
            summary: outcome.summary,
            fp_op_id: Some(fp.op_id.clone()),
            tp_op_id: Some(tp.op_id.clone()),
            fp_evidence: fp.evidence_spans.clone(),
            tp_evidence: tp.evidence_spans.clone(),
            metadata: outcome.metadata,
        };

        let decision = verifier.verify(&finding);
        if decision.decision == Verdict::NotConfirmed {
            tracing::debug!(
                "{} ({}) dropped by verifier: {}",
                finding.finding_id,
                finding.finding_type,
                decision.rationale
            );
            continue;
        }
        finding.metadata.insert(
            "verification".to_string(),
            json!({
                "decision": decision.decision,
                "rationale": decision.rationale,
            }),
        );
        findings.push(finding);
    }

    findings
}
