// align.rs — Cross-policy operation alignment.
//
// Greedy, deterministic, one pass over first-party operations in their
// given order. For each, every not-yet-used third-party operation is
// scored and the single best candidate kept, ties broken by
// first-encountered. A third-party operation, once chosen, is removed
// from further consideration: allowing one third-party operation to
// satisfy multiple first-party claims would understate compliance gaps.
//
// Score components (additive, each independently gated on applicability):
//   subject     1.0 exact / 0.8 subsumption
//   action      1.0 same coarse family
//   purposes    0.6 × overlap ratio
//   recipient   0.4 when the first party's recipient is the third
//               party's declared source
//   context     ±0.2/0.3 per declared localisation/temporal pair, in
//               strict mode only
//
// The default commit threshold is 1.25: subject + action alone is not
// enough, a purpose or recipient signal must also contribute.

use serde::{Deserialize, Serialize};

use concord_core::{AlignedPair, NormalizedField, NormalizedOperation};
use concord_ontology::HierarchyIndex;

/// Default minimum committed score.
pub const DEFAULT_MIN_SCORE: f64 = 1.25;

/// Aligner tuning knobs, normally taken from the pipeline config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignerConfig {
    /// Score declared localisation/temporal context pairs.
    pub strict_context_compat: bool,
    /// Minimum score for a pair to be committed.
    pub min_score: f64,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            strict_context_compat: false,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Coarse action family. URIs not in the table act as their own family,
/// so exact-URI equality still scores.
fn action_family(uri: &str) -> &str {
    match uri.rsplit(':').next().unwrap_or(uri) {
        "share" | "disclose" | "collect" | "receive" => "share_receive",
        "use" | "process" => "process",
        _ => uri,
    }
}

fn optional_uri(field: &Option<NormalizedField>) -> Option<&str> {
    field.as_ref().and_then(NormalizedField::uri)
}

fn score_pair(
    fp: &NormalizedOperation,
    tp: &NormalizedOperation,
    index: &HierarchyIndex,
    config: &AlignerConfig,
) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // Subject compatibility. Unnormalized on either side scores nothing:
    // null is unknown, not a wildcard.
    if let (Some(fp_subject), Some(tp_subject)) = (fp.subject.uri(), tp.subject.uri()) {
        if fp_subject == tp_subject {
            score += 1.0;
            reasons.push(format!("subject exact match ({fp_subject})"));
        } else if index.is_subsumed(fp_subject, tp_subject)
            || index.is_subsumed(tp_subject, fp_subject)
        {
            score += 0.8;
            reasons.push(format!("subject subsumption ({fp_subject} ~ {tp_subject})"));
        }
    }

    // Action family compatibility.
    if let (Some(fp_action), Some(tp_action)) = (fp.action.uri(), tp.action.uri()) {
        let family = action_family(fp_action);
        if family == action_family(tp_action) {
            score += 1.0;
            reasons.push(format!("action family ({family})"));
        }
    }

    // Purpose overlap: pairs related by subsumption in either direction,
    // over the smaller purpose list.
    let fp_purposes: Vec<&str> = fp.purposes.iter().filter_map(NormalizedField::uri).collect();
    let tp_purposes: Vec<&str> = tp.purposes.iter().filter_map(NormalizedField::uri).collect();
    if !fp_purposes.is_empty() && !tp_purposes.is_empty() {
        let related: usize = fp_purposes
            .iter()
            .map(|fp_purpose| {
                tp_purposes
                    .iter()
                    .filter(|tp_purpose| {
                        index.is_subsumed(fp_purpose, tp_purpose)
                            || index.is_subsumed(tp_purpose, fp_purpose)
                    })
                    .count()
            })
            .sum();
        if related > 0 {
            let denominator = fp_purposes.len().min(tp_purposes.len());
            score += 0.6 * related as f64 / denominator as f64;
            reasons.push(format!("purpose overlap ({related}/{denominator})"));
        }
    }

    // Recipient/source loop: "who do you share with" vs "who do you
    // receive from".
    if let (Some(fp_recipient), Some(tp_source)) =
        (optional_uri(&fp.recipient), optional_uri(&tp.source))
    {
        if fp_recipient == tp_source {
            score += 0.4;
            reasons.push(format!("recipient/source loop ({fp_recipient})"));
        }
    }

    // Strict context mode: only scored when both sides declare a value.
    if config.strict_context_compat {
        let context_slots = [
            ("localisation", &fp.localisation, &tp.localisation),
            ("temporal", &fp.temporal, &tp.temporal),
        ];
        for (name, fp_slot, tp_slot) in context_slots {
            if let (Some(fp_ctx), Some(tp_ctx)) = (optional_uri(fp_slot), optional_uri(tp_slot)) {
                if index.is_context_compatible(Some(fp_ctx), Some(tp_ctx)) {
                    score += 0.2;
                    reasons.push(format!("{name} compatible"));
                } else {
                    score -= 0.3;
                    reasons.push(format!("{name} mismatch"));
                }
            }
        }
    }

    (score, reasons)
}

/// Match first-party operations to third-party operations 1:1.
///
/// First-party operations with no qualifying match produce no pair and
/// are implicitly "undeclared by third party".
pub fn align_operations(
    fp_ops: &[NormalizedOperation],
    tp_ops: &[NormalizedOperation],
    index: &HierarchyIndex,
    config: &AlignerConfig,
) -> Vec<AlignedPair> {
    let mut used = vec![false; tp_ops.len()];
    let mut pairs = Vec::new();

    for fp in fp_ops {
        let mut best: Option<(usize, f64, Vec<String>)> = None;
        for (i, tp) in tp_ops.iter().enumerate() {
            if used[i] {
                continue;
            }
            let (score, reasons) = score_pair(fp, tp, index, config);
            // Strictly-greater keeps the first-encountered candidate on
            // ties, in the stable iteration order of tp_ops.
            if best.as_ref().map_or(true, |(_, best_score, _)| score > *best_score) {
                best = Some((i, score, reasons));
            }
        }

        match best {
            Some((i, score, reasons)) if score >= config.min_score => {
                used[i] = true;
                pairs.push(AlignedPair {
                    fp_op_id: fp.op_id.clone(),
                    tp_op_id: tp_ops[i].op_id.clone(),
                    score,
                    reasons,
                });
            }
            _ => {
                tracing::debug!("no qualifying third-party match for {}", fp.op_id);
            }
        }
    }

    pairs
}
