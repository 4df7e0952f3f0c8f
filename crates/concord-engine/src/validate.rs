// validate.rs — Shape constraints over normalized operations.
//
// A lightweight SHACL-like pass. Per operation:
//   - missing canonical action or subject  → error (run-blocking)
//   - missing canonical view               → warning
//   - share/disclose without a recipient   → warning (under-specified)
//   - URI prefix outside the allow-list    → warning
//
// Errors block the whole reasoning stage: a run with any error-level
// issue reports zero findings rather than reasoning over known-bad data.
// Warnings ride along to the report and suppress nothing.

use concord_core::{IdSequence, IssueLevel, NormalizedField, NormalizedOperation, ValidationIssue};

/// Ontology spaces a normalized URI may live in. An out-of-list prefix
/// is a warning, never an error — unknown ontology extensions should not
/// halt a run.
pub const ALLOWED_PREFIXES: &[&str] = &[
    "action",
    "subject",
    "data",
    "purpose",
    "view",
    "recipient",
    "basis",
    "context",
];

fn prefix(uri: &str) -> Option<&str> {
    if uri.contains(':') {
        uri.split(':').next()
    } else {
        None
    }
}

/// Apply shape constraints to every operation, drawing issue IDs from
/// the caller's per-run sequence.
pub fn validate_operations(
    ops: &[NormalizedOperation],
    ids: &mut IdSequence,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for op in ops {
        let mut push = |level: IssueLevel, message: String, issues: &mut Vec<ValidationIssue>| {
            issues.push(ValidationIssue {
                issue_id: ids.next_id(),
                level,
                message,
                op_id: op.op_id.clone(),
                policy_id: op.policy_id.clone(),
            });
        };

        if !op.action.is_resolved() {
            push(
                IssueLevel::Error,
                "operation missing canonical action".to_string(),
                &mut issues,
            );
        }
        if !op.subject.is_resolved() {
            push(
                IssueLevel::Error,
                "operation missing canonical subject".to_string(),
                &mut issues,
            );
        }
        if !op.view.is_resolved() {
            push(
                IssueLevel::Warning,
                "operation missing modality/view".to_string(),
                &mut issues,
            );
        }

        // Recipient is only required for disclosure-type actions, not
        // for retention/deletion.
        let action_uri = op.action.uri().unwrap_or("");
        if action_uri.ends_with("share") || action_uri.ends_with("disclose") {
            let recipient_resolved = op
                .recipient
                .as_ref()
                .is_some_and(NormalizedField::is_resolved);
            if !recipient_resolved {
                push(
                    IssueLevel::Warning,
                    "share/disclose operation missing recipient; treat as under-specified"
                        .to_string(),
                    &mut issues,
                );
            }
        }

        // Prefix sanity checks (allowed ontology spaces).
        let optional_uri =
            |field: &Option<NormalizedField>| field.as_ref().and_then(|f| f.normalized_uri.clone());
        let mut uris: Vec<Option<String>> = vec![
            op.action.normalized_uri.clone(),
            op.subject.normalized_uri.clone(),
            op.view.normalized_uri.clone(),
        ];
        uris.extend(op.purposes.iter().map(|p| p.normalized_uri.clone()));
        uris.extend([
            optional_uri(&op.recipient),
            optional_uri(&op.legal_basis),
            optional_uri(&op.manner),
            optional_uri(&op.temporal),
            optional_uri(&op.localisation),
            optional_uri(&op.source),
        ]);

        for uri in uris.into_iter().flatten() {
            match prefix(&uri) {
                Some(pf) if ALLOWED_PREFIXES.contains(&pf) => {}
                Some(pf) => push(
                    IssueLevel::Warning,
                    format!("URI prefix `{pf}` not in allowed set"),
                    &mut issues,
                ),
                None => push(
                    IssueLevel::Warning,
                    format!("URI `{uri}` has no facet prefix"),
                    &mut issues,
                ),
            }
        }
    }

    issues
}

/// True iff at least one issue is error-level. The pipeline gates the
/// entire reasoning stage on this.
pub fn has_blocking_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|issue| issue.level == IssueLevel::Error)
}
