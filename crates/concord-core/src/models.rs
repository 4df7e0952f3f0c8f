// models.rs — Data contracts shared across the pipeline stages.
//
// Extraction produces OperationCandidate, normalization turns it into
// NormalizedOperation, validation attaches ValidationIssue, alignment
// produces AlignedPair, and mismatch detection emits ComplianceFinding.
// A finding is never constructed without evidence spans from both the
// first-party and the third-party policy.

use serde::{Deserialize, Serialize};

// ── Evidence ──

/// A verbatim quoted substring of a source policy document, with location
/// provenance. This is the unit of evidence every finding must cite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextSpan {
    /// Which policy document the quote comes from.
    pub policy_id: String,
    /// Section identifier within the document.
    pub section_id: String,
    /// Human-readable section path (e.g., "Privacy Policy > Sharing").
    pub section_path: String,
    /// Character offset where the quote starts.
    pub start_char: usize,
    /// Character offset where the quote ends.
    pub end_char: usize,
    /// The verbatim quoted text.
    pub quote: String,
}

/// A raw, unnormalized slot value as extracted from policy text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabeledSpan {
    /// Free-text label (e.g., "Device Identifiers").
    pub label: String,
    /// Optional supporting quote for this specific slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

// ── Operations ──

/// A declared data-processing operation as produced by the extraction
/// collaborator, before any label has been canonicalized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationCandidate {
    /// Opaque operation ID, unique within a run.
    pub op_id: String,
    /// The extracted statement this operation was read from.
    pub statement_id: String,
    /// What is done (e.g., "share", "collect").
    pub action: Option<LabeledSpan>,
    /// What data the operation concerns.
    pub subject: Option<LabeledSpan>,
    /// Modality of the statement (e.g., "may", "do not").
    pub view: Option<LabeledSpan>,
    /// Zero or more declared purposes.
    #[serde(default)]
    pub purposes: Vec<LabeledSpan>,
    /// Who data is disclosed to (disclosure-type actions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<LabeledSpan>,
    /// Who data is received from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<LabeledSpan>,
    /// Declared legal basis (e.g., consent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_basis: Option<LabeledSpan>,
    /// Manner of processing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manner: Option<LabeledSpan>,
    /// Temporal constraint (e.g., retention window).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<LabeledSpan>,
    /// Geographic constraint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localisation: Option<LabeledSpan>,
    /// Verbatim citations backing this operation. Extraction guarantees
    /// at least one; the core skips (never throws on) violations.
    #[serde(default)]
    pub evidence_spans: Vec<TextSpan>,
}

/// Why a label resolved (or failed to resolve) to a canonical URI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeReason {
    /// The label was empty or absent.
    Missing,
    /// Exact match against a known label or alternate label.
    ExactLabel,
    /// Bidirectional substring containment against a known label.
    SubstringMatch,
    /// A pluggable chooser picked among enumerated candidates.
    Chooser,
    /// No resolution path succeeded.
    Unknown,
}

impl std::fmt::Display for NormalizeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeReason::Missing => write!(f, "missing"),
            NormalizeReason::ExactLabel => write!(f, "exact_label"),
            NormalizeReason::SubstringMatch => write!(f, "substring_match"),
            NormalizeReason::Chooser => write!(f, "chooser"),
            NormalizeReason::Unknown => write!(f, "unknown"),
        }
    }
}

/// One canonicalized slot value. A `None` URI means "could not be
/// canonicalized" — callers must treat it as *unknown*, never as
/// "absent/negative".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedField {
    /// The label as extracted, preserved for audit.
    pub raw_label: Option<String>,
    /// Canonical ontology URI (`facet:term`), if resolution succeeded.
    pub normalized_uri: Option<String>,
    /// Fixed per-resolution-path confidence in [0, 1].
    pub confidence: f64,
    /// Which resolution path produced this result.
    pub reason: NormalizeReason,
}

impl NormalizedField {
    /// Whether this field carries a canonical URI.
    pub fn is_resolved(&self) -> bool {
        self.normalized_uri.is_some()
    }

    /// The canonical URI as a borrowed str, if resolved.
    pub fn uri(&self) -> Option<&str> {
        self.normalized_uri.as_deref()
    }
}

/// An operation after every slot has been run through the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedOperation {
    pub op_id: String,
    pub statement_id: String,
    /// Taken from the first evidence span; `"unknown"` when no span exists.
    pub policy_id: String,
    pub action: NormalizedField,
    pub subject: NormalizedField,
    pub view: NormalizedField,
    /// Normalized independently, preserving order and duplicates.
    pub purposes: Vec<NormalizedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<NormalizedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<NormalizedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_basis: Option<NormalizedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manner: Option<NormalizedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<NormalizedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localisation: Option<NormalizedField>,
    pub evidence_spans: Vec<TextSpan>,
}

// ── Validation ──

/// Severity of a validation issue. Errors block the reasoning stage for
/// the whole run; warnings are surfaced for audit and do not suppress
/// reasoning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueLevel {
    Error,
    Warning,
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueLevel::Error => write!(f, "error"),
            IssueLevel::Warning => write!(f, "warning"),
        }
    }
}

/// A structural defect (or advisory note) about one normalized operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub issue_id: String,
    pub level: IssueLevel,
    pub message: String,
    pub op_id: String,
    pub policy_id: String,
}

// ── Alignment ──

/// A committed 1:1 match between one first-party and one third-party
/// operation for this run. A third-party operation is the target of at
/// most one pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignedPair {
    pub fp_op_id: String,
    pub tp_op_id: String,
    /// Additive multi-signal score that committed this pair.
    pub score: f64,
    /// Human-readable descriptions of every contributing signal.
    pub reasons: Vec<String>,
}

// ── Findings ──

/// Which rule in the mismatch cascade produced a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    /// Action or subject failed to normalize on either side.
    UnderSpecifiedRequirement,
    /// The first party prohibits what the third party declares.
    InconsistentRequirement,
    /// Third-party purposes outside the first party's disclosed scope.
    PurposeMismatch,
    /// Declared legal bases differ.
    ConditionMismatch,
    /// No rule fired — the pair is consistent.
    SatisfiedRequirement,
}

impl std::fmt::Display for FindingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingType::UnderSpecifiedRequirement => write!(f, "under_specified_requirement"),
            FindingType::InconsistentRequirement => write!(f, "inconsistent_requirement"),
            FindingType::PurposeMismatch => write!(f, "purpose_mismatch"),
            FindingType::ConditionMismatch => write!(f, "condition_mismatch"),
            FindingType::SatisfiedRequirement => write!(f, "satisfied_requirement"),
        }
    }
}

/// Compliance status attached to a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Consistent,
    PotentiallyNonCompliant,
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingStatus::Consistent => write!(f, "consistent"),
            FindingStatus::PotentiallyNonCompliant => write!(f, "potentially_non_compliant"),
        }
    }
}

/// A reasoned, evidence-backed conclusion about one aligned pair.
///
/// Invariant: `fp_evidence` and `tp_evidence` are both non-empty. The
/// detector enforces this structurally by skipping pairs it cannot cite.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceFinding {
    pub finding_id: String,
    pub finding_type: FindingType,
    pub status: FindingStatus,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fp_op_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tp_op_id: Option<String>,
    pub fp_evidence: Vec<TextSpan>,
    pub tp_evidence: Vec<TextSpan>,
    /// Rule-specific details (excess purposes, verifier rationale, ...).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

// ── Verification ──

/// The verifier capability's verdict on one finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The finding is directly entailed by the cited evidence.
    Confirmed,
    /// The evidence does not support the claim — the finding is dropped.
    NotConfirmed,
    /// The evidence is too thin to decide either way.
    UnderSpecified,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Confirmed => write!(f, "CONFIRMED"),
            Verdict::NotConfirmed => write!(f, "NOT_CONFIRMED"),
            Verdict::UnderSpecified => write!(f, "UNDER_SPECIFIED"),
        }
    }
}

/// Returned by the pluggable verifier capability; gates whether a
/// finding is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationDecision {
    pub decision: Verdict,
    pub rationale: String,
}

impl VerificationDecision {
    pub fn confirmed(rationale: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Confirmed,
            rationale: rationale.into(),
        }
    }

    pub fn not_confirmed(rationale: impl Into<String>) -> Self {
        Self {
            decision: Verdict::NotConfirmed,
            rationale: rationale.into(),
        }
    }

    pub fn under_specified(rationale: impl Into<String>) -> Self {
        Self {
            decision: Verdict::UnderSpecified,
            rationale: rationale.into(),
        }
    }
}
