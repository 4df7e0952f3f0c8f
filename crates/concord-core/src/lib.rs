//! # concord-core
//!
//! Shared data contracts for the Concord disclosure-consistency pipeline.
//!
//! Every stage of the pipeline is bounded and auditable:
//! - extraction output is evidence-first ([`OperationCandidate`] carries
//!   verbatim [`TextSpan`] citations)
//! - normalization preserves raw labels next to canonical URIs
//!   ([`NormalizedField`])
//! - findings carry evidence from *both* policies ([`ComplianceFinding`])
//!
//! All types here are created fresh per run, consumed read-only by the
//! reasoning stages, and discarded after reporting. Nothing is persisted.

pub mod ids;
pub mod models;

// Re-export the main types at the crate root for convenience.
pub use ids::IdSequence;
pub use models::{
    AlignedPair, ComplianceFinding, FindingStatus, FindingType, IssueLevel, LabeledSpan,
    NormalizeReason, NormalizedField, NormalizedOperation, OperationCandidate, TextSpan,
    ValidationIssue, Verdict, VerificationDecision,
};
