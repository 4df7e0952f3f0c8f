// verify.rs — The finding-verifier capability boundary.
//
// The detector never implements semantic entailment checking; it calls
// out through the FindingVerifier trait. The default implementation is
// purely structural — it validates *citability*, not semantics — so the
// pipeline stays fully deterministic with no network. A semantic
// verifier (e.g. an LLM round-trip) plugs in behind the same trait,
// wrapped in the adapters below so its failure modes never reach the
// detector as errors.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use concord_core::{ComplianceFinding, VerificationDecision};

/// The sole call-out boundary of the reasoning core: one finding in,
/// one decision out.
pub trait FindingVerifier {
    fn verify(&self, finding: &ComplianceFinding) -> VerificationDecision;
}

/// Default verifier: requires non-empty evidence text on both sides and
/// auto-confirms everything else.
pub struct StructuralVerifier;

impl FindingVerifier for StructuralVerifier {
    fn verify(&self, finding: &ComplianceFinding) -> VerificationDecision {
        let has_text = |spans: &[concord_core::TextSpan]| {
            spans.iter().any(|span| !span.quote.trim().is_empty())
        };
        if !has_text(&finding.fp_evidence) || !has_text(&finding.tp_evidence) {
            return VerificationDecision::under_specified(
                "one side lacks concrete evidence text",
            );
        }
        VerificationDecision::confirmed("evidence text present on both sides")
    }
}

/// Failure modes a remote/semantic verifier can surface.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("verifier timed out after {0:?}")]
    Timeout(Duration),

    #[error("verifier transport failed: {0}")]
    Transport(String),

    #[error("verifier returned a malformed response: {0}")]
    MalformedResponse(String),
}

/// A verifier whose calls can fail (network, parsing, ...).
pub trait FallibleFindingVerifier {
    fn try_verify(&self, finding: &ComplianceFinding)
        -> Result<VerificationDecision, VerifierError>;
}

/// Adapter absorbing verifier failures into UNDER_SPECIFIED decisions.
/// The core's contract is total over well-formed input: a broken
/// verifier degrades the decision, it never aborts the run.
pub struct AbsorbingVerifier<V> {
    inner: V,
}

impl<V> AbsorbingVerifier<V> {
    pub fn new(inner: V) -> Self {
        Self { inner }
    }
}

impl<V: FallibleFindingVerifier> FindingVerifier for AbsorbingVerifier<V> {
    fn verify(&self, finding: &ComplianceFinding) -> VerificationDecision {
        match self.inner.try_verify(finding) {
            Ok(decision) => decision,
            Err(err) => {
                tracing::warn!("verifier failure absorbed for {}: {}", finding.finding_id, err);
                VerificationDecision::under_specified(format!("verifier unavailable: {err}"))
            }
        }
    }
}

/// Adapter bounding the wall-clock cost of one verification.
///
/// Findings are independent, but a stuck verification must not block
/// the run indefinitely: the wrapped call runs on a worker thread and a
/// timeout degrades the decision to UNDER_SPECIFIED. A timed-out worker
/// is abandoned, not joined — its eventual result is discarded.
pub struct DeadlineVerifier {
    inner: Arc<dyn FindingVerifier + Send + Sync>,
    timeout: Duration,
}

impl DeadlineVerifier {
    pub fn new(inner: Arc<dyn FindingVerifier + Send + Sync>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

impl FindingVerifier for DeadlineVerifier {
    fn verify(&self, finding: &ComplianceFinding) -> VerificationDecision {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let finding = finding.clone();
        thread::spawn(move || {
            let _ = tx.send(inner.verify(&finding));
        });

        match rx.recv_timeout(self.timeout) {
            Ok(decision) => decision,
            Err(_) => {
                tracing::warn!("verification timed out after {:?}", self.timeout);
                VerificationDecision::under_specified(format!(
                    "verification timed out after {:?}",
                    self.timeout
                ))
            }
        }
    }
}
