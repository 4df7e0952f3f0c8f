// normalize.rs — Label canonicalization against the loaded vocabulary.
//
// Resolution order for one label, first hit wins, each path with a
// fixed confidence and reason code:
//
// 1. empty/absent label          → confidence 0.0,  "missing"
// 2. exact canonicalized match   → confidence 1.0,  "exact_label"
// 3. bidirectional substring     → confidence 0.82, "substring_match"
// 4. pluggable chooser pick      → confidence 0.7,  "chooser"
// 5. nothing                     → confidence 0.0,  "unknown"
//
// Candidate sets are facet-restricted by URI prefix so a label cannot
// be mapped across facets. The substring fallback takes the first match
// in vocabulary iteration order; this is a known precision/recall
// trade-off, not a tie-break guarantee.

use concord_core::{NormalizeReason, NormalizedField, NormalizedOperation, OperationCandidate};
use concord_ontology::Vocabulary;

const EXACT_CONFIDENCE: f64 = 1.0;
const SUBSTRING_CONFIDENCE: f64 = 0.82;
const CHOOSER_CONFIDENCE: f64 = 0.7;

/// A capability that picks a canonical URI for a label the deterministic
/// paths could not resolve. The pick must be among the enumerated
/// candidates or it is ignored.
///
/// Implementations may be backed by anything from a lookup table to an
/// LLM round-trip; the engine only sees this one method.
pub trait LabelChooser {
    fn choose(&self, label: &str, candidates: &[String]) -> Option<String>;
}

/// Which vocabulary facet a slot normalizes against, expressed as the
/// URI prefixes that facet accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Action,
    Subject,
    View,
    Purpose,
    Recipient,
    LegalBasis,
    Context,
}

impl Facet {
    fn prefixes(&self) -> &'static [&'static str] {
        match self {
            Facet::Action => &["action"],
            // Subjects and data categories share a facet.
            Facet::Subject => &["subject", "data"],
            Facet::View => &["view"],
            Facet::Purpose => &["purpose"],
            Facet::Recipient => &["recipient"],
            Facet::LegalBasis => &["basis"],
            Facet::Context => &["context"],
        }
    }

    fn accepts(&self, uri: &str) -> bool {
        let prefix = uri.split(':').next().unwrap_or(uri);
        self.prefixes().contains(&prefix)
    }
}

/// Lowercase, collapse every non-alphanumeric run to a single space,
/// trim. "Device-Identifiers " and "device identifiers" canonicalize
/// identically.
fn canonical_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    let mut pending_space = false;
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    key
}

/// The canonicalized label index: an explicitly ordered sequence of
/// `(key, uri)` entries built in vocabulary iteration order. Ordering is
/// correctness-relevant — "first match wins" for the substring fallback
/// and "last write wins" for exact collisions are both defined over it.
#[derive(Debug, Clone)]
struct LabelIndex {
    entries: Vec<(String, String)>,
}

impl LabelIndex {
    fn from_vocabulary(vocab: &Vocabulary) -> Self {
        let mut entries = Vec::new();
        let mut push = |key: String, uri: &str| {
            if !key.is_empty() {
                entries.push((key, uri.to_string()));
            }
        };
        for term in vocab.iter_terms() {
            push(canonical_key(&term.label), &term.uri);
            for alt in &term.alt_labels {
                push(canonical_key(alt), &term.uri);
            }
            // URI-tail fallback: "subject:device_id" is findable by
            // "device id" even if the label list is incomplete.
            let tail = term.uri.rsplit(':').next().unwrap_or(&term.uri);
            push(canonical_key(tail), &term.uri);
        }
        Self { entries }
    }

    /// Distinct URIs for a facet, first-occurrence order.
    fn candidates(&self, facet: Facet) -> Vec<String> {
        let mut uris: Vec<String> = Vec::new();
        for (_, uri) in &self.entries {
            if facet.accepts(uri) && !uris.contains(uri) {
                uris.push(uri.clone());
            }
        }
        uris
    }
}

/// Maps free-text labels and whole extracted operations onto the
/// canonical vocabulary.
pub struct Normalizer {
    index: LabelIndex,
}

impl Normalizer {
    pub fn new(vocab: &Vocabulary) -> Self {
        Self {
            index: LabelIndex::from_vocabulary(vocab),
        }
    }

    /// Normalize one free-text label against one facet.
    pub fn normalize_label(
        &self,
        label: Option<&str>,
        facet: Facet,
        chooser: Option<&dyn LabelChooser>,
    ) -> NormalizedField {
        let raw_label = label.map(str::to_string);
        let key = match label {
            Some(label) => canonical_key(label),
            None => String::new(),
        };
        if key.is_empty() {
            return NormalizedField {
                raw_label,
                normalized_uri: None,
                confidence: 0.0,
                reason: NormalizeReason::Missing,
            };
        }

        // Exact: the last matching entry wins, reproducing last-write-wins
        // index construction within the facet.
        let mut exact = None;
        for (entry_key, uri) in &self.index.entries {
            if *entry_key == key && facet.accepts(uri) {
                exact = Some(uri.clone());
            }
        }
        if let Some(uri) = exact {
            return NormalizedField {
                raw_label,
                normalized_uri: Some(uri),
                confidence: EXACT_CONFIDENCE,
                reason: NormalizeReason::ExactLabel,
            };
        }

        // Substring containment in either direction, first match in
        // vocabulary iteration order.
        for (entry_key, uri) in &self.index.entries {
            if facet.accepts(uri) && (entry_key.contains(&key) || key.contains(entry_key.as_str()))
            {
                return NormalizedField {
                    raw_label,
                    normalized_uri: Some(uri.clone()),
                    confidence: SUBSTRING_CONFIDENCE,
                    reason: NormalizeReason::SubstringMatch,
                };
            }
        }

        // Chooser: only a pick among the enumerated candidates counts.
        if let (Some(chooser), Some(label)) = (chooser, label) {
            let candidates = self.index.candidates(facet);
            if let Some(pick) = chooser.choose(label, &candidates) {
                if candidates.contains(&pick) {
                    return NormalizedField {
                        raw_label,
                        normalized_uri: Some(pick),
                        confidence: CHOOSER_CONFIDENCE,
                        reason: NormalizeReason::Chooser,
                    };
                }
                tracing::debug!("chooser pick '{}' for '{}' not among candidates; ignored", pick, label);
            }
        }

        NormalizedField {
            raw_label,
            normalized_uri: None,
            confidence: 0.0,
            reason: NormalizeReason::Unknown,
        }
    }

    /// Normalize a whole extracted operation. Purposes normalize
    /// independently, preserving order and duplicates. The owning
    /// policy is read off the first evidence span; an operation with no
    /// spans is tagged `"unknown"` rather than rejected.
    pub fn normalize_operation(
        &self,
        op: &OperationCandidate,
        chooser: Option<&dyn LabelChooser>,
    ) -> NormalizedOperation {
        let policy_id = op
            .evidence_spans
            .first()
            .map(|span| span.policy_id.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let slot = |slot: &Option<concord_core::LabeledSpan>, facet: Facet| {
            self.normalize_label(slot.as_ref().map(|s| s.label.as_str()), facet, chooser)
        };
        let optional_slot = |slot: &Option<concord_core::LabeledSpan>, facet: Facet| {
            slot.as_ref()
                .map(|s| self.normalize_label(Some(&s.label), facet, chooser))
        };

        NormalizedOperation {
            op_id: op.op_id.clone(),
            statement_id: op.statement_id.clone(),
            policy_id,
            action: slot(&op.action, Facet::Action),
            subject: slot(&op.subject, Facet::Subject),
            view: slot(&op.view, Facet::View),
            purposes: op
                .purposes
                .iter()
                .map(|p| self.normalize_label(Some(&p.label), Facet::Purpose, chooser))
                .collect(),
            recipient: optional_slot(&op.recipient, Facet::Recipient),
            source: optional_slot(&op.source, Facet::Recipient),
            legal_basis: optional_slot(&op.legal_basis, Facet::LegalBasis),
            manner: optional_slot(&op.manner, Facet::Context),
            temporal: optional_slot(&op.temporal, Facet::Context),
            localisation: optional_slot(&op.localisation, Facet::Context),
            evidence_spans: op.evidence_spans.clone(),
        }
    }
}
