//! # concord-engine
//!
//! The reasoning core of the Concord pipeline: free-text labels in,
//! evidence-backed compliance findings out.
//!
//! Four stages, each a pure function over immutable inputs:
//!
//! 1. [`Normalizer`] — maps extracted labels to canonical ontology URIs
//! 2. [`validate::validate_operations`] — shape constraints; any
//!    error-level issue blocks the reasoning stage for the whole run
//! 3. [`align::align_operations`] — greedy, deterministic 1:1 matching
//!    of first-party to third-party operations
//! 4. [`detect::find_mismatches`] — ordered rule cascade over aligned
//!    pairs, every finding routed through the verifier capability
//!
//! ## Key invariants
//!
//! - **Dual evidence**: no finding is emitted without at least one
//!   evidence span from each side; pairs that cannot be cited are
//!   skipped, not guessed at.
//! - **Determinism**: tie-breaks follow explicit iteration order; the
//!   same inputs always produce the same findings with the default
//!   structural verifier.
//! - **Null is unknown**: an unresolved URI never counts as evidence of
//!   absence.

pub mod align;
pub mod detect;
pub mod normalize;
pub mod validate;
pub mod verify;

pub use align::{align_operations, AlignerConfig};
pub use detect::find_mismatches;
pub use normalize::{Facet, LabelChooser, Normalizer};
pub use validate::{has_blocking_errors, validate_operations};
pub use verify::{
    AbsorbingVerifier, DeadlineVerifier, FallibleFindingVerifier, FindingVerifier,
    StructuralVerifier, VerifierError,
};
