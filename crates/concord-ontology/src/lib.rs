//! # concord-ontology
//!
//! Canonical vocabulary loading and the subsumption hierarchy for the
//! Concord disclosure-consistency pipeline.
//!
//! The [`Vocabulary`] holds ontology terms for six facets (action,
//! subject/data-category, purpose, view, recipient, legal basis) plus an
//! open context facet set. [`HierarchyIndex`] combines the vocabulary's
//! parent chains with explicit rule edges from [`CompatibilityRules`] and
//! answers the two queries everything downstream is built on:
//!
//! - `is_subsumed(parent, child)` — broader-than, reflexive, cycle-safe
//! - `is_context_compatible(a, b)` — null-tolerant, default-compatible
//!
//! Both structures are built once per run from human-maintained files and
//! never mutated afterwards.

pub mod error;
pub mod hierarchy;
pub mod loader;

pub use error::ConfigError;
pub use hierarchy::HierarchyIndex;
pub use loader::{
    load_rules, load_vocab, CompatibilityRules, ContextRule, VocabTerm, Vocabulary,
};
