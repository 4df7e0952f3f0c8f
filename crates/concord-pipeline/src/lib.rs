//! # concord-pipeline
//!
//! Orchestrates one disclosure-consistency run end-to-end:
//!
//! normalize → validate → (gate) → align → detect → report
//!
//! The blocking gate is the pipeline's one hard rule: if validation
//! reports any error-level issue, alignment and mismatch detection are
//! skipped entirely and the run reports zero findings with
//! `blocking_errors = true` — the pipeline never reasons over known-bad
//! data.
//!
//! Reporting renders the run's ordered issue and finding lists without
//! reinterpreting them.

pub mod config;
pub mod error;
pub mod report;
pub mod run;

pub use config::{PipelineConfig, ReasoningConfig};
pub use error::PipelineError;
pub use report::{build_human_report, build_machine_report, build_run_summary, MachineReport, RunSummary};
pub use run::{load_operations, run_comparison, RunOutcome};
