//! Execution report domain
//!
//! The executor turns each plan step into a [`StepResult`] and aggregates
//! them into an [`ExecutionReport`], the input to narrative synthesis.

pub mod entities;

pub use entities::{ExecutionReport, SkippedStepPolicy, StepOutcome, StepResult};
