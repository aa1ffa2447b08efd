//! Progress notification port
//!
//! Defines the interface for reporting progress while a goal is planned,
//! executed and summarized.

use stepwise_domain::{PlanStep, StepResult, ValidatedPlan};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer. Every method has a no-op
/// default so an implementation only overrides what it displays.
pub trait ExecutionProgress: Send + Sync {
    /// Called before the plan generator is contacted
    fn on_planning_start(&self, _goal: &str) {}

    /// Called once a plan passed validation and is about to run
    fn on_plan_ready(&self, _plan: &ValidatedPlan) {}

    /// Called when the generated plan was rejected and the configured
    /// default plan is used instead
    fn on_fallback_plan(&self, _reason: &str) {}

    /// Called before step `index` (1-based) of `total` is invoked
    fn on_step_start(&self, _index: usize, _total: usize, _step: &PlanStep) {}

    fn on_step_complete(&self, _index: usize, _total: usize, _result: &StepResult) {}

    /// Called once when cancellation causes the remaining steps to be skipped
    fn on_steps_skipped(&self, _count: usize) {}

    fn on_synthesis_start(&self) {}

    /// Called with each piece of the answer while it is being written
    fn on_synthesis_chunk(&self, _chunk: &str) {}

    fn on_synthesis_complete(&self, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ExecutionProgress for NoProgress {}
