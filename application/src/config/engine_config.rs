//! Engine configuration: degradation and execution policy.
//!
//! [`EngineConfig`] groups the knobs that decide how the engine reacts when
//! a collaborator fails, plus the executor's per-step limits. These are
//! application-layer concerns; the file/env representation lives in
//! infrastructure and converts into this type.

use std::time::Duration;
use stepwise_domain::{Plan, SkippedStepPolicy};

/// What to do when no valid plan can be generated
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PlanningFallback {
    /// Return `EngineError::PlanningFailed`
    #[default]
    Surface,
    /// Validate and run this plan instead. If it does not validate either,
    /// the original planning error is returned.
    DefaultPlan(Plan),
}

/// What to do when the narrative cannot be produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SynthesisFallback {
    /// Answer with the rendered execution report, marked degraded
    #[default]
    RawReport,
    /// Return `EngineError::SynthesisFailed`
    Surface,
}

/// Executor limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Deadline for a single tool invocation; `None` waits indefinitely
    pub per_step_timeout: Option<Duration>,
    pub skipped_policy: SkippedStepPolicy,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            per_step_timeout: Some(Duration::from_secs(30)),
            skipped_policy: SkippedStepPolicy::default(),
        }
    }
}

impl ExecutionOptions {
    pub fn with_per_step_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.per_step_timeout = timeout;
        self
    }

    pub fn with_skipped_policy(mut self, policy: SkippedStepPolicy) -> Self {
        self.skipped_policy = policy;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub execution: ExecutionOptions,
    pub planning_fallback: PlanningFallback,
    pub synthesis_fallback: SynthesisFallback,
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_execution(mut self, execution: ExecutionOptions) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_planning_fallback(mut self, fallback: PlanningFallback) -> Self {
        self.planning_fallback = fallback;
        self
    }

    pub fn with_synthesis_fallback(mut self, fallback: SynthesisFallback) -> Self {
        self.synthesis_fallback = fallback;
        self
    }
}
