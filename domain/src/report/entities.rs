//! Execution report entities

use crate::plan::entities::{Plan, PlanStep};
use crate::tool::value_objects::ToolExecutionError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Write as _;
use std::time::Duration;

/// How a single step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded { result: String },
    Failed { error: ToolExecutionError },
    /// Not attempted because the run was cancelled first
    Skipped,
}

impl StepOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutcome::Succeeded { .. } => "succeeded",
            StepOutcome::Failed { .. } => "failed",
            StepOutcome::Skipped => "skipped",
        }
    }
}

/// Outcome of one plan step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step_name: String,
    pub tool_name: String,
    pub outcome: StepOutcome,
    /// Wall-clock time spent in the tool (zero when skipped)
    pub duration: Duration,
}

impl StepResult {
    pub fn succeeded(step: &PlanStep, result: impl Into<String>, duration: Duration) -> Self {
        Self::from_step(step, StepOutcome::Succeeded { result: result.into() }, duration)
    }

    pub fn failed(step: &PlanStep, error: ToolExecutionError, duration: Duration) -> Self {
        Self::from_step(step, StepOutcome::Failed { error }, duration)
    }

    pub fn skipped(step: &PlanStep) -> Self {
        Self::from_step(step, StepOutcome::Skipped, Duration::ZERO)
    }

    fn from_step(step: &PlanStep, outcome: StepOutcome, duration: Duration) -> Self {
        Self {
            step_name: step.step_name.clone(),
            tool_name: step.tool_name.clone(),
            outcome,
            duration,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Succeeded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, StepOutcome::Skipped)
    }

    /// Tool output; present iff the step succeeded
    pub fn result(&self) -> Option<&str> {
        match &self.outcome {
            StepOutcome::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ToolExecutionError> {
        match &self.outcome {
            StepOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Failure message; present iff the step failed
    pub fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    pub fn status(&self) -> &'static str {
        self.outcome.as_str()
    }
}

impl Serialize for StepResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("StepResult", 8)?;
        s.serialize_field("step_name", &self.step_name)?;
        s.serialize_field("tool_name", &self.tool_name)?;
        s.serialize_field("status", self.status())?;
        s.serialize_field("success", &self.success())?;
        s.serialize_field("result", &self.result())?;
        s.serialize_field("error_kind", &self.error().map(|e| e.kind()))?;
        s.serialize_field("error_message", &self.error_message())?;
        s.serialize_field("duration_ms", &(self.duration.as_millis() as u64))?;
        s.end()
    }
}

/// Whether skipped steps count toward `total_count`.
///
/// Skipped steps are never successes either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkippedStepPolicy {
    #[default]
    CountInTotal,
    ExcludeFromTotal,
}

/// Aggregated outcome of executing a plan.
///
/// `results` has the same length and order as `plan.steps`. Counts are
/// computed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    plan: Plan,
    results: Vec<StepResult>,
    success_count: usize,
    total_count: usize,
    skipped_count: usize,
    success_rate: f64,
}

impl ExecutionReport {
    pub fn new(plan: Plan, results: Vec<StepResult>, policy: SkippedStepPolicy) -> Self {
        let success_count = results.iter().filter(|r| r.success()).count();
        let skipped_count = results.iter().filter(|r| r.is_skipped()).count();
        let total_count = match policy {
            SkippedStepPolicy::CountInTotal => results.len(),
            SkippedStepPolicy::ExcludeFromTotal => results.len() - skipped_count,
        };
        let success_rate = if total_count > 0 {
            success_count as f64 / total_count as f64
        } else {
            0.0
        };

        Self {
            plan,
            results,
            success_count,
            total_count,
            skipped_count,
            success_rate,
        }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn goal(&self) -> &str {
        &self.plan.goal
    }

    pub fn results(&self) -> &[StepResult] {
        &self.results
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Failed { .. }))
            .count()
    }

    /// `success_count / total_count`, or `0.0` for an empty total
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// Plain-text rendering, used as the answer when no narrative is available
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if !self.plan.goal.is_empty() {
            let _ = writeln!(out, "Goal: {}", self.plan.goal);
        }
        if !self.plan.parameters.is_empty() {
            let constraints = self
                .plan
                .parameters
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "Constraints: {}", constraints);
        }
        let _ = writeln!(
            out,
            "Steps: {}/{} succeeded ({:.1}%)",
            self.success_count,
            self.total_count,
            self.success_rate * 100.0
        );
        if self.skipped_count > 0 {
            let _ = writeln!(out, "Skipped: {}", self.skipped_count);
        }

        for (i, result) in self.results.iter().enumerate() {
            let _ = writeln!(
                out,
                "\n{}. [{}] {} ({})",
                i + 1,
                result.status(),
                result.step_name,
                result.tool_name
            );
            match &result.outcome {
                StepOutcome::Succeeded { result } => {
                    for line in result.lines() {
                        let _ = writeln!(out, "   {}", line);
                    }
                }
                StepOutcome::Failed { error } => {
                    let _ = writeln!(out, "   error: {}", error);
                }
                StepOutcome::Skipped => {}
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str) -> PlanStep {
        PlanStep::new(name, "tool")
    }

    fn mixed_results() -> Vec<StepResult> {
        vec![
            StepResult::succeeded(&step("a"), "ok", Duration::from_millis(5)),
            StepResult::failed(
                &step("b"),
                ToolExecutionError::UnknownTool("doesNotExist".into()),
                Duration::ZERO,
            ),
            StepResult::skipped(&step("c")),
        ]
    }

    #[test]
    fn test_step_result_accessors() {
        let results = mixed_results();
        assert!(results[0].success());
        assert_eq!(results[0].result(), Some("ok"));
        assert_eq!(results[0].error_message(), None);

        assert!(!results[1].success());
        assert_eq!(results[1].result(), None);
        assert_eq!(
            results[1].error_message().as_deref(),
            Some("unknown tool: doesNotExist")
        );

        assert!(results[2].is_skipped());
        assert_eq!(results[2].result(), None);
        assert_eq!(results[2].error_message(), None);
    }

    #[test]
    fn test_counts_with_skipped_in_total() {
        let report = ExecutionReport::new(
            Plan::new("goal"),
            mixed_results(),
            SkippedStepPolicy::CountInTotal,
        );
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.total_count(), 3);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!((report.success_rate() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_counts_with_skipped_excluded() {
        let report = ExecutionReport::new(
            Plan::new("goal"),
            mixed_results(),
            SkippedStepPolicy::ExcludeFromTotal,
        );
        assert_eq!(report.total_count(), 2);
        assert!((report.success_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_report_rate_is_zero() {
        let report = ExecutionReport::new(Plan::new("goal"), vec![], SkippedStepPolicy::default());
        assert_eq!(report.total_count(), 0);
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_serialized_step_record() {
        let value = serde_json::to_value(&mixed_results()[1]).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["success"], false);
        assert!(value["result"].is_null());
        assert_eq!(value["error_kind"], "unknown_tool");
        assert_eq!(value["error_message"], "unknown tool: doesNotExist");
    }

    #[test]
    fn test_render_text_lists_every_step() {
        let report = ExecutionReport::new(
            Plan::new("3 days in Beijing").with_parameter("budget", "5000"),
            mixed_results(),
            SkippedStepPolicy::CountInTotal,
        );
        let text = report.render_text();
        assert!(text.contains("Goal: 3 days in Beijing"));
        assert!(text.contains("Constraints: budget=5000"));
        assert!(text.contains("Steps: 1/3 succeeded (33.3%)"));
        assert!(text.contains("1. [succeeded] a (tool)"));
        assert!(text.contains("error: unknown tool: doesNotExist"));
        assert!(text.contains("3. [skipped] c (tool)"));
    }
}
