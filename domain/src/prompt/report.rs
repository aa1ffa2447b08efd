//! Prompt templates for report synthesis

use crate::report::entities::ExecutionReport;

/// Templates for turning an execution report into a narrative answer
pub struct ReportPromptTemplate;

impl ReportPromptTemplate {
    pub fn system() -> &'static str {
        r#"You are an assistant writing the final answer for a user.
You receive the user's goal, the plan that was executed, and the result of every step.
Combine the successful results into a clear, well-structured answer to the goal.
Some steps may have failed or been skipped. Say briefly which information is missing
and work around it. Never invent results for failed steps."#
    }

    pub fn user(goal: &str, report: &ExecutionReport) -> String {
        let plan = serde_json::to_string_pretty(report.plan()).unwrap_or_default();
        let results = serde_json::to_string_pretty(report.results()).unwrap_or_default();

        format!(
            r#"## Goal

{goal}

## Plan

{plan}

## Step Results ({success}/{total} succeeded)

{results}

Write the final answer now."#,
            success = report.success_count(),
            total = report.total_count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::entities::{Plan, PlanStep};
    use crate::report::entities::{SkippedStepPolicy, StepResult};
    use crate::tool::value_objects::ToolExecutionError;
    use std::time::Duration;

    #[test]
    fn test_user_includes_failures() {
        let step_ok = PlanStep::new("Weather", "get_weather_forecast");
        let step_bad = PlanStep::new("Lookup", "doesNotExist");
        let plan = Plan::new("trip").with_step(step_ok.clone()).with_step(step_bad.clone());
        let report = ExecutionReport::new(
            plan,
            vec![
                StepResult::succeeded(&step_ok, "sunny", Duration::ZERO),
                StepResult::failed(
                    &step_bad,
                    ToolExecutionError::UnknownTool("doesNotExist".into()),
                    Duration::ZERO,
                ),
            ],
            SkippedStepPolicy::CountInTotal,
        );

        let prompt = ReportPromptTemplate::user("trip", &report);
        assert!(prompt.contains("(1/2 succeeded)"));
        assert!(prompt.contains("\"result\": \"sunny\""));
        assert!(prompt.contains("unknown tool: doesNotExist"));
    }
}
