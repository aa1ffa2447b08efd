//! Console output formatter for run results

use colored::Colorize;
use serde_json::json;
use stepwise_application::EngineOutcome;
use stepwise_domain::{StepOutcome, StepResult, ToolRegistry};

/// Formats engine outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the plan, every step result and the answer
    pub fn format(outcome: &EngineOutcome) -> String {
        let report = &outcome.report;
        let mut output = String::new();

        output.push_str(&Self::header("Stepwise Results"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Goal:".cyan().bold(), report.goal()));
        for (key, value) in &report.plan().parameters {
            output.push_str(&format!("  {} {}\n", format!("{}:", key).dimmed(), value));
        }
        if outcome.used_default_plan {
            output.push_str(&format!(
                "{}\n",
                "Generated plan unavailable; ran the default plan".yellow()
            ));
        }

        output.push_str(&Self::section_header(&format!(
            "Steps ({}/{} succeeded, {:.1}%)",
            report.success_count(),
            report.total_count(),
            report.success_rate() * 100.0
        )));
        if report.results().is_empty() {
            output.push_str(&format!("{}\n", "(empty plan)".dimmed()));
        }
        for (i, result) in report.results().iter().enumerate() {
            output.push_str(&Self::format_step(i + 1, result));
        }

        let title = if outcome.degraded {
            "Raw Report"
        } else {
            "Answer"
        };
        output.push_str(&Self::section_header(title));
        output.push_str(&format!("\n{}\n", outcome.answer));

        output.push_str(&Self::footer());
        output
    }

    /// Answer only
    pub fn format_answer(outcome: &EngineOutcome) -> String {
        format!("{}\n", outcome.answer)
    }

    pub fn format_json(outcome: &EngineOutcome) -> String {
        let value = json!({
            "goal": outcome.report.goal(),
            "answer": outcome.answer,
            "degraded": outcome.degraded,
            "used_default_plan": outcome.used_default_plan,
            "report": outcome.report,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Tool catalog for `--list-tools` and `/tools`
    pub fn format_tools(registry: &ToolRegistry) -> String {
        let mut output = format!("{} ({})\n", "Tools".cyan().bold(), registry.len());

        for tool in registry.describe_all() {
            output.push_str(&format!("\n  {} - {}\n", tool.name.bold(), tool.description));
            for param in &tool.parameters {
                let optional = if param.required { "" } else { ", optional" };
                output.push_str(&format!(
                    "      {} ({}{}): {}\n",
                    param.name, param.param_type, optional, param.description
                ));
            }
        }

        output
    }

    fn format_step(index: usize, result: &StepResult) -> String {
        let (marker, detail) = match &result.outcome {
            StepOutcome::Succeeded { result } => ("✓".green(), Self::indent(result, "     ")),
            StepOutcome::Failed { error } => {
                ("✗".red(), format!("     {}", format!("error: {}", error).red()))
            }
            StepOutcome::Skipped => ("-".dimmed(), format!("     {}", "skipped".dimmed())),
        };

        format!(
            "\n{} {}. {} {} {}\n{}\n",
            marker,
            index,
            result.step_name.bold(),
            format!("[{}]", result.tool_name).dimmed(),
            format!("{}ms", result.duration.as_millis()).dimmed(),
            detail
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use stepwise_domain::{
        ExecutionReport, ParamType, Plan, PlanStep, SkippedStepPolicy, ToolDefinition,
        ToolDescriptor, ToolExecutionError, ToolParameter,
    };

    fn outcome(degraded: bool) -> EngineOutcome {
        let weather = PlanStep::new("Get weather", "get_weather_forecast");
        let hotels = PlanStep::new("Find hotels", "search_accommodation");
        let plan = Plan::new("Trip to Beijing")
            .with_parameter("budget", "5000")
            .with_step(weather.clone())
            .with_step(hotels.clone());
        let report = ExecutionReport::new(
            plan,
            vec![
                StepResult::succeeded(&weather, "sunny\n18-25°C", Duration::from_millis(12)),
                StepResult::failed(
                    &hotels,
                    ToolExecutionError::UnknownTool("search_accommodation".to_string()),
                    Duration::ZERO,
                ),
            ],
            SkippedStepPolicy::CountInTotal,
        );
        EngineOutcome {
            answer: "Bring sunglasses.".to_string(),
            report,
            degraded,
            used_default_plan: false,
        }
    }

    #[test]
    fn test_format_full_lists_steps_and_answer() {
        let output = ConsoleFormatter::format(&outcome(false));
        assert!(output.contains("Trip to Beijing"));
        assert!(output.contains("1/2 succeeded, 50.0%"));
        assert!(output.contains("     sunny\n     18-25°C"));
        assert!(output.contains("unknown tool: search_accommodation"));
        assert!(output.contains("Bring sunglasses."));
    }

    #[test]
    fn test_format_full_marks_degraded_answer() {
        let output = ConsoleFormatter::format(&outcome(true));
        assert!(output.contains("Raw Report"));
    }

    #[test]
    fn test_format_answer_only() {
        assert_eq!(
            ConsoleFormatter::format_answer(&outcome(false)),
            "Bring sunglasses.\n"
        );
    }

    #[test]
    fn test_format_json() {
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&outcome(true))).unwrap();
        assert_eq!(value["goal"], "Trip to Beijing");
        assert_eq!(value["degraded"], true);
        assert_eq!(value["report"]["success_count"], 1);
        assert_eq!(value["report"]["results"][1]["status"], "failed");
        assert_eq!(value["report"]["results"][1]["error_kind"], "unknown_tool");
    }

    #[test]
    fn test_format_tools() {
        let registry = stepwise_domain::ToolRegistry::new()
            .with_tool(ToolDescriptor::from_fn(
                ToolDefinition::new("echo", "Echo the input").with_parameter(
                    ToolParameter::new("text", ParamType::String, "Text to echo").optional(),
                ),
                |args| Ok(args.get_str("text").unwrap_or_default().to_string()),
            ))
            .unwrap();

        let output = ConsoleFormatter::format_tools(&registry);
        assert!(output.contains("Echo the input"));
        assert!(output.contains("text (string, optional): Text to echo"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
