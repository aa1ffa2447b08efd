//! Prompt templates for plan generation

use crate::session::entities::{Message, Role};
use crate::tool::entities::ToolDefinition;
use std::collections::BTreeMap;

/// Templates for asking a model to produce a plan
pub struct PlanPromptTemplate;

impl PlanPromptTemplate {
    /// Render the tool catalog, one tool per block:
    ///
    /// ```text
    /// - get_weather_forecast: Weather forecast for a city
    ///   params: city (string): City name; days (integer, optional): Days ahead
    /// ```
    pub fn format_catalog(catalog: &[&ToolDefinition]) -> String {
        catalog
            .iter()
            .map(|tool| {
                let params = tool
                    .parameters
                    .iter()
                    .map(|p| {
                        let optional = if p.required { "" } else { ", optional" };
                        format!("{} ({}{}): {}", p.name, p.param_type, optional, p.description)
                    })
                    .collect::<Vec<_>>();

                if params.is_empty() {
                    format!("- {}: {}\n  params: none", tool.name, tool.description)
                } else {
                    format!(
                        "- {}: {}\n  params: {}",
                        tool.name,
                        tool.description,
                        params.join("; ")
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn system(catalog: &[&ToolDefinition]) -> String {
        format!(
            r#"You are a planner. Break the user's goal into an ordered list of tool calls.

## Available Tools

{catalog}

## Rules

- Use only the tools listed above, with exactly the parameter names they declare.
- Supply every parameter not marked optional.
- Parameters must be literal values. A step cannot use the output of an earlier step.
- Put goal-level constraints (budget, duration, preferences, ...) in the top-level "parameters".

## Output Format

Respond with a single JSON object in a ```json block:

```json
{{
  "goal": "short restatement of the goal",
  "parameters": {{"constraint": "value"}},
  "steps": [
    {{
      "step_name": "Human readable label",
      "tool_name": "tool_name",
      "parameters": {{"param": "value"}},
      "description": "Why this step is needed"
    }}
  ]
}}
```"#,
            catalog = Self::format_catalog(catalog)
        )
    }

    pub fn user(goal: &str, constraints: &BTreeMap<String, String>, history: &[Message]) -> String {
        let mut prompt = String::new();

        if !history.is_empty() {
            prompt.push_str("## Earlier in this conversation\n\n");
            for message in history {
                let who = match message.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                };
                prompt.push_str(&format!("{}: {}\n", who, message.content));
            }
            prompt.push('\n');
        }

        prompt.push_str(&format!("## Goal\n\n{}\n", goal));

        if !constraints.is_empty() {
            prompt.push_str("\n## Constraints\n\n");
            for (key, value) in constraints {
                prompt.push_str(&format!("- {}: {}\n", key, value));
            }
        }

        prompt.push_str("\nProduce the plan now.");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParamType, ToolParameter};

    #[test]
    fn test_format_catalog() {
        let weather = ToolDefinition::new("get_weather_forecast", "Weather forecast")
            .with_parameter(ToolParameter::new("city", ParamType::String, "City name"))
            .with_parameter(ToolParameter::new("days", ParamType::Integer, "Days ahead").optional());
        let noop = ToolDefinition::new("noop", "Does nothing");

        let text = PlanPromptTemplate::format_catalog(&[&weather, &noop]);
        assert_eq!(
            text,
            "- get_weather_forecast: Weather forecast\n  params: city (string): City name; days (integer, optional): Days ahead\n- noop: Does nothing\n  params: none"
        );
    }

    #[test]
    fn test_system_embeds_catalog() {
        let echo = ToolDefinition::new("echo", "Echo text");
        let prompt = PlanPromptTemplate::system(&[&echo]);
        assert!(prompt.contains("- echo: Echo text"));
        assert!(prompt.contains("\"steps\": ["));
    }

    #[test]
    fn test_user_with_history_and_constraints() {
        let mut constraints = BTreeMap::new();
        constraints.insert("budget".to_string(), "5000".to_string());
        let history = vec![Message::user("Trip to Paris"), Message::assistant("Here it is")];

        let prompt = PlanPromptTemplate::user("Now Rome", &constraints, &history);
        assert!(prompt.contains("User: Trip to Paris"));
        assert!(prompt.contains("Assistant: Here it is"));
        assert!(prompt.contains("## Goal\n\nNow Rome"));
        assert!(prompt.contains("- budget: 5000"));
    }
}
