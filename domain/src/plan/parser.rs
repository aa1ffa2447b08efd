//! Plan parsing from model responses.
//!
//! Plan generators backed by a language model return text. [`parse_plan`]
//! pulls a JSON plan out of that text, trying in order:
//!
//! 1. fenced code blocks (` ```json `, ` ```plan ` or bare ` ``` `)
//! 2. the whole response as JSON
//! 3. the outermost `{ ... }` span inside surrounding prose
//!
//! `<think>...</think>` sections emitted by reasoning models are removed
//! first. The first candidate that parses into a plan wins.

use super::entities::{Plan, PlanStep};
use crate::tool::entities::ToolArgs;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanParseError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("invalid plan JSON: {0}")]
    InvalidJson(String),

    #[error("plan JSON must be an object")]
    NotAnObject,

    #[error("plan is missing the 'steps' array")]
    MissingSteps,

    #[error("step {0} is not an object")]
    StepNotAnObject(usize),

    #[error("step {0} is missing 'tool_name'")]
    MissingToolName(usize),

    #[error("step {0} 'parameters' must be an object")]
    InvalidParameters(usize),
}

/// Parse a plan from model response text.
pub fn parse_plan(response: &str) -> Result<Plan, PlanParseError> {
    let cleaned = strip_think_blocks(response);
    let mut last_error = None;

    for candidate in json_candidates(&cleaned) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(json) => match parse_plan_json(&json) {
                Ok(plan) => return Ok(plan),
                Err(e) => last_error = Some(e),
            },
            Err(e) => {
                if last_error.is_none() {
                    last_error = Some(PlanParseError::InvalidJson(e.to_string()));
                }
            }
        }
    }

    Err(last_error.unwrap_or(PlanParseError::NoJson))
}

/// Parse a plan from an already-decoded JSON value.
///
/// `steps` is required but may be empty. Each step needs `tool_name`
/// (`tool` is accepted as an alias); `step_name` (or `name`) defaults to
/// `"Step N"`; `parameters` (or `args`) must be an object. `null` argument
/// values are dropped. Goal-level `parameters` values are stringified.
pub fn parse_plan_json(json: &Value) -> Result<Plan, PlanParseError> {
    let object = json.as_object().ok_or(PlanParseError::NotAnObject)?;

    let goal = object
        .get("goal")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let mut plan = Plan::new(goal);

    if let Some(params) = object.get("parameters").and_then(|v| v.as_object()) {
        plan.parameters = params
            .iter()
            .filter_map(|(k, v)| stringify_constraint(v).map(|s| (k.clone(), s)))
            .collect::<BTreeMap<_, _>>();
    }

    let steps = object
        .get("steps")
        .and_then(|v| v.as_array())
        .ok_or(PlanParseError::MissingSteps)?;

    for (position, step_json) in steps.iter().enumerate() {
        let index = position + 1;
        let step_obj = step_json
            .as_object()
            .ok_or(PlanParseError::StepNotAnObject(index))?;

        let tool_name = first_str(step_obj, &["tool_name", "tool"])
            .filter(|s| !s.trim().is_empty())
            .ok_or(PlanParseError::MissingToolName(index))?;

        let step_name = first_str(step_obj, &["step_name", "name"])
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Step {}", index));

        let mut step = PlanStep::new(step_name, tool_name.trim());

        if let Some(description) = step_obj.get("description").and_then(|v| v.as_str()) {
            step = step.with_description(description);
        }

        match step_obj.get("parameters").or_else(|| step_obj.get("args")) {
            None | Some(Value::Null) => {}
            Some(Value::Object(args)) => {
                step.parameters = args
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<ToolArgs>();
            }
            Some(_) => return Err(PlanParseError::InvalidParameters(index)),
        }

        plan.add_step(step);
    }

    Ok(plan)
}

fn first_str<'a>(object: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(|v| v.as_str()))
}

fn stringify_constraint(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(stringify_constraint)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

fn strip_think_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Candidate JSON snippets, most specific first
fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::new();

    let mut in_block = false;
    let mut block_start = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if !in_block && trimmed.starts_with("```") {
            let lang = trimmed.trim_start_matches('`').trim();
            if lang.is_empty() || lang == "json" || lang == "plan" {
                in_block = true;
                block_start = offset + line.len();
            }
        } else if in_block && trimmed == "```" {
            in_block = false;
            candidates.push(text[block_start..offset].trim());
        }
        offset += line.len();
    }

    let whole = text.trim();
    if whole.starts_with('{') {
        candidates.push(whole);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            candidates.push(&text[start..=end]);
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_fenced_json_block() {
        let response = r#"
Here is the plan:

```json
{
  "goal": "3 days in Beijing",
  "parameters": {"budget": 5000, "preferences": ["history", "food"]},
  "steps": [
    {
      "step_name": "Get weather",
      "tool_name": "get_weather_forecast",
      "parameters": {"city": "Beijing", "days": "3"},
      "description": "Check the weather"
    },
    {
      "step_name": "Find hotels",
      "tool_name": "search_accommodation",
      "parameters": {"city": "Beijing", "budget_per_night": 300}
    }
  ]
}
```
"#;

        let plan = parse_plan(response).unwrap();
        assert_eq!(plan.goal, "3 days in Beijing");
        assert_eq!(plan.parameters.get("budget").unwrap(), "5000");
        assert_eq!(plan.parameters.get("preferences").unwrap(), "history, food");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].tool_name, "get_weather_forecast");
        assert_eq!(plan.steps[0].parameters.get("days"), Some(&json!("3")));
        assert_eq!(plan.steps[1].parameters.get("budget_per_night"), Some(&json!(300)));
        assert_eq!(plan.steps[0].description, "Check the weather");
    }

    #[test]
    fn test_parse_raw_json() {
        let response = r#"{"steps": [{"tool_name": "echo", "parameters": {"text": "hi"}}]}"#;
        let plan = parse_plan(response).unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].step_name, "Step 1");
        assert!(plan.goal.is_empty());
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let response = r#"Sure! {"steps": [{"step_name": "Echo", "tool_name": "echo"}]} Let me know."#;
        let plan = parse_plan(response).unwrap();
        assert_eq!(plan.steps[0].step_name, "Echo");
    }

    #[test]
    fn test_parse_strips_think_blocks() {
        let response = "<think>maybe {\"steps\": 1}</think>\n{\"steps\": []}";
        let plan = parse_plan(response).unwrap();
        assert!(plan.steps.is_empty());
    }

    #[test]
    fn test_parse_empty_steps_is_a_plan() {
        let plan = parse_plan(r#"{"goal": "nothing", "steps": []}"#).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plain_text_is_an_error() {
        assert_eq!(
            parse_plan("I'd be happy to help you plan a trip!"),
            Err(PlanParseError::NoJson)
        );
    }

    #[test]
    fn test_missing_steps_is_an_error() {
        assert_eq!(
            parse_plan(r#"{"goal": "trip"}"#),
            Err(PlanParseError::MissingSteps)
        );
    }

    #[test]
    fn test_missing_tool_name_is_an_error() {
        let response = r#"{"steps": [{"tool_name": "a"}, {"step_name": "b"}]}"#;
        assert_eq!(parse_plan(response), Err(PlanParseError::MissingToolName(2)));
    }

    #[test]
    fn test_broken_json_reports_invalid_json() {
        let result = parse_plan("```json\n{\"steps\": [\n```");
        assert!(matches!(result, Err(PlanParseError::InvalidJson(_))));
    }

    #[test]
    fn test_aliases_and_null_args() {
        let json = json!({
            "steps": [
                {"name": "Weather", "tool": "get_weather_forecast", "args": {"city": "Paris", "days": null}}
            ]
        });
        let plan = parse_plan_json(&json).unwrap();
        assert_eq!(plan.steps[0].step_name, "Weather");
        assert_eq!(plan.steps[0].tool_name, "get_weather_forecast");
        assert_eq!(plan.steps[0].parameters.len(), 1);
    }

    #[test]
    fn test_non_object_parameters_rejected() {
        let json = json!({"steps": [{"tool_name": "echo", "parameters": ["x"]}]});
        assert_eq!(parse_plan_json(&json), Err(PlanParseError::InvalidParameters(1)));
    }
}
