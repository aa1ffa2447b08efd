//! Plan validation against a tool registry
//!
//! [`validate`] checks every step of a candidate [`Plan`] before anything
//! runs, so a caller can reject a bad plan before any tool side effects
//! happen. All problems are collected; checking does not stop at the first.
//!
//! Per step:
//!
//! 1. `tool_name` must resolve in the registry (otherwise the step's
//!    parameters are not checked further)
//! 2. every supplied parameter must be declared by the tool
//! 3. every supplied value must convert to the declared [`ParamType`]
//! 4. every required parameter must be supplied
//!
//! On success, parameter values are replaced by their converted form.

use super::entities::{Plan, ValidatedPlan};
use crate::tool::entities::{ParamType, ToolArgs};
use crate::tool::registry::ToolRegistry;
use thiserror::Error;

/// What is wrong with a step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("unknown parameter '{parameter}' for tool '{tool}'")]
    UnknownParameter { tool: String, parameter: String },

    #[error("missing required parameter '{parameter}' for tool '{tool}'")]
    MissingParameter { tool: String, parameter: String },

    #[error("parameter '{parameter}' expects {expected}, got {found}")]
    TypeMismatch {
        parameter: String,
        expected: ParamType,
        found: String,
    },
}

/// A validation problem tied to the step it was found in
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step {step_index} ('{step_name}'): {issue}")]
pub struct ValidationError {
    /// 1-based position of the step in the plan
    pub step_index: usize,
    pub step_name: String,
    pub issue: ValidationIssue,
}

/// Validate `plan` against `registry`, collecting every problem.
pub fn validate(plan: Plan, registry: &ToolRegistry) -> Result<ValidatedPlan, Vec<ValidationError>> {
    let mut plan = plan;
    let mut errors = Vec::new();

    for (position, step) in plan.steps.iter_mut().enumerate() {
        let mut push = |issue: ValidationIssue| {
            errors.push(ValidationError {
                step_index: position + 1,
                step_name: step.step_name.clone(),
                issue,
            })
        };

        let Some(descriptor) = registry.lookup(&step.tool_name) else {
            push(ValidationIssue::UnknownTool(step.tool_name.clone()));
            continue;
        };
        let definition = descriptor.definition();

        let mut normalized = ToolArgs::new();
        for (name, value) in step.parameters.iter() {
            let Some(declared) = definition.parameter(name) else {
                push(ValidationIssue::UnknownParameter {
                    tool: definition.name.clone(),
                    parameter: name.clone(),
                });
                continue;
            };

            match declared.param_type.coerce(value) {
                Some(converted) => normalized.insert(name.clone(), converted),
                None => push(ValidationIssue::TypeMismatch {
                    parameter: name.clone(),
                    expected: declared.param_type,
                    found: value.to_string(),
                }),
            }
        }

        for declared in definition.parameters.iter().filter(|p| p.required) {
            if !step.parameters.contains(&declared.name) {
                push(ValidationIssue::MissingParameter {
                    tool: definition.name.clone(),
                    parameter: declared.name.clone(),
                });
            }
        }

        step.parameters = normalized;
    }

    if errors.is_empty() {
        Ok(ValidatedPlan::new(plan))
    } else {
        Err(errors)
    }
}
