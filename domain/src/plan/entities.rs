//! Plan domain entities

use crate::tool::entities::ToolArgs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single planned tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Human label, used for reporting and logging only
    pub step_name: String,
    /// Tool to invoke; checked against the registry at validation time
    pub tool_name: String,
    /// Static arguments decided at plan-generation time
    #[serde(default)]
    pub parameters: ToolArgs,
    /// Informational description
    #[serde(default)]
    pub description: String,
}

impl PlanStep {
    pub fn new(step_name: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            tool_name: tool_name.into(),
            parameters: ToolArgs::new(),
            description: String::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key, value);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An ordered sequence of steps derived from a goal.
///
/// Steps carry only static parameters: a step cannot consume the output of
/// an earlier step. Order is still significant because earlier steps may
/// have real-world effects that later steps were authored around.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// The original natural-language request
    pub goal: String,
    /// Goal-level constraints (budget, duration, ...), carried through as-is
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            parameters: BTreeMap::new(),
            steps: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_step(mut self, step: PlanStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn add_step(&mut self, step: PlanStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A [`Plan`] that passed validation against a tool registry.
///
/// Only [`validate`](super::validation::validate) can construct one, so the
/// executor's signature rules out running an unchecked plan. Step parameters
/// have been normalized to the tools' declared types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedPlan(Plan);

impl ValidatedPlan {
    pub(crate) fn new(plan: Plan) -> Self {
        Self(plan)
    }

    pub fn plan(&self) -> &Plan {
        &self.0
    }

    pub fn goal(&self) -> &str {
        &self.0.goal
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.0.steps
    }

    pub fn into_plan(self) -> Plan {
        self.0
    }
}

impl AsRef<Plan> for ValidatedPlan {
    fn as_ref(&self) -> &Plan {
        &self.0
    }
}
