//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types by
//! [`FileConfig::to_engine_config`].

mod execution;
mod llm;
mod logging;

pub use execution::{
    FileExecutionConfig, FilePlanningConfig, FilePlanningFallback, FileReportConfig,
    FileReportFallback, FileSkippedSteps,
};
pub use llm::FileLlmConfig;
pub use logging::FileLoggingConfig;

use crate::tools::travel;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stepwise_application::{EngineConfig, ExecutionOptions, PlanningFallback, SynthesisFallback};
use stepwise_domain::Plan;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("{field} cannot be 0")]
    InvalidTimeout { field: &'static str },

    #[error("llm.model cannot be empty")]
    EmptyModelName,

    #[error("llm.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("llm.temperature must be between 0 and 2, got {0}")]
    InvalidTemperature(f32),

    #[error("planning.default_steps[{0}] has an empty tool_name")]
    EmptyDefaultStepTool(usize),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Chat completions endpoint used for planning and synthesis
    pub llm: FileLlmConfig,
    pub execution: FileExecutionConfig,
    pub planning: FilePlanningConfig,
    pub report: FileReportConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every detected issue.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.llm.model.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if self.llm.base_url.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyBaseUrl);
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            issues.push(ConfigValidationError::InvalidTemperature(self.llm.temperature));
        }
        if self.llm.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout {
                field: "llm.timeout_seconds",
            });
        }
        if self.execution.step_timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout {
                field: "execution.step_timeout_seconds",
            });
        }
        for (i, step) in self.planning.default_steps.iter().enumerate() {
            if step.tool_name.trim().is_empty() {
                issues.push(ConfigValidationError::EmptyDefaultStepTool(i));
            }
        }

        issues
    }

    /// The default plan run by the `default_plan` planning fallback
    pub fn default_plan(&self) -> Plan {
        if self.planning.default_steps.is_empty() {
            return travel::default_plan();
        }
        self.planning
            .default_steps
            .iter()
            .cloned()
            .fold(Plan::new(""), Plan::with_step)
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        let execution = ExecutionOptions::default()
            .with_per_step_timeout(Some(Duration::from_secs(
                self.execution.step_timeout_seconds,
            )))
            .with_skipped_policy(self.execution.skipped_steps.into());

        let planning_fallback = match self.planning.fallback {
            FilePlanningFallback::Surface => PlanningFallback::Surface,
            FilePlanningFallback::DefaultPlan => PlanningFallback::DefaultPlan(self.default_plan()),
        };

        let synthesis_fallback = match self.report.fallback {
            FileReportFallback::RawReport => SynthesisFallback::RawReport,
            FileReportFallback::Surface => SynthesisFallback::Surface,
        };

        EngineConfig::default()
            .with_execution(execution)
            .with_planning_fallback(planning_fallback)
            .with_synthesis_fallback(synthesis_fallback)
    }
}
