//! Execution and fallback policy from TOML (`[execution]`, `[planning]`,
//! `[report]` sections)

use serde::{Deserialize, Serialize};
use stepwise_domain::{PlanStep, SkippedStepPolicy};

/// How steps skipped by cancellation are counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSkippedSteps {
    /// Part of `total_count`, never a success
    #[default]
    Count,
    /// Left out of `total_count`
    Exclude,
}

impl From<FileSkippedSteps> for SkippedStepPolicy {
    fn from(value: FileSkippedSteps) -> Self {
        match value {
            FileSkippedSteps::Count => SkippedStepPolicy::CountInTotal,
            FileSkippedSteps::Exclude => SkippedStepPolicy::ExcludeFromTotal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Deadline per tool invocation
    pub step_timeout_seconds: u64,
    pub skipped_steps: FileSkippedSteps,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            step_timeout_seconds: 30,
            skipped_steps: FileSkippedSteps::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilePlanningFallback {
    #[default]
    Surface,
    DefaultPlan,
}

/// `[planning]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlanningConfig {
    pub fallback: FilePlanningFallback,
    /// Steps of the default plan; the built-in travel plan when empty
    pub default_steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileReportFallback {
    #[default]
    RawReport,
    Surface,
}

/// `[report]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReportConfig {
    pub fallback: FileReportFallback,
}
