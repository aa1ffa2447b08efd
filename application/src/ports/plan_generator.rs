//! Plan generator port
//!
//! The collaborator that turns a goal plus the tool catalog into a candidate
//! [`Plan`]. The plan it returns is unchecked; the planner validates it.

use async_trait::async_trait;
use std::collections::BTreeMap;
use stepwise_domain::{Message, Plan, ToolDefinition};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanGeneratorError {
    /// The backing service could not be reached or refused the request
    #[error("plan generator unavailable: {0}")]
    Unavailable(String),

    /// A response arrived but no plan could be read from it
    #[error("malformed plan: {0}")]
    Malformed(String),
}

/// Everything a generator may use to build a plan
#[derive(Debug, Clone)]
pub struct PlanRequest<'a> {
    pub goal: &'a str,
    pub constraints: &'a BTreeMap<String, String>,
    /// Registered tools, in registration order
    pub catalog: Vec<&'a ToolDefinition>,
    /// Earlier messages of the session, oldest first
    pub history: &'a [Message],
}

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &PlanRequest<'_>) -> Result<Plan, PlanGeneratorError>;
}
