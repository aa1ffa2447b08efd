//! Create Plan use case (the Planner).
//!
//! Asks the [`PlanGenerator`] for a plan exactly once, then checks it with
//! [`validate`]. Nothing has run when this returns, so a rejected
//! plan has caused no tool side effects.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::plan_generator::{PlanGenerator, PlanGeneratorError, PlanRequest};
use crate::use_cases::shared::{is_cancelled, run_cancellable};
use std::collections::BTreeMap;
use std::sync::Arc;
use stepwise_domain::{Message, ToolRegistry, ValidatedPlan, ValidationError, validate};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while obtaining a plan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanGenerationError {
    #[error("plan generator unavailable: {0}")]
    Unavailable(String),

    #[error("plan generator returned a malformed plan: {0}")]
    Malformed(String),

    #[error("plan failed validation: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("planning cancelled")]
    Cancelled,
}

impl From<PlanGeneratorError> for PlanGenerationError {
    fn from(err: PlanGeneratorError) -> Self {
        match err {
            PlanGeneratorError::Unavailable(msg) => PlanGenerationError::Unavailable(msg),
            PlanGeneratorError::Malformed(msg) => PlanGenerationError::Malformed(msg),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct Planner {
    generator: Arc<dyn PlanGenerator>,
    registry: Arc<ToolRegistry>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Planner {
    pub fn new(generator: Arc<dyn PlanGenerator>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            generator,
            registry,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Produce a validated plan for `goal`.
    ///
    /// A generated plan with an empty goal takes `goal`; caller constraints
    /// fill in any key the generator left out.
    pub async fn plan(
        &self,
        goal: &str,
        constraints: &BTreeMap<String, String>,
        history: &[Message],
        cancellation_token: &Option<CancellationToken>,
    ) -> Result<ValidatedPlan, PlanGenerationError> {
        if is_cancelled(cancellation_token) {
            return Err(PlanGenerationError::Cancelled);
        }

        let request = PlanRequest {
            goal,
            constraints,
            catalog: self.registry.describe_all(),
            history,
        };
        debug!(tools = request.catalog.len(), "Requesting plan");

        let mut plan = run_cancellable(cancellation_token, self.generator.generate(&request))
            .await
            .ok_or(PlanGenerationError::Cancelled)?
            .inspect_err(|e| warn!("Plan generation failed: {}", e))?;

        if plan.goal.trim().is_empty() {
            plan.goal = goal.to_string();
        }
        for (key, value) in constraints {
            plan.parameters
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        self.conversation_logger.log(ConversationEvent::new(
            "plan_generated",
            serde_json::json!({ "plan": &plan }),
        ));

        match validate(plan, &self.registry) {
            Ok(validated) => {
                info!(steps = validated.steps().len(), "Plan validated");
                Ok(validated)
            }
            Err(errors) => {
                for error in &errors {
                    warn!("Plan rejected: {}", error);
                }
                self.conversation_logger.log(ConversationEvent::new(
                    "plan_rejected",
                    serde_json::json!({
                        "errors": errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
                    }),
                ));
                Err(PlanGenerationError::Invalid(errors))
            }
        }
    }
}
