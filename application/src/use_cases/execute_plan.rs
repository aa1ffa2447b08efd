//! Execute Plan use case (the Executor).
//!
//! Runs every step of a [`ValidatedPlan`] in order against the tool registry
//! and aggregates the outcomes into an [`ExecutionReport`].
//!
//! Step-level problems never abort the run:
//!
//! | Situation | Recorded as |
//! |-----------|-------------|
//! | tool returned output | `Succeeded` |
//! | tool reported an error, or panicked | `Failed(Internal)` |
//! | tool name not registered | `Failed(UnknownTool)` |
//! | deadline exceeded | `Failed(Timeout)` |
//! | cancelled before the step started | `Skipped` (with every later step) |
//!
//! A step that already started is allowed to finish after cancellation.

use crate::config::ExecutionOptions;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::ExecutionProgress;
use crate::use_cases::shared::is_cancelled;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use stepwise_domain::util::preview;
use stepwise_domain::{
    ExecutionReport, PlanStep, StepResult, ToolExecutionError, ToolRegistry, ValidatedPlan,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct Executor {
    registry: Arc<ToolRegistry>,
    options: ExecutionOptions,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Executor {
    pub fn new(registry: Arc<ToolRegistry>, options: ExecutionOptions) -> Self {
        Self {
            registry,
            options,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Run `plan` to completion (or cancellation) and report on every step.
    pub async fn execute(
        &self,
        plan: ValidatedPlan,
        cancellation_token: &Option<CancellationToken>,
        progress: &dyn ExecutionProgress,
    ) -> ExecutionReport {
        let steps = plan.steps();
        let total = steps.len();
        let mut results = Vec::with_capacity(total);

        info!(steps = total, "Executing plan");

        for (position, step) in steps.iter().enumerate() {
            if is_cancelled(cancellation_token) {
                let remaining = &steps[position..];
                warn!(
                    skipped = remaining.len(),
                    "Cancellation requested, skipping remaining steps"
                );
                results.extend(remaining.iter().map(StepResult::skipped));
                progress.on_steps_skipped(remaining.len());
                break;
            }

            let index = position + 1;
            progress.on_step_start(index, total, step);
            debug!(step = index, tool = %step.tool_name, "Invoking tool");

            let result = self.run_step(step).await;

            match result.error() {
                None => info!(
                    step = index,
                    tool = %step.tool_name,
                    elapsed_ms = result.duration.as_millis() as u64,
                    "Step succeeded: {}",
                    preview(result.result().unwrap_or_default(), 80)
                ),
                Some(error) => warn!(
                    step = index,
                    tool = %step.tool_name,
                    elapsed_ms = result.duration.as_millis() as u64,
                    "Step failed: {}",
                    error
                ),
            }

            self.conversation_logger.log(ConversationEvent::new(
                "step_completed",
                serde_json::json!({
                    "index": index,
                    "step": &result,
                }),
            ));

            progress.on_step_complete(index, total, &result);
            results.push(result);
        }

        let report = ExecutionReport::new(plan.into_plan(), results, self.options.skipped_policy);
        info!(
            success = report.success_count(),
            total = report.total_count(),
            skipped = report.skipped_count(),
            "Plan execution finished"
        );
        report
    }

    async fn run_step(&self, step: &PlanStep) -> StepResult {
        let started = Instant::now();

        let call = AssertUnwindSafe(self.registry.invoke(&step.tool_name, &step.parameters))
            .catch_unwind()
            .map(|outcome| outcome.unwrap_or_else(|panic| Err(panic_error(panic))));

        let outcome = match self.options.per_step_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ToolExecutionError::Timeout(limit)),
            },
            None => call.await,
        };

        let elapsed = started.elapsed();
        match outcome {
            Ok(output) => StepResult::succeeded(step, output, elapsed),
            Err(error) => StepResult::failed(step, error, elapsed),
        }
    }
}

fn panic_error(panic: Box<dyn std::any::Any + Send>) -> ToolExecutionError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ToolExecutionError::Internal(format!("tool panicked: {}", message))
}
