//! Run Engine use case: the goal-to-answer entry point.
//!
//! Composes the three phases:
//!
//! ```text
//! Goal ─▶ Planner ─▶ ValidatedPlan ─▶ Executor ─▶ ExecutionReport ─▶ Reporter ─▶ Answer
//! ```
//!
//! # Degradation
//!
//! | Failure | Default | Configurable alternative |
//! |---------|---------|--------------------------|
//! | no valid plan | `EngineError::PlanningFailed` | run a configured default plan |
//! | no narrative | raw report as a degraded answer | `EngineError::SynthesisFailed` |
//!
//! Cancellation while planning returns `EngineError::Cancelled` before any
//! tool runs. Cancellation while executing skips the remaining steps and
//! answers with the raw report without contacting the synthesizer; the same
//! degraded answer is returned when cancellation interrupts synthesis.

use crate::config::{EngineConfig, PlanningFallback, SynthesisFallback};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::plan_generator::PlanGenerator;
use crate::ports::progress::{ExecutionProgress, NoProgress};
use crate::ports::report_synthesizer::ReportSynthesizer;
use crate::ports::session_store::SessionStore;
use crate::use_cases::create_plan::{PlanGenerationError, Planner};
use crate::use_cases::execute_plan::Executor;
use crate::use_cases::shared::is_cancelled;
use crate::use_cases::summarize_report::{ReportSynthesisError, Reporter};
use std::collections::BTreeMap;
use std::sync::Arc;
use stepwise_domain::util::truncate_str;
use stepwise_domain::{
    ExecutionReport, History, Message, ToolRegistry, ValidatedPlan, validate,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors surfaced to the engine's caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Planning failed: {0}")]
    PlanningFailed(PlanGenerationError),

    #[error("Report synthesis failed: {0}")]
    SynthesisFailed(ReportSynthesisError),

    #[error("Cancelled")]
    Cancelled,
}

/// Input for a single run.
#[derive(Debug, Clone, Default)]
pub struct RunInput {
    pub goal: String,
    /// Goal-level constraints (budget, duration, ...)
    pub constraints: BTreeMap<String, String>,
    /// Earlier messages shown to the plan generator
    pub history: History,
}

impl RunInput {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Default::default()
        }
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    pub fn with_constraints(mut self, constraints: BTreeMap<String, String>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }
}

/// Result of a successful (possibly degraded) run
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub answer: String,
    pub report: ExecutionReport,
    /// `answer` is the rendered report rather than a narrative
    pub degraded: bool,
    /// The configured default plan ran in place of a generated one
    pub used_default_plan: bool,
}

pub struct Engine {
    planner: Planner,
    executor: Executor,
    reporter: Reporter,
    registry: Arc<ToolRegistry>,
    config: EngineConfig,
    session_store: Option<Arc<dyn SessionStore>>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Engine {
    pub fn new(
        generator: Arc<dyn PlanGenerator>,
        synthesizer: Arc<dyn ReportSynthesizer>,
        registry: Arc<ToolRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            planner: Planner::new(generator, registry.clone()),
            executor: Executor::new(registry.clone(), config.execution),
            reporter: Reporter::new(synthesizer),
            registry,
            config,
            session_store: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Route conversation events from every phase to `logger`.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.planner = self.planner.with_conversation_logger(logger.clone());
        self.executor = self.executor.with_conversation_logger(logger.clone());
        self.reporter = self.reporter.with_conversation_logger(logger.clone());
        self.conversation_logger = logger;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Plan, execute and summarize `goal`, returning only the answer text.
    pub async fn run(
        &self,
        goal: &str,
        constraints: &BTreeMap<String, String>,
    ) -> Result<String, EngineError> {
        let input = RunInput::new(goal).with_constraints(constraints.clone());
        self.run_detailed(input, &None, &NoProgress)
            .await
            .map(|outcome| outcome.answer)
    }

    /// [`run`](Self::run) with cooperative cancellation.
    pub async fn run_with_cancel(
        &self,
        goal: &str,
        constraints: &BTreeMap<String, String>,
        cancellation_token: CancellationToken,
    ) -> Result<String, EngineError> {
        let input = RunInput::new(goal).with_constraints(constraints.clone());
        self.run_detailed(input, &Some(cancellation_token), &NoProgress)
            .await
            .map(|outcome| outcome.answer)
    }

    /// Full run returning the answer together with the execution report.
    pub async fn run_detailed(
        &self,
        input: RunInput,
        cancellation_token: &Option<CancellationToken>,
        progress: &dyn ExecutionProgress,
    ) -> Result<EngineOutcome, EngineError> {
        info!("Starting run: {}", truncate_str(&input.goal, 100));
        self.conversation_logger.log(ConversationEvent::new(
            "run_started",
            serde_json::json!({
                "goal": &input.goal,
                "constraints": &input.constraints,
            }),
        ));

        // Phase 1: plan
        progress.on_planning_start(&input.goal);
        let planned = self
            .planner
            .plan(
                &input.goal,
                &input.constraints,
                &input.history,
                cancellation_token,
            )
            .await;

        let (plan, used_default_plan) = match planned {
            Ok(plan) => (plan, false),
            Err(PlanGenerationError::Cancelled) => {
                info!("Run cancelled during planning");
                return Err(EngineError::Cancelled);
            }
            Err(err) => {
                let plan = self.default_plan(&input, err)?;
                progress.on_fallback_plan("generated plan unavailable");
                (plan, true)
            }
        };
        progress.on_plan_ready(&plan);

        // Phase 2: execute
        let report = self.executor.execute(plan, cancellation_token, progress).await;

        if report.skipped_count() > 0 || is_cancelled(cancellation_token) {
            info!("Run cancelled during execution, answering with raw report");
            return Ok(self.degraded(report, used_default_plan));
        }

        // Phase 3: summarize
        progress.on_synthesis_start();
        let summarized = self
            .reporter
            .summarize(&input.goal, &report, cancellation_token, progress)
            .await;
        progress.on_synthesis_complete(summarized.is_ok());

        match summarized {
            Ok(answer) => Ok(EngineOutcome {
                answer,
                report,
                degraded: false,
                used_default_plan,
            }),
            Err(ReportSynthesisError::Cancelled) => {
                info!("Run cancelled during synthesis, answering with raw report");
                Ok(self.degraded(report, used_default_plan))
            }
            Err(err) => match self.config.synthesis_fallback {
                SynthesisFallback::RawReport => {
                    warn!("Falling back to raw report: {}", err);
                    Ok(self.degraded(report, used_default_plan))
                }
                SynthesisFallback::Surface => Err(EngineError::SynthesisFailed(err)),
            },
        }
    }

    /// [`run_detailed`](Self::run_detailed) within a session.
    ///
    /// The session's history is shown to the plan generator; afterwards the
    /// goal and the answer are appended. Without a configured store this is
    /// a plain stateless run.
    pub async fn run_in_session(
        &self,
        session_id: &str,
        input: RunInput,
        cancellation_token: &Option<CancellationToken>,
        progress: &dyn ExecutionProgress,
    ) -> Result<EngineOutcome, EngineError> {
        let Some(store) = &self.session_store else {
            return self.run_detailed(input, cancellation_token, progress).await;
        };

        let goal = input.goal.clone();
        let input = input.with_history(store.get(session_id));
        let outcome = self.run_detailed(input, cancellation_token, progress).await?;

        store.append(session_id, Message::user(goal));
        store.append(session_id, Message::assistant(outcome.answer.clone()));
        Ok(outcome)
    }

    /// Forget the history of `session_id`.
    pub fn clear_session(&self, session_id: &str) {
        if let Some(store) = &self.session_store {
            store.clear(session_id);
        }
    }

    fn default_plan(
        &self,
        input: &RunInput,
        err: PlanGenerationError,
    ) -> Result<ValidatedPlan, EngineError> {
        let PlanningFallback::DefaultPlan(default) = &self.config.planning_fallback else {
            return Err(EngineError::PlanningFailed(err));
        };

        let mut plan = default.clone();
        if plan.goal.trim().is_empty() {
            plan.goal = input.goal.clone();
        }
        for (key, value) in &input.constraints {
            plan.parameters
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        match validate(plan, &self.registry) {
            Ok(validated) => {
                warn!("Planning failed ({}), running default plan", err);
                self.conversation_logger.log(ConversationEvent::new(
                    "default_plan_used",
                    serde_json::json!({ "reason": err.to_string() }),
                ));
                Ok(validated)
            }
            Err(errors) => {
                warn!(
                    errors = errors.len(),
                    "Default plan does not validate against the registry"
                );
                Err(EngineError::PlanningFailed(err))
            }
        }
    }

    fn degraded(&self, report: ExecutionReport, used_default_plan: bool) -> EngineOutcome {
        EngineOutcome {
            answer: report.render_text(),
            report,
            degraded: true,
            used_default_plan,
        }
    }
}
