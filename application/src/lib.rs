//! Application layer for stepwise
//!
//! This crate contains use cases, port definitions, and engine configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, ExecutionOptions, PlanningFallback, SynthesisFallback};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{ChatMessage, ChatRole, GatewayError, LlmGateway, StreamEvent, StreamHandle},
    plan_generator::{PlanGenerator, PlanGeneratorError, PlanRequest},
    progress::{ExecutionProgress, NoProgress},
    report_synthesizer::{ChunkSink, ReportSynthesizer, SynthesizerError},
    session_store::SessionStore,
};
pub use use_cases::create_plan::{PlanGenerationError, Planner};
pub use use_cases::execute_plan::Executor;
pub use use_cases::run_engine::{Engine, EngineError, EngineOutcome, RunInput};
pub use use_cases::summarize_report::{ReportSynthesisError, Reporter};
