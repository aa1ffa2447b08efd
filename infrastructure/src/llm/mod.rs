//! LLM-backed adapters
//!
//! [`OpenAiGateway`] speaks the OpenAI-compatible chat completions protocol
//! (OpenAI, Ollama, vLLM, LM Studio, ...). The plan generator and report
//! synthesizer are written against the [`LlmGateway`] port so any gateway
//! can back them.
//!
//! [`LlmGateway`]: stepwise_application::LlmGateway

mod openai;
mod plan_generator;
mod report_synthesizer;

pub use openai::OpenAiGateway;
pub use plan_generator::LlmPlanGenerator;
pub use report_synthesizer::LlmReportSynthesizer;
