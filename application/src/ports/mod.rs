//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod conversation_logger;
pub mod llm_gateway;
pub mod plan_generator;
pub mod progress;
pub mod report_synthesizer;
pub mod session_store;
