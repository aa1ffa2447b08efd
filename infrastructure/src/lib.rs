//! Infrastructure layer for stepwise
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, the bundled travel tools, and configuration
//! file loading.

pub mod config;
pub mod llm;
pub mod logging;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigSource, ConfigValidationError, FileConfig};
pub use llm::{LlmPlanGenerator, LlmReportSynthesizer, OpenAiGateway};
pub use logging::JsonlConversationLogger;
pub use session::InMemorySessionStore;
pub use tools::{default_plan, travel_registry};
