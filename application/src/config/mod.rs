//! Application-level configuration.
//!
//! - [`EngineConfig`]: fallback policy plus executor limits
//! - [`ExecutionOptions`]: per-step timeout and skipped-step accounting

pub mod engine_config;

pub use engine_config::{EngineConfig, ExecutionOptions, PlanningFallback, SynthesisFallback};
