//! Use cases
//!
//! Application-level operations that orchestrate domain logic:
//!
//! - [`create_plan::Planner`]: goal to validated plan
//! - [`execute_plan::Executor`]: validated plan to execution report
//! - [`summarize_report::Reporter`]: execution report to narrative
//! - [`run_engine::Engine`]: all three, with fallback policy

pub mod create_plan;
pub mod execute_plan;
pub mod run_engine;
pub(crate) mod shared;
pub mod summarize_report;
