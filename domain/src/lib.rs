//! Domain layer for stepwise
//!
//! This crate contains the core entities and rules of the plan / execute /
//! report engine. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! - **Tool**: a named, typed capability held in a [`ToolRegistry`]
//! - **Plan**: an ordered list of tool calls derived from a goal; it must
//!   pass [`validate`] before it can run
//! - **ExecutionReport**: per-step outcomes plus aggregate counts
//!
//! Steps carry static parameters only. There is no data flow from one
//! step's output into a later step's input.

pub mod plan;
pub mod prompt;
pub mod report;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use plan::{
    Plan, PlanParseError, PlanStep, ValidatedPlan, ValidationError, ValidationIssue, parse_plan,
    parse_plan_json, validate,
};
pub use prompt::{PlanPromptTemplate, ReportPromptTemplate};
pub use report::{ExecutionReport, SkippedStepPolicy, StepOutcome, StepResult};
pub use session::{History, Message, Role};
pub use tool::{
    DuplicateNameError, FnTool, ParamType, SyncFnTool, ToolArgs, ToolCapability, ToolDefinition,
    ToolDescriptor, ToolExecutionError, ToolParameter, ToolRegistry,
};
