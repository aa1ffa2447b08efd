//! Plan domain module
//!
//! A [`Plan`] is produced from text by [`parse_plan`], checked against a
//! tool registry by [`validate`], and only then handed to the executor as a
//! [`ValidatedPlan`].

pub mod entities;
pub mod parser;
pub mod validation;

pub use entities::{Plan, PlanStep, ValidatedPlan};
pub use parser::{PlanParseError, parse_plan, parse_plan_json};
pub use validation::{ValidationError, ValidationIssue, validate};
