//! Prompt domain
//!
//! Templates used by the model-backed plan generator and report synthesizer.

mod planner;
mod report;

pub use planner::PlanPromptTemplate;
pub use report::ReportPromptTemplate;
