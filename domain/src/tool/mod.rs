//! Tool domain module
//!
//! Tools are the named capabilities a plan step can invoke. Each tool is a
//! [`ToolDefinition`] (name, description, typed parameters) paired with a
//! [`ToolCapability`] that does the work, stored together as a
//! [`ToolDescriptor`] in the [`ToolRegistry`].
//!
//! ```text
//! ┌───────────────┐    ┌──────────────┐    ┌──────────────────────────┐
//! │ ToolRegistry  │───▶│ ToolArgs     │───▶│ Result<String,           │
//! │ (name → tool) │    │ (invocation) │    │        ToolExecutionError│
//! └──────┬────────┘    └──────────────┘    └──────────────────────────┘
//!        │
//!        └─ describe_all(): catalog for the plan generator
//! ```
//!
//! Dispatch by name is explicit: an unknown name is a typed
//! [`ToolExecutionError::UnknownTool`], never a panic, and duplicate names are
//! rejected at registration time.

pub mod capability;
pub mod entities;
pub mod registry;
pub mod value_objects;

pub use capability::{FnTool, SyncFnTool, ToolCapability};
pub use entities::{ParamType, ToolArgs, ToolDefinition, ToolParameter};
pub use registry::{DuplicateNameError, ToolDescriptor, ToolRegistry};
pub use value_objects::ToolExecutionError;
