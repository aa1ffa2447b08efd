//! Tool Registry
//!
//! The [`ToolRegistry`] maps tool names to [`ToolDescriptor`]s (definition +
//! capability). It is filled once at startup and then shared read-only, so
//! concurrent requests can resolve and invoke tools without locking.
//!
//! # Usage
//!
//! ```ignore
//! let registry = ToolRegistry::new()
//!     .with_tool(ToolDescriptor::new(weather_definition(), WeatherTool))?
//!     .with_tool(ToolDescriptor::from_fn(echo_definition(), |args| Ok(format!("{:?}", args))))?;
//!
//! let catalog = registry.describe_all();          // registration order
//! let out = registry.invoke("echo", &args).await; // Result<String, ToolExecutionError>
//! ```
//!
//! # Name uniqueness
//!
//! Registering a second tool under an existing name fails with
//! [`DuplicateNameError`] and leaves the registry untouched.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::capability::{SyncFnTool, ToolCapability};
use super::entities::{ToolArgs, ToolDefinition};
use super::value_objects::ToolExecutionError;

/// Registration conflict: a tool with this name already exists
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tool '{name}' is already registered")]
pub struct DuplicateNameError {
    pub name: String,
}

/// A registered tool: its definition plus the capability that runs it
#[derive(Clone)]
pub struct ToolDescriptor {
    definition: ToolDefinition,
    capability: Arc<dyn ToolCapability>,
}

impl ToolDescriptor {
    pub fn new(definition: ToolDefinition, capability: impl ToolCapability + 'static) -> Self {
        Self {
            definition,
            capability: Arc::new(capability),
        }
    }

    pub fn from_arc(definition: ToolDefinition, capability: Arc<dyn ToolCapability>) -> Self {
        Self {
            definition,
            capability,
        }
    }

    /// Build a descriptor from a synchronous function
    pub fn from_fn<F>(definition: ToolDefinition, f: F) -> Self
    where
        F: Fn(&ToolArgs) -> Result<String, String> + Send + Sync + 'static,
    {
        Self::new(definition, SyncFnTool::new(f))
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn capability(&self) -> &Arc<dyn ToolCapability> {
        &self.capability
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Name-indexed collection of tools, in registration order
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails without side effects if the name is taken.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), DuplicateNameError> {
        if self.index.contains_key(descriptor.name()) {
            return Err(DuplicateNameError {
                name: descriptor.name().to_string(),
            });
        }
        self.index
            .insert(descriptor.name().to_string(), self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_tool(mut self, descriptor: ToolDescriptor) -> Result<Self, DuplicateNameError> {
        self.register(descriptor)?;
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Definitions of every tool, in registration order
    pub fn describe_all(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Resolve `name` and run it.
    ///
    /// An unresolved name is reported as [`ToolExecutionError::UnknownTool`];
    /// a capability failure as [`ToolExecutionError::Internal`].
    pub async fn invoke(&self, name: &str, args: &ToolArgs) -> Result<String, ToolExecutionError> {
        let descriptor = self
            .lookup(name)
            .ok_or_else(|| ToolExecutionError::UnknownTool(name.to_string()))?;

        descriptor
            .capability
            .invoke(args)
            .await
            .map_err(ToolExecutionError::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParamType, ToolParameter};

    fn weather(tag: &'static str) -> ToolDescriptor {
        ToolDescriptor::from_fn(
            ToolDefinition::new("weather", tag).with_parameter(ToolParameter::new(
                "city",
                ParamType::String,
                "City",
            )),
            move |_| Ok(tag.to_string()),
        )
    }

    fn echo() -> ToolDescriptor {
        ToolDescriptor::from_fn(ToolDefinition::new("echo", "Echo args"), |args| {
            Ok(format!("{} args", args.len()))
        })
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(weather("first")).unwrap();

        let err = registry.register(weather("second")).unwrap_err();
        assert_eq!(err.name, "weather");
        assert_eq!(err.to_string(), "tool 'weather' is already registered");

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup("weather").unwrap().definition().description,
            "first"
        );
    }

    #[test]
    fn test_describe_all_keeps_registration_order() {
        let registry = ToolRegistry::new()
            .with_tool(echo())
            .unwrap()
            .with_tool(weather("w"))
            .unwrap();

        let names: Vec<_> = registry.describe_all().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["echo", "weather"]);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["echo", "weather"]);
    }

    #[test]
    fn test_lookup_absent_returns_none() {
        let registry = ToolRegistry::new();
        assert!(registry.lookup("weather").is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let registry = ToolRegistry::new().with_tool(echo()).unwrap();
        let out = registry
            .invoke("echo", &ToolArgs::new().with("x", 1))
            .await
            .unwrap();
        assert_eq!(out, "1 args");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = ToolRegistry::new().with_tool(echo()).unwrap();
        let err = registry
            .invoke("doesNotExist", &ToolArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err, ToolExecutionError::UnknownTool("doesNotExist".into()));
        assert_eq!(err.to_string(), "unknown tool: doesNotExist");
    }

    #[tokio::test]
    async fn test_invoke_tool_failure_is_internal() {
        let registry = ToolRegistry::new()
            .with_tool(ToolDescriptor::from_fn(
                ToolDefinition::new("broken", "Always fails"),
                |_| Err("backend unavailable".to_string()),
            ))
            .unwrap();

        let err = registry.invoke("broken", &ToolArgs::new()).await.unwrap_err();
        assert_eq!(err, ToolExecutionError::Internal("backend unavailable".into()));
    }
}
