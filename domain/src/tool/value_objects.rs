//! Tool invocation errors
//!
//! Every way a single tool invocation can fail is a variant of
//! [`ToolExecutionError`]. The executor records these as failed step results;
//! none of them abort a plan.
//!
//! | Variant | Cause |
//! |---------|-------|
//! | `UnknownTool` | The name did not resolve in the registry |
//! | `Timeout` | The invocation exceeded the per-step deadline |
//! | `Internal` | The tool itself reported a failure |

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolExecutionError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Internal(String),
}

impl ToolExecutionError {
    /// Stable identifier for the error kind, used in serialized reports
    pub fn kind(&self) -> &'static str {
        match self {
            ToolExecutionError::UnknownTool(_) => "unknown_tool",
            ToolExecutionError::Timeout(_) => "timeout",
            ToolExecutionError::Internal(_) => "internal",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ToolExecutionError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_message() {
        let err = ToolExecutionError::UnknownTool("doesNotExist".to_string());
        assert_eq!(err.to_string(), "unknown tool: doesNotExist");
        assert_eq!(err.kind(), "unknown_tool");
    }

    #[test]
    fn test_timeout_message() {
        let err = ToolExecutionError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "timed out after 1500ms");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_internal_passes_message_through() {
        let err = ToolExecutionError::Internal("upstream returned 503".to_string());
        assert_eq!(err.to_string(), "upstream returned 503");
        assert!(!err.is_timeout());
    }
}
