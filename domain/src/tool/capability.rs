//! Tool capability abstraction
//!
//! A [`ToolCapability`] is the code behind a tool name. The core treats it as
//! a black box that receives arguments and eventually yields either a payload
//! string or a failure message. Capabilities may block on I/O and may have
//! side effects; they must tolerate being called more than once.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::entities::ToolArgs;

#[async_trait]
pub trait ToolCapability: Send + Sync {
    /// Run the tool with the given arguments.
    ///
    /// `Err` carries a human-readable failure message.
    async fn invoke(&self, args: &ToolArgs) -> Result<String, String>;
}

/// Capability backed by an async closure.
///
/// ```ignore
/// let tool = FnTool::new(|args: ToolArgs| async move {
///     let city = args.require_str("city")?.to_string();
///     Ok::<_, String>(format!("sunny in {city}"))
/// });
/// ```
pub struct FnTool<F> {
    f: F,
}

impl<F, Fut> FnTool<F>
where
    F: Fn(ToolArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, String>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> ToolCapability for FnTool<F>
where
    F: Fn(ToolArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, String>> + Send + 'static,
{
    async fn invoke(&self, args: &ToolArgs) -> Result<String, String> {
        (self.f)(args.clone()).await
    }
}

/// Capability backed by a synchronous function (pure lookups, simulations).
///
/// The function runs on the blocking thread pool, so a body that blocks
/// never stalls the async workers and a caller-side deadline can still fire.
/// A panic inside the body is re-raised on the calling task.
pub struct SyncFnTool<F> {
    f: Arc<F>,
}

impl<F> SyncFnTool<F>
where
    F: Fn(&ToolArgs) -> Result<String, String> + Send + Sync + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F> ToolCapability for SyncFnTool<F>
where
    F: Fn(&ToolArgs) -> Result<String, String> + Send + Sync + 'static,
{
    async fn invoke(&self, args: &ToolArgs) -> Result<String, String> {
        let f = Arc::clone(&self.f);
        let args = args.clone();
        match tokio::task::spawn_blocking(move || f(&args)).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(format!("tool task aborted: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fn_tool_invokes_closure() {
        let tool = FnTool::new(|args: ToolArgs| async move {
            let city = args.require_str("city")?.to_string();
            Ok::<_, String>(format!("sunny in {}", city))
        });

        let ok = tool.invoke(&ToolArgs::new().with("city", "Paris")).await;
        assert_eq!(ok, Ok("sunny in Paris".to_string()));

        let err = tool.invoke(&ToolArgs::new()).await;
        assert!(err.unwrap_err().contains("missing required argument"));
    }

    #[tokio::test]
    async fn test_sync_fn_tool() {
        let tool = SyncFnTool::new(|args: &ToolArgs| Ok(format!("{} args", args.len())));
        let out = tool.invoke(&ToolArgs::new().with("a", 1).with("b", 2)).await;
        assert_eq!(out, Ok("2 args".to_string()));
    }

    #[tokio::test]
    async fn test_sync_fn_tool_runs_off_the_calling_thread() {
        let caller = std::thread::current().id();
        let tool = SyncFnTool::new(move |_: &ToolArgs| {
            Ok((std::thread::current().id() != caller).to_string())
        });
        assert_eq!(tool.invoke(&ToolArgs::new()).await, Ok("true".to_string()));
    }

    #[tokio::test]
    #[should_panic(expected = "kaboom")]
    async fn test_sync_fn_tool_propagates_panic() {
        let tool = SyncFnTool::new(|_: &ToolArgs| -> Result<String, String> { panic!("kaboom") });
        let _ = tool.invoke(&ToolArgs::new()).await;
    }
}
