//! Shared utilities for use cases.
//!
//! Cancellation checks and cancellable awaiting, used by the planner,
//! executor, reporter and engine.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Whether cancellation has been requested on `token`.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return true;
    }
    false
}

/// Await `future` unless `token` fires first.
///
/// Returns `None` when cancelled; the future is dropped at that point.
pub(crate) async fn run_cancellable<F>(token: &Option<CancellationToken>, future: F) -> Option<F::Output>
where
    F: Future,
{
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                output = future => Some(output),
            }
        }
        None => Some(future.await),
    }
}
