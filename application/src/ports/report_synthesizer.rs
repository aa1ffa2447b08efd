//! Report synthesizer port

use async_trait::async_trait;
use stepwise_domain::ExecutionReport;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesizerError {
    #[error("report synthesizer unavailable: {0}")]
    Unavailable(String),

    #[error("report synthesis failed: {0}")]
    Failed(String),
}

/// Receives narrative text as it is produced
pub type ChunkSink<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Turns an execution report, failures included, into a narrative answer
#[async_trait]
pub trait ReportSynthesizer: Send + Sync {
    async fn synthesize(&self, goal: &str, report: &ExecutionReport)
    -> Result<String, SynthesizerError>;

    /// Like [`synthesize`](Self::synthesize), handing each piece of the
    /// narrative to `on_chunk` as it arrives. Returns the assembled text.
    ///
    /// The default hands over the finished narrative as one chunk.
    async fn synthesize_streaming(
        &self,
        goal: &str,
        report: &ExecutionReport,
        on_chunk: ChunkSink<'_>,
    ) -> Result<String, SynthesizerError> {
        let narrative = self.synthesize(goal, report).await?;
        on_chunk(&narrative);
        Ok(narrative)
    }
}
