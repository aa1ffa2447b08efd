//! Summarize Report use case (the Reporter).
//!
//! Hands the full execution report, failed and skipped steps included, to
//! the [`ReportSynthesizer`] and returns its narrative.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::ExecutionProgress;
use crate::ports::report_synthesizer::ReportSynthesizer;
use crate::use_cases::shared::{is_cancelled, run_cancellable};
use std::sync::Arc;
use stepwise_domain::ExecutionReport;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportSynthesisError {
    #[error("{0}")]
    Failed(String),

    #[error("synthesis cancelled")]
    Cancelled,
}

pub struct Reporter {
    synthesizer: Arc<dyn ReportSynthesizer>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl Reporter {
    pub fn new(synthesizer: Arc<dyn ReportSynthesizer>) -> Self {
        Self {
            synthesizer,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Produce the narrative answer for `goal`. A blank narrative is a failure.
    ///
    /// Pieces of the narrative reach `progress` as they are written; the
    /// assembled text is returned.
    pub async fn summarize(
        &self,
        goal: &str,
        report: &ExecutionReport,
        cancellation_token: &Option<CancellationToken>,
        progress: &dyn ExecutionProgress,
    ) -> Result<String, ReportSynthesisError> {
        if is_cancelled(cancellation_token) {
            return Err(ReportSynthesisError::Cancelled);
        }

        let on_chunk = |chunk: &str| progress.on_synthesis_chunk(chunk);
        let synthesis = self.synthesizer.synthesize_streaming(goal, report, &on_chunk);
        let narrative = run_cancellable(cancellation_token, synthesis)
            .await
            .ok_or(ReportSynthesisError::Cancelled)?
            .map_err(|e| {
                warn!("Report synthesis failed: {}", e);
                ReportSynthesisError::Failed(e.to_string())
            })?;

        if narrative.trim().is_empty() {
            warn!("Report synthesizer returned an empty narrative");
            return Err(ReportSynthesisError::Failed(
                "synthesizer returned an empty narrative".to_string(),
            ));
        }

        info!(chars = narrative.chars().count(), "Report synthesized");
        self.conversation_logger.log(ConversationEvent::new(
            "report_synthesized",
            serde_json::json!({ "goal": goal, "narrative": &narrative }),
        ));

        Ok(narrative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::ports::report_synthesizer::{ChunkSink, SynthesizerError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use stepwise_domain::{
        Plan, PlanStep, SkippedStepPolicy, StepResult, ToolExecutionError,
    };

    struct MockSynthesizer {
        response: Result<String, SynthesizerError>,
        seen_failures: Mutex<Option<usize>>,
    }

    impl MockSynthesizer {
        fn new(response: Result<String, SynthesizerError>) -> Self {
            Self {
                response,
                seen_failures: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ReportSynthesizer for MockSynthesizer {
        async fn synthesize(
            &self,
            _goal: &str,
            report: &ExecutionReport,
        ) -> Result<String, SynthesizerError> {
            *self.seen_failures.lock().unwrap() = Some(report.failed_count());
            self.response.clone()
        }
    }

    /// Streams a fixed narrative in pieces
    struct ChunkedSynthesizer(Vec<&'static str>);

    #[async_trait]
    impl ReportSynthesizer for ChunkedSynthesizer {
        async fn synthesize(
            &self,
            _goal: &str,
            _report: &ExecutionReport,
        ) -> Result<String, SynthesizerError> {
            Ok(self.0.concat())
        }

        async fn synthesize_streaming(
            &self,
            _goal: &str,
            _report: &ExecutionReport,
            on_chunk: ChunkSink<'_>,
        ) -> Result<String, SynthesizerError> {
            for chunk in self.0.iter().copied() {
                on_chunk(chunk);
            }
            Ok(self.0.concat())
        }
    }

    #[derive(Default)]
    struct ChunkRecorder(Mutex<Vec<String>>);

    impl ExecutionProgress for ChunkRecorder {
        fn on_synthesis_chunk(&self, chunk: &str) {
            self.0.lock().unwrap().push(chunk.to_string());
        }
    }

    fn report() -> ExecutionReport {
        let ok = PlanStep::new("Weather", "get_weather_forecast");
        let bad = PlanStep::new("Lookup", "doesNotExist");
        ExecutionReport::new(
            Plan::new("trip").with_step(ok.clone()).with_step(bad.clone()),
            vec![
                StepResult::succeeded(&ok, "sunny", Duration::ZERO),
                StepResult::failed(
                    &bad,
                    ToolExecutionError::UnknownTool("doesNotExist".into()),
                    Duration::ZERO,
                ),
            ],
            SkippedStepPolicy::CountInTotal,
        )
    }

    #[tokio::test]
    async fn test_summarize_passes_failures_through() {
        let synthesizer = Arc::new(MockSynthesizer::new(Ok("Pack an umbrella.".into())));
        let reporter = Reporter::new(synthesizer.clone());

        let narrative = reporter.summarize("trip", &report(), &None, &NoProgress).await.unwrap();
        assert_eq!(narrative, "Pack an umbrella.");
        assert_eq!(*synthesizer.seen_failures.lock().unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_summarize_forwards_chunks_and_returns_whole_narrative() {
        let reporter = Reporter::new(Arc::new(ChunkedSynthesizer(vec![
            "Weather is sunny. ",
            "The lookup step failed.",
        ])));
        let progress = ChunkRecorder::default();

        let narrative = reporter
            .summarize("trip", &report(), &None, &progress)
            .await
            .unwrap();
        assert_eq!(narrative, "Weather is sunny. The lookup step failed.");
        assert_eq!(
            *progress.0.lock().unwrap(),
            vec!["Weather is sunny. ", "The lookup step failed."]
        );
    }

    #[tokio::test]
    async fn test_non_streaming_synthesizer_emits_one_chunk() {
        let reporter = Reporter::new(Arc::new(MockSynthesizer::new(Ok("Pack an umbrella.".into()))));
        let progress = ChunkRecorder::default();

        reporter
            .summarize("trip", &report(), &None, &progress)
            .await
            .unwrap();
        assert_eq!(*progress.0.lock().unwrap(), vec!["Pack an umbrella."]);
    }

    #[tokio::test]
    async fn test_collaborator_failure() {
        let reporter = Reporter::new(Arc::new(MockSynthesizer::new(Err(
            SynthesizerError::Unavailable("503".into()),
        ))));
        let err = reporter.summarize("trip", &report(), &None, &NoProgress).await.unwrap_err();
        assert_eq!(
            err,
            ReportSynthesisError::Failed("report synthesizer unavailable: 503".into())
        );
    }

    #[tokio::test]
    async fn test_blank_narrative_is_failure() {
        let reporter = Reporter::new(Arc::new(MockSynthesizer::new(Ok("  \n".into()))));
        let err = reporter.summarize("trip", &report(), &None, &NoProgress).await.unwrap_err();
        assert!(matches!(err, ReportSynthesisError::Failed(_)));
    }

    #[tokio::test]
    async fn test_cancelled() {
        let reporter = Reporter::new(Arc::new(MockSynthesizer::new(Ok("text".into()))));
        let token = CancellationToken::new();
        token.cancel();
        let err = reporter
            .summarize("trip", &report(), &Some(token), &NoProgress)
            .await
            .unwrap_err();
        assert_eq!(err, ReportSynthesisError::Cancelled);
    }
}
