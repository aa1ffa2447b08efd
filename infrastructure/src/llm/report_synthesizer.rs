//! Report synthesis through a language model

use async_trait::async_trait;
use std::sync::Arc;
use stepwise_application::{
    ChatMessage, ChunkSink, LlmGateway, ReportSynthesizer, SynthesizerError,
};
use stepwise_domain::{ExecutionReport, ReportPromptTemplate};
use tracing::debug;

pub struct LlmReportSynthesizer {
    gateway: Arc<dyn LlmGateway>,
}

impl LlmReportSynthesizer {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ReportSynthesizer for LlmReportSynthesizer {
    async fn synthesize(
        &self,
        goal: &str,
        report: &ExecutionReport,
    ) -> Result<String, SynthesizerError> {
        self.synthesize_streaming(goal, report, &|_: &str| {}).await
    }

    async fn synthesize_streaming(
        &self,
        goal: &str,
        report: &ExecutionReport,
        on_chunk: ChunkSink<'_>,
    ) -> Result<String, SynthesizerError> {
        let messages = [
            ChatMessage::system(ReportPromptTemplate::system()),
            ChatMessage::user(ReportPromptTemplate::user(goal, report)),
        ];

        let stream = self
            .gateway
            .complete_streaming(&messages)
            .await
            .map_err(|e| SynthesizerError::Unavailable(e.to_string()))?;

        let answer = stream
            .collect_with(on_chunk)
            .await
            .map_err(|e| SynthesizerError::Failed(e.to_string()))?;

        debug!(bytes = answer.len(), "Synthesizer reply");
        Ok(answer.trim().to_string())
    }
}
