//! LLM Gateway port
//!
//! Defines the interface for chat completions against a language model
//! provider, either as one reply or as a stream of text deltas.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Stream error: {0}")]
    StreamError(String),
}

/// Role of a chat message as understood by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Event emitted by a streaming completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Next piece of the reply text
    Delta(String),
    /// Reply finished; carries the full text
    Completed(String),
    Error(String),
}

/// Receiving end of a streaming completion
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Handle that yields `text` as a single completed reply
    pub fn completed(text: String) -> Self {
        let (tx, rx) = mpsc::channel(1);
        // Capacity 1 and a fresh channel: this never fails
        let _ = tx.try_send(StreamEvent::Completed(text));
        Self::new(rx)
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(self) -> Result<String, GatewayError> {
        self.collect_with(|_| {}).await
    }

    /// Consume the stream, passing every delta to `on_delta`.
    ///
    /// A stream that completes without any delta hands its full text to
    /// `on_delta` once, so callers always see the reply.
    pub async fn collect_with<F>(mut self, mut on_delta: F) -> Result<String, GatewayError>
    where
        F: FnMut(&str),
    {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    on_delta(&chunk);
                    full_text.push_str(&chunk);
                }
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        on_delta(&text);
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => return Err(GatewayError::StreamError(e)),
            }
        }
        // Sender dropped without Completed
        Ok(full_text)
    }
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send the conversation and return the assistant's reply text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError>;

    /// Send the conversation and stream the reply.
    ///
    /// The default calls [`complete`](Self::complete) and yields the whole
    /// reply as one `Completed` event.
    async fn complete_streaming(
        &self,
        messages: &[ChatMessage],
    ) -> Result<StreamHandle, GatewayError> {
        let reply = self.complete(messages).await?;
        Ok(StreamHandle::completed(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(events: Vec<StreamEvent>) -> StreamHandle {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event).unwrap();
        }
        StreamHandle::new(rx)
    }

    #[tokio::test]
    async fn test_collect_with_sees_every_delta() {
        let stream = handle(vec![
            StreamEvent::Delta("Pack ".into()),
            StreamEvent::Delta("an umbrella.".into()),
            StreamEvent::Completed("ignored".into()),
        ]);
        let mut seen = Vec::new();
        let text = stream.collect_with(|c| seen.push(c.to_string())).await.unwrap();
        assert_eq!(text, "Pack an umbrella.");
        assert_eq!(seen, vec!["Pack ", "an umbrella."]);
    }

    #[tokio::test]
    async fn test_completed_only_stream_reports_text_once() {
        let mut seen = Vec::new();
        let text = StreamHandle::completed("whole reply".into())
            .collect_with(|c| seen.push(c.to_string()))
            .await
            .unwrap();
        assert_eq!(text, "whole reply");
        assert_eq!(seen, vec!["whole reply"]);
    }

    #[tokio::test]
    async fn test_stream_error() {
        let stream = handle(vec![
            StreamEvent::Delta("partial".into()),
            StreamEvent::Error("connection reset".into()),
        ]);
        assert_eq!(
            stream.collect_text().await.unwrap_err(),
            GatewayError::StreamError("connection reset".into())
        );
    }

    #[tokio::test]
    async fn test_closed_stream_keeps_partial_text() {
        let stream = handle(vec![StreamEvent::Delta("partial".into())]);
        assert_eq!(stream.collect_text().await.unwrap(), "partial");
    }
}
