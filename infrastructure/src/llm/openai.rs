//! OpenAI-compatible chat completions gateway
//!
//! Streaming replies arrive as server-sent events, one `data:` line per
//! delta, terminated by `data: [DONE]`.

use crate::config::FileLlmConfig;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use stepwise_application::{ChatMessage, GatewayError, LlmGateway, StreamEvent, StreamHandle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Gateway that POSTs to `{base_url}/chat/completions`
pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGateway {
    /// Build a gateway from the `[llm]` config section.
    ///
    /// The API key is resolved once here; without one, requests are sent
    /// without an `Authorization` header (local servers usually accept this).
    pub fn new(config: &FileLlmConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let api_key = config.resolve_api_key();
        info!(
            model = %config.model,
            base_url = %config.base_url,
            authenticated = api_key.is_some(),
            "OpenAiGateway initialized"
        );

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request_body(&self, messages: &[ChatMessage]) -> Value {
        json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    /// POST `body` and reject non-success statuses
    async fn post(&self, body: &Value) -> Result<reqwest::Response, GatewayError> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Extract `choices[0].message.content` from a completion response
fn parse_completion(body: &Value) -> Result<String, GatewayError> {
    if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
        return Err(GatewayError::InvalidResponse(message.to_string()));
    }

    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            GatewayError::InvalidResponse("response has no choices[0].message.content".to_string())
        })
}

/// Extract `choices[0].delta.content` from one streamed chunk.
///
/// Chunks without content (role headers, finish markers) yield `None`.
fn parse_stream_chunk(data: &str) -> Result<Option<String>, GatewayError> {
    let value: Value =
        serde_json::from_str(data).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

    if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
        return Err(GatewayError::StreamError(message.to_string()));
    }

    Ok(value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

/// Splits a server-sent event byte stream into `data:` payloads
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed raw bytes; returns the payloads of every line completed by them
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(data) = line.trim_end().strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
        payloads
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::ConnectionError(e.to_string())
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        let body = self.build_request_body(messages);
        debug!(model = %self.model, messages = messages.len(), "Sending chat completion");

        let response = self.post(&body).await?;

        let value: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else {
                GatewayError::InvalidResponse(e.to_string())
            }
        })?;

        let content = parse_completion(&value)?;
        debug!(bytes = content.len(), "Chat completion received");
        Ok(content)
    }

    async fn complete_streaming(
        &self,
        messages: &[ChatMessage],
    ) -> Result<StreamHandle, GatewayError> {
        let mut body = self.build_request_body(messages);
        body["stream"] = json!(true);
        debug!(model = %self.model, messages = messages.len(), "Sending streaming chat completion");

        let response = self.post(&body).await?;
        let mut bytes = response.bytes_stream();
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut decoder = SseDecoder::default();
            let mut full_text = String::new();

            while let Some(next) = bytes.next().await {
                let chunk = match next {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(map_transport_error(e).to_string())).await;
                        return;
                    }
                };

                for data in decoder.push(&chunk) {
                    if data == "[DONE]" {
                        debug!(bytes = full_text.len(), "Chat completion stream finished");
                        let _ = tx.send(StreamEvent::Completed(full_text)).await;
                        return;
                    }
                    match parse_stream_chunk(&data) {
                        Ok(Some(delta)) => {
                            full_text.push_str(&delta);
                            // Receiver gone: nobody is listening any more
                            if tx.send(StreamEvent::Delta(delta)).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Bad chunk in completion stream: {}", e);
                            let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                            return;
                        }
                    }
                }
            }

            let _ = tx.send(StreamEvent::Completed(full_text)).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = FileLlmConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..FileLlmConfig::default()
        };
        let gateway = OpenAiGateway::new(&config).unwrap();
        assert_eq!(gateway.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let gateway = OpenAiGateway::new(&FileLlmConfig::default()).unwrap();
        let body = gateway.build_request_body(&[
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
        ]);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 3000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_parse_completion() {
        let body = json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}}]
        });
        assert_eq!(parse_completion(&body).unwrap(), "hello");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        let err = parse_completion(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_sse_decoder_handles_split_lines() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert_eq!(
            decoder.push(b": 1}\r\n\n: keep-alive\ndata: [DONE]\n"),
            vec!["{\"a\": 1}".to_string(), "[DONE]".to_string()]
        );
    }

    #[test]
    fn test_sse_decoder_keeps_multibyte_text_split_across_pushes() {
        let mut decoder = SseDecoder::default();
        let line = "data: 18-25°C\n".as_bytes();
        let (head, tail) = line.split_at(12);
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["18-25°C".to_string()]);
    }

    #[test]
    fn test_parse_stream_chunk() {
        let delta = r#"{"choices": [{"index": 0, "delta": {"content": "Pack "}}]}"#;
        assert_eq!(parse_stream_chunk(delta).unwrap(), Some("Pack ".to_string()));

        let role_only = r#"{"choices": [{"index": 0, "delta": {"role": "assistant"}}]}"#;
        assert_eq!(parse_stream_chunk(role_only).unwrap(), None);

        let error = r#"{"error": {"message": "rate limited"}}"#;
        assert_eq!(
            parse_stream_chunk(error).unwrap_err(),
            GatewayError::StreamError("rate limited".to_string())
        );
    }

    #[test]
    fn test_parse_completion_error_object() {
        let body = json!({"error": {"message": "model not found"}});
        assert_eq!(
            parse_completion(&body).unwrap_err(),
            GatewayError::InvalidResponse("model not found".to_string())
        );
    }
}
