//! Plan generation through a language model

use async_trait::async_trait;
use std::sync::Arc;
use stepwise_application::{ChatMessage, LlmGateway, PlanGenerator, PlanGeneratorError, PlanRequest};
use stepwise_domain::{Plan, PlanPromptTemplate, parse_plan, util::preview};
use tracing::{debug, warn};

/// [`PlanGenerator`] that prompts a model with the tool catalog and reads a
/// JSON plan out of its reply
pub struct LlmPlanGenerator {
    gateway: Arc<dyn LlmGateway>,
}

impl LlmPlanGenerator {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    fn messages(request: &PlanRequest<'_>) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(PlanPromptTemplate::system(&request.catalog)),
            ChatMessage::user(PlanPromptTemplate::user(
                request.goal,
                request.constraints,
                request.history,
            )),
        ]
    }
}

#[async_trait]
impl PlanGenerator for LlmPlanGenerator {
    async fn generate(&self, request: &PlanRequest<'_>) -> Result<Plan, PlanGeneratorError> {
        let reply = self
            .gateway
            .complete(&Self::messages(request))
            .await
            .map_err(|e| PlanGeneratorError::Unavailable(e.to_string()))?;

        debug!(reply = %preview(&reply, 200), "Planner reply");

        parse_plan(&reply).map_err(|e| {
            warn!(error = %e, reply = %preview(&reply, 200), "Could not read a plan from reply");
            PlanGeneratorError::Malformed(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use stepwise_application::{ChatRole, GatewayError};
    use stepwise_domain::{Message, ParamType, ToolDefinition, ToolParameter};

    // ==================== Test Mocks ====================

    struct MockGateway {
        reply: Result<String, GatewayError>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl MockGateway {
        fn replying(reply: Result<String, GatewayError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            self.reply.clone()
        }
    }

    fn weather_tool() -> ToolDefinition {
        ToolDefinition::new("get_weather_forecast", "Weather forecast").with_parameter(
            ToolParameter::new("city", ParamType::String, "City name"),
        )
    }

    #[tokio::test]
    async fn test_generate_parses_fenced_plan() {
        let gateway = MockGateway::replying(Ok("Here you go:\n```json\n{\"goal\": \"trip\", \"steps\": [{\"step_name\": \"Weather\", \"tool_name\": \"get_weather_forecast\", \"parameters\": {\"city\": \"Beijing\"}}]}\n```".to_string()));
        let generator = LlmPlanGenerator::new(gateway.clone());

        let tool = weather_tool();
        let constraints = BTreeMap::from([("budget".to_string(), "5000".to_string())]);
        let history = vec![Message::user("earlier question")];
        let request = PlanRequest {
            goal: "trip",
            constraints: &constraints,
            catalog: vec![&tool],
            history: &history,
        };

        let plan = generator.generate(&request).await.unwrap();
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].tool_name, "get_weather_forecast");

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, ChatRole::System);
        assert!(seen[0].content.contains("get_weather_forecast"));
        assert!(seen[1].content.contains("budget"));
        assert!(seen[1].content.contains("earlier question"));
    }

    #[tokio::test]
    async fn test_generate_malformed_reply() {
        let gateway = MockGateway::replying(Ok("I cannot help with that.".to_string()));
        let generator = LlmPlanGenerator::new(gateway.clone());
        let constraints = BTreeMap::new();
        let request = PlanRequest {
            goal: "trip",
            constraints: &constraints,
            catalog: Vec::new(),
            history: &[],
        };

        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, PlanGeneratorError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_generate_gateway_failure_is_unavailable() {
        let gateway = MockGateway::replying(Err(GatewayError::Timeout));
        let generator = LlmPlanGenerator::new(gateway.clone());
        let constraints = BTreeMap::new();
        let request = PlanRequest {
            goal: "trip",
            constraints: &constraints,
            catalog: Vec::new(),
            history: &[],
        };

        assert_eq!(
            generator.generate(&request).await.unwrap_err(),
            PlanGeneratorError::Unavailable("Timeout".to_string())
        );
    }
}
