use std::time::Duration;

use async_trait::async_trait;
use itinera_common::ItineraError;
use itinera_common::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{LlmClient, LlmRequest, LlmResponse, Role, TokenUsage, ToolCall};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize, Debug)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAiFunction,
}

#[derive(Serialize, Debug)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Client for OpenAI-compatible chat completion endpoints (OpenAI, Ollama).
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: Option<String>, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    /// Replace the HTTP client with one that enforces a request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ItineraError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    fn role_to_string(role: &Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    fn build_messages(request: &LlmRequest) -> Vec<OpenAiMessage> {
        let mut messages = Vec::new();
        if let Some(ref system) = request.system_prompt {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        for msg in &request.messages {
            let tool_calls = (!msg.tool_calls.is_empty()).then(|| {
                msg.tool_calls
                    .iter()
                    .map(|call| OpenAiToolCall {
                        id: call.id.clone(),
                        call_type: function_type(),
                        function: OpenAiFunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    })
                    .collect()
            });
            messages.push(OpenAiMessage {
                role: Self::role_to_string(&msg.role).to_string(),
                content: Some(msg.content.clone()),
                tool_calls,
                tool_call_id: msg.tool_call_id.clone(),
            });
        }
        messages
    }

    fn build_tools(request: &LlmRequest) -> Option<Vec<OpenAiTool>> {
        if request.tools.is_empty() {
            return None;
        }
        Some(
            request
                .tools
                .iter()
                .map(|tool| OpenAiTool {
                    tool_type: "function",
                    function: OpenAiFunction {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.parameters.clone(),
                    },
                })
                .collect(),
        )
    }

    fn build_request_body(&self, request: &LlmRequest) -> OpenAiRequest {
        OpenAiRequest {
            model: self.model.clone(),
            messages: Self::build_messages(request),
            tools: Self::build_tools(request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn into_llm_response(response: OpenAiResponse) -> Result<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ItineraError::Llm("No choices in OpenAI response".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            finish_reason: choice.finish_reason,
            tool_calls,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        debug!(
            model = %self.model,
            messages = body.messages.len(),
            tools = request.tools.len(),
            "Sending chat completion request"
        );

        let mut http_req = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| ItineraError::Llm(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ItineraError::Llm(format!(
                "OpenAI API error {status}: {body_text}"
            )));
        }

        let oai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ItineraError::Llm(format!("Failed to parse OpenAI response: {e}")))?;

        Self::into_llm_response(oai_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatMessage, ToolDefinition};

    #[test]
    fn request_body_matches_openai_format() {
        let client = OpenAiClient::new(None, "gpt-4o".to_string(), Some("sk-test".to_string()));
        let request = LlmRequest {
            system_prompt: Some("You are a travel researcher.".to_string()),
            messages: vec![ChatMessage::user("Research Lisbon")],
            tools: vec![ToolDefinition {
                name: "weather_info".to_string(),
                description: "Get weather".to_string(),
                parameters: serde_json::json!({"type": "object"}),
            }],
            temperature: Some(0.7),
            max_tokens: Some(512),
        };

        let body = client.build_request_body(&request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 512);

        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Research Lisbon");

        let tools = json["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "weather_info");
    }

    #[test]
    fn request_body_omits_optional_fields() {
        let client = OpenAiClient::new(None, "gpt-4o".to_string(), None);
        let request = LlmRequest {
            messages: vec![ChatMessage::user("Hello")],
            ..Default::default()
        };

        let json = serde_json::to_value(client.build_request_body(&request)).unwrap();

        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn tool_turns_are_serialized_with_ids() {
        let client = OpenAiClient::new(None, "gpt-4o".to_string(), None);
        let call = ToolCall {
            id: "call_abc".to_string(),
            name: "duckduckgo_search".to_string(),
            arguments: r#"{"query":"Lisbon trams"}"#.to_string(),
        };
        let request = LlmRequest {
            messages: vec![
                ChatMessage::user("Plan transport"),
                ChatMessage::assistant_tool_calls("", vec![call]),
                ChatMessage::tool_result("call_abc", "1. Tram 28"),
            ],
            ..Default::default()
        };

        let json = serde_json::to_value(client.build_request_body(&request)).unwrap();
        let messages = json["messages"].as_array().unwrap();

        assert_eq!(messages[1]["tool_calls"][0]["id"], "call_abc");
        assert_eq!(messages[1]["tool_calls"][0]["type"], "function");
        assert_eq!(
            messages[1]["tool_calls"][0]["function"]["name"],
            "duckduckgo_search"
        );
        assert_eq!(messages[2]["role"], "tool");
        assert_eq!(messages[2]["tool_call_id"], "call_abc");
    }

    #[test]
    fn response_with_tool_calls_is_converted() {
        let raw = r#"{
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "weather_info", "arguments": "{\"location\":\"Tokyo\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7}
        }"#;
        let parsed: OpenAiResponse = serde_json::from_str(raw).unwrap();
        let response = OpenAiClient::into_llm_response(parsed).unwrap();

        assert!(response.content.is_empty());
        assert!(response.wants_tools());
        assert_eq!(response.tool_calls[0].name, "weather_info");
        assert_eq!(response.tool_calls[0].arguments, r#"{"location":"Tokyo"}"#);
        assert_eq!(response.finish_reason.as_deref(), Some("tool_calls"));
        assert_eq!(response.usage.unwrap().completion_tokens, 7);
    }

    #[test]
    fn response_without_choices_is_an_error() {
        let parsed: OpenAiResponse =
            serde_json::from_str(r#"{"model": "gpt-4o", "choices": []}"#).unwrap();
        assert!(OpenAiClient::into_llm_response(parsed).is_err());
    }

    #[test]
    fn default_base_url_is_openai() {
        let client = OpenAiClient::new(None, "gpt-4o".to_string(), None);
        assert_eq!(client.base_url, "https://api.openai.com");

        let local = OpenAiClient::new(
            Some("http://localhost:11434/".to_string()),
            "llama3".to_string(),
            None,
        );
        assert_eq!(local.base_url, "http://localhost:11434");
    }
}
