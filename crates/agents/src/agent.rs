//! Model-backed agent with a bounded function-calling loop.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use itinera_common::{Result, TaskSpec};
use itinera_llm::{ChatMessage, LlmClient, LlmRequest, ToolCall, ToolDefinition};
use itinera_tools::Tool;
use tracing::{debug, info, warn};

use crate::roles::RoleDefinition;
use crate::traits::Agent;

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

/// An agent for one role, answering through a language model and its tools.
pub struct LlmAgent {
    role: RoleDefinition,
    system_prompt: String,
    llm: Arc<dyn LlmClient>,
    tools: Vec<Arc<dyn Tool>>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_tool_rounds: usize,
}

impl LlmAgent {
    pub fn new(role: RoleDefinition, llm: Arc<dyn LlmClient>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            system_prompt: role.system_prompt(),
            role,
            llm,
            tools,
            temperature: None,
            max_tokens: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters(),
            })
            .collect()
    }

    fn request(&self, messages: &[ChatMessage], tools: Vec<ToolDefinition>) -> LlmRequest {
        LlmRequest {
            system_prompt: Some(self.system_prompt.clone()),
            messages: messages.to_vec(),
            tools,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn finish(&self, answer: String) -> String {
        if answer.trim().is_empty() {
            warn!(agent = %self.role.key, "Model returned an empty answer");
        }
        answer
    }

    /// Run one requested tool call. Failures come back as text for the model.
    async fn invoke(&self, call: &ToolCall) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            warn!(agent = %self.role.key, tool = %call.name, "Model requested unknown tool");
            return format!(
                "Error: unknown tool '{}'. Available tools: {}",
                call.name,
                self.tool_names().join(", ")
            );
        };

        let arguments = if call.arguments.trim().is_empty() {
            serde_json::json!({})
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(value) => value,
                Err(e) => return format!("Error: malformed arguments for {}: {e}", call.name),
            }
        };

        let start = Instant::now();
        let output = tool.call(arguments).await;
        debug!(
            agent = %self.role.key,
            tool = %call.name,
            output_len = output.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Tool call finished"
        );
        output
    }
}

/// User turn for a task: instructions, expected output, then upstream context.
pub fn task_prompt(task: &TaskSpec, context: &str) -> String {
    let mut prompt = task.description.clone();
    if !task.expected_output.is_empty() {
        prompt.push_str("\n\nExpected output: ");
        prompt.push_str(&task.expected_output);
    }
    if !context.trim().is_empty() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(context);
    }
    prompt
}

#[async_trait]
impl Agent for LlmAgent {
    fn id(&self) -> &str {
        self.role.key
    }

    fn name(&self) -> &str {
        self.role.name
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    async fn perform(&self, task: &TaskSpec, context: &str) -> Result<String> {
        info!(
            agent = %self.role.key,
            stage = %task.stage,
            tools = self.tools.len(),
            "Processing task"
        );

        let mut messages = vec![ChatMessage::user(task_prompt(task, context))];
        let definitions = self.tool_definitions();

        if !definitions.is_empty() {
            for round in 0..self.max_tool_rounds {
                let response = self
                    .llm
                    .complete(self.request(&messages, definitions.clone()))
                    .await?;

                if !response.wants_tools() {
                    return Ok(self.finish(response.content));
                }

                debug!(
                    agent = %self.role.key,
                    round = round + 1,
                    calls = response.tool_calls.len(),
                    "Model requested tools"
                );

                let calls = response.tool_calls;
                messages.push(ChatMessage::assistant_tool_calls(
                    response.content,
                    calls.clone(),
                ));
                for call in &calls {
                    let output = self.invoke(call).await;
                    messages.push(ChatMessage::tool_result(call.id.clone(), output));
                }
            }

            warn!(
                agent = %self.role.key,
                rounds = self.max_tool_rounds,
                "Tool round limit reached, requesting final answer"
            );
            messages.push(ChatMessage::user(
                "You have used all available tool calls. Give your best final answer now using the information gathered.",
            ));
        }

        let response = self.llm.complete(self.request(&messages, Vec::new())).await?;
        Ok(self.finish(response.content))
    }
}
