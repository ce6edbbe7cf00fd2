pub mod client;
pub mod config;
pub mod openai;

pub use client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage, ToolCall, ToolDefinition,
};
pub use config::{LlmConfig, build_llm_client};
pub use openai::OpenAiClient;
