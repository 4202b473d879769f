//! Chat model abstraction and the message types exchanged with it.
//!
//! The orchestration engine only talks to a [`ChatModel`]; the async-openai
//! backed implementation lives in [`openai`], a scripted one for tests in
//! [`mock`].

pub mod mock;
mod openai;

pub use openai::OpenAIChatModel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Sampling temperature used for every model call.
pub const TEMPERATURE: f32 = 0.0;

/// Output-token ceiling used for every model call.
pub const MAX_OUTPUT_TOKENS: u32 = 800;

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back on the tool-role reply.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// Argument payload exactly as the model produced it.
    pub raw_arguments: String,
}

/// One message of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content.into())
    }

    /// Assistant message, optionally carrying tool calls.
    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Tool-role reply paired with the call it answers.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: Role, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

/// Ordered, append-only message sequence for one request.
///
/// Messages can only be pushed; nothing already appended is ever changed or
/// removed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the first user message, i.e. the question being answered.
    pub fn first_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.as_deref())
    }

    /// Most recent assistant message with non-empty content.
    pub fn last_assistant_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .filter_map(|m| m.content.as_deref())
            .find(|c| !c.is_empty())
    }
}

/// Declared shape of a tool, as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON schema object with `properties` and `required`.
    pub parameters: Value,
}

/// A single parameter of a [`ToolDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameter {
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    /// Parameters sorted by name, flagged required or optional.
    pub fn parameter_list(&self) -> Vec<ToolParameter> {
        let required: Vec<&str> = self.parameters["required"]
            .as_array()
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        self.parameters["properties"]
            .as_object()
            .map(|props| {
                props
                    .iter()
                    .map(|(name, details)| ToolParameter {
                        name: name.clone(),
                        description: details["description"].as_str().unwrap_or_default().to_string(),
                        required: required.contains(&name.as_str()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The assistant turn returned by one model call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ModelReply {
    pub fn text(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The reply as a transcript message.
    pub fn into_message(self) -> Message {
        Message::assistant(self.content, self.tool_calls)
    }
}

/// Transport or provider failure during a model call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model call timed out: {0}")]
    Timeout(String),

    #[error("Could not connect to model: {0}")]
    Connection(String),

    #[error("Model provider error: {0}")]
    Provider(String),
}

impl ModelError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ModelError::Timeout(_))
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Issue one completion over `messages`.
    ///
    /// When `tools` is non-empty their schemas are attached with automatic
    /// tool selection; an empty slice sends no tool schema at all.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> std::result::Result<ModelReply, ModelError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_lookups() {
        let mut transcript = Transcript::new();
        transcript.push(Message::system("sys"));
        transcript.push(Message::user("What is MCP?"));
        transcript.push(Message::assistant(Some("first".to_string()), Vec::new()));
        transcript.push(Message::assistant(Some(String::new()), Vec::new()));
        transcript.push(Message::user("follow-up"));

        assert_eq!(transcript.first_user_content(), Some("What is MCP?"));
        assert_eq!(transcript.last_assistant_content(), Some("first"));
        assert_eq!(transcript.len(), 5);
    }

    #[test]
    fn test_parameter_list_marks_required() {
        let descriptor = ToolDescriptor::new(
            "search",
            "Search",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "What to search for"},
                    "lesson_number": {"type": "integer", "description": "Lesson"}
                },
                "required": ["query"]
            }),
        );

        let params = descriptor.parameter_list();
        assert_eq!(params.len(), 2);
        let query = params.iter().find(|p| p.name == "query").unwrap();
        assert!(query.required);
        assert_eq!(query.description, "What to search for");
        let lesson = params.iter().find(|p| p.name == "lesson_number").unwrap();
        assert!(!lesson.required);
    }

    #[test]
    fn test_parameter_list_without_schema() {
        let descriptor = ToolDescriptor::new("noop", "Nothing", json!({}));
        assert!(descriptor.parameter_list().is_empty());
    }
}
