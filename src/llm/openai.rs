//! async-openai backed chat model.

use super::{
    ChatModel, Message, ModelError, ModelReply, Role, ToolCall, ToolDescriptor, MAX_OUTPUT_TOKENS,
    TEMPERATURE,
};
use crate::config::EndpointSettings;
use crate::error::Result;
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequestArgs,
    FunctionCall, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Chat model served by an OpenAI-compatible endpoint.
pub struct OpenAIChatModel {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAIChatModel {
    /// Create a model client for the given endpoint.
    pub fn new(endpoint: &EndpointSettings, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(endpoint, api_key)?,
            model: endpoint.model.clone(),
            timeout: endpoint.timeout(),
        })
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> std::result::Result<ModelReply, ModelError> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ModelError::Provider(e.to_string()))?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(request_messages)
            .temperature(TEMPERATURE)
            .max_completion_tokens(MAX_OUTPUT_TOKENS);

        if !tools.is_empty() {
            args.tools(tools.iter().map(to_function_tool).collect::<Vec<_>>())
                .tool_choice(ChatCompletionToolChoiceOption::Auto);
        }

        let request = args
            .build()
            .map_err(|e| ModelError::Provider(e.to_string()))?;

        debug!(
            "Chat completion: model={}, messages={}, tools={}",
            self.model,
            messages.len(),
            tools.len()
        );

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| ModelError::Timeout(format!("no response after {:?}", self.timeout)))?
            .map_err(classify_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Provider("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                raw_arguments: call.function.arguments,
            })
            .collect();

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn classify_error(error: OpenAIError) -> ModelError {
    match &error {
        OpenAIError::Reqwest(e) if e.is_timeout() => ModelError::Timeout(e.to_string()),
        OpenAIError::Reqwest(e) if e.is_connect() => ModelError::Connection(e.to_string()),
        _ => ModelError::Provider(error.to_string()),
    }
}

fn to_function_tool(descriptor: &ToolDescriptor) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: descriptor.name.clone(),
            description: Some(descriptor.description.clone()),
            parameters: Some(descriptor.parameters.clone()),
            strict: None,
        },
    }
}

fn to_request_message(
    message: &Message,
) -> std::result::Result<ChatCompletionRequestMessage, OpenAIError> {
    let content = message.content.clone().unwrap_or_default();

    let request = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = message.content.as_ref().filter(|c| !c.is_empty()) {
                args.content(text.clone());
            }
            if !message.tool_calls.is_empty() {
                args.tool_calls(
                    message
                        .tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.raw_arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build()?.into()
        }
        Role::Tool => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(message.tool_call_id.clone().unwrap_or_default())
            .content(content)
            .build()?
            .into(),
    };

    Ok(request)
}
