//! One round of tool calling: a model call plus the tools it requested.

use crate::llm::{ChatModel, Message, ModelError, ToolCall, ToolDescriptor, Transcript};
use crate::tools::{failure_message, Source, ToolArgs, ToolExecution, ToolRegistry, ToolStatus};
use serde_json::Value;
use tracing::{debug, error, info};

/// Outcome of one completed (or failed) round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    /// 1-based round number.
    pub round_number: usize,
    pub had_tool_calls: bool,
    /// Successful tool outputs, in call order.
    pub tool_results: Vec<String>,
    /// `query` arguments of this round's tool calls, in call order.
    pub queries_executed: Vec<String>,
    pub should_stop: bool,
    /// Sources reported by this round's tools, last citing call wins.
    pub sources: Vec<Source>,
    /// Set when the model call itself failed; the transcript is untouched then.
    pub error: Option<ModelError>,
}

impl RoundResult {
    fn finished(round_number: usize) -> Self {
        Self {
            round_number,
            had_tool_calls: false,
            tool_results: Vec::new(),
            queries_executed: Vec::new(),
            should_stop: true,
            sources: Vec::new(),
            error: None,
        }
    }

    fn failed(round_number: usize, error: ModelError) -> Self {
        Self {
            error: Some(error),
            ..Self::finished(round_number)
        }
    }
}

/// Tool results and queries collected while executing a batch of calls.
#[derive(Debug, Default)]
pub(crate) struct ExecutedCalls {
    pub tool_results: Vec<String>,
    pub queries_executed: Vec<String>,
    pub sources: Vec<Source>,
}

/// Execute one round, appending every resulting message to `transcript`.
pub async fn execute_round(
    model: &dyn ChatModel,
    transcript: &mut Transcript,
    tools: &[ToolDescriptor],
    registry: &ToolRegistry,
    round_number: usize,
) -> RoundResult {
    info!("Executing tool round {}", round_number);

    let reply = match model.complete(transcript.messages(), tools).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Model error in round {}: {}", round_number, e);
            return RoundResult::failed(round_number, e);
        }
    };

    if !reply.has_tool_calls() {
        info!("Round {}: model answered without tools", round_number);
        transcript.push(reply.into_message());
        return RoundResult::finished(round_number);
    }

    let calls = reply.tool_calls.clone();
    transcript.push(reply.into_message());

    let executed = execute_tool_calls(&calls, transcript, registry, round_number).await;

    RoundResult {
        round_number,
        had_tool_calls: true,
        tool_results: executed.tool_results,
        queries_executed: executed.queries_executed,
        should_stop: false,
        sources: executed.sources,
        error: None,
    }
}

/// Run `calls` in order, pairing each with exactly one tool-role message.
pub(crate) async fn execute_tool_calls(
    calls: &[ToolCall],
    transcript: &mut Transcript,
    registry: &ToolRegistry,
    round_number: usize,
) -> ExecutedCalls {
    let mut executed = ExecutedCalls::default();

    for call in calls {
        info!("Round {} tool call: {}", round_number, call.name);
        debug!("Raw arguments: {}", call.raw_arguments);

        let args = match parse_arguments(&call.raw_arguments) {
            Ok(args) => args,
            Err(reason) => {
                error!("Bad arguments for {} in round {}: {}", call.name, round_number, reason);
                transcript.push(Message::tool(&call.id, failure_message(reason)));
                continue;
            }
        };

        if let Some(query) = args.get("query").and_then(query_text) {
            executed.queries_executed.push(query);
        }

        let ToolExecution {
            content,
            status,
            sources,
        } = registry.execute(&call.name, &args).await;
        debug!("Tool result: {}", preview(&content));

        if status == ToolStatus::Succeeded && !content.is_empty() {
            executed.tool_results.push(content.clone());
            if !sources.is_empty() {
                executed.sources = sources;
            }
        }

        transcript.push(Message::tool(&call.id, content));
    }

    executed
}

/// Parse a raw argument payload into an object. Empty payloads mean no arguments.
pub(crate) fn parse_arguments(raw: &str) -> Result<ToolArgs, String> {
    if raw.trim().is_empty() {
        return Ok(ToolArgs::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("arguments must be a JSON object, got {}", other)),
        Err(e) => Err(format!("invalid JSON arguments: {}", e)),
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// First 200 characters, for logs.
pub(crate) fn preview(text: &str) -> String {
    let mut short: String = text.chars().take(200).collect();
    if short.len() < text.len() {
        short.push_str("...");
    }
    short
}
