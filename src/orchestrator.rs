//! Request orchestrator for Coursemate.
//!
//! Runs one question end to end: builds the opening transcript, drives the
//! tool rounds, and hands over to synthesis or fallback formatting. Every
//! path ends in answer text; model failures become fixed messages.

use crate::agent::round::execute_tool_calls;
use crate::agent::{
    execute_round, format_single_result, format_tool_results, should_continue, RoundResult,
    Synthesizer, PLACEHOLDER_SUBJECT,
};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::{ChatModel, Message, ModelError, OpenAIChatModel, ToolDescriptor, Transcript};
use crate::tools::{Source, ToolArgs, ToolRegistry};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Answer when the request produced no rounds at all.
pub const NO_ROUNDS_MESSAGE: &str = "I apologize, but I couldn't process your request.";

/// Answer when the model finished without any text.
pub const NO_RESPONSE_MESSAGE: &str = "I apologize, but I couldn't generate a proper response.";

/// Answer when an inline tool call could not be understood.
pub const UNREADABLE_CALL_MESSAGE: &str = "I attempted to search for information but encountered an issue with the response format. Could you please rephrase your question?";

/// Marker of a tool call the model wrote into its text instead of the tool-call field.
const RAW_CALL_MARKER: &str = "<|start|>assistant";

/// Pattern of the inline call: function name, then a JSON object of arguments.
const RAW_CALL_PATTERN: &str = r"to=functions\.(\w+)<\|constrain\|>json<\|message\|>(\{.*?\})";

/// Behavior switches for one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Round ceiling per request.
    pub max_rounds: usize,
    /// Multi-round tool calling; off means the single-round path.
    pub sequential: bool,
    /// Fall back to formatted tool output when synthesis fails.
    pub synthesis_fallback: bool,
    /// Never ask the model to synthesize; format tool output directly.
    pub skip_synthesis: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            sequential: true,
            synthesis_fallback: true,
            skip_synthesis: false,
        }
    }
}

impl OrchestratorOptions {
    /// Options for the active provider.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_rounds: settings.tools.max_rounds(),
            sequential: settings.tools.sequential,
            synthesis_fallback: settings.tools.synthesis_fallback,
            skip_synthesis: settings.provider.endpoint().skip_synthesis,
        }
    }
}

/// Answer text with the sources cited by the tools of the same request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub text: String,
    pub sources: Vec<Source>,
}

impl Outcome {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }

    fn cited(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }
}

/// Drives one question through the model and the tools.
pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts, options: OrchestratorOptions) -> Self {
        Self {
            model,
            prompts,
            options,
        }
    }

    /// Build an orchestrator for the configured provider.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let endpoint = settings.provider.endpoint();
        info!(
            "Using {} provider ({} at {})",
            settings.provider.active, endpoint.model, endpoint.base_url
        );
        let model = OpenAIChatModel::new(endpoint, &settings.provider.api_key())?;

        Ok(Self::new(
            Arc::new(model),
            prompts,
            OrchestratorOptions::from_settings(settings),
        ))
    }

    /// Answer `query`, optionally with prior conversation and tools.
    ///
    /// Without tools or a registry, or with sequential calling switched off,
    /// this takes the single-round path.
    pub async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolDescriptor],
        registry: Option<&ToolRegistry>,
    ) -> String {
        self.respond(query, history, tools, registry).await.text
    }

    /// Like [`Orchestrator::run`], also returning the sources this request cited.
    ///
    /// Sources come from the request's own rounds, never from registry state,
    /// so concurrent requests cannot see each other's citations.
    #[instrument(skip(self, history, tools, registry), fields(query = %query))]
    pub async fn respond(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &[ToolDescriptor],
        registry: Option<&ToolRegistry>,
    ) -> Outcome {
        let transcript = self.initial_transcript(query, history, tools);

        match registry {
            Some(registry) if self.options.sequential && !tools.is_empty() => {
                self.run_rounds(transcript, tools, registry).await
            }
            _ => self.run_single_round(transcript, tools, registry).await,
        }
    }

    /// System message followed by the user's question.
    fn initial_transcript(&self, query: &str, history: Option<&str>, tools: &[ToolDescriptor]) -> Transcript {
        let vars = HashMap::from([(
            "max_rounds".to_string(),
            self.options.max_rounds.max(1).to_string(),
        )]);
        let mut system = self
            .prompts
            .render_with_custom(&self.prompts.assistant.system, &vars);

        if !tools.is_empty() {
            system.push_str(&tool_instructions(tools, &self.prompts.assistant.tool_guidelines));
        }

        if let Some(history) = history.filter(|h| !h.trim().is_empty()) {
            system.push_str("\n\nPrevious conversation:\n");
            system.push_str(history);
        }

        let mut transcript = Transcript::new();
        transcript.push(Message::system(system));
        transcript.push(Message::user(query));
        transcript
    }

    async fn run_rounds(
        &self,
        mut transcript: Transcript,
        tools: &[ToolDescriptor],
        registry: &ToolRegistry,
    ) -> Outcome {
        let max_rounds = self.options.max_rounds.max(1);
        let mut rounds: Vec<RoundResult> = Vec::new();

        for round_number in 1..=max_rounds {
            info!("Starting tool round {}", round_number);
            let result = execute_round(self.model.as_ref(), &mut transcript, tools, registry, round_number).await;

            if let Some(e) = &result.error {
                error!("Round {} failed: {}", round_number, e);
                if rounds.is_empty() {
                    return Outcome::text(failure_message(e));
                }
                let text = self.synthesizer().synthesize(&mut transcript, &rounds).await;
                return Outcome::cited(text, cited_sources(&rounds));
            }

            let stop = result.should_stop;
            rounds.push(result);

            if stop || !should_continue(&rounds, round_number, max_rounds) {
                break;
            }
        }

        let Some(last) = rounds.last() else {
            return Outcome::text(NO_ROUNDS_MESSAGE);
        };

        let sources = cited_sources(&rounds);
        if !last.had_tool_calls {
            let text = transcript
                .last_assistant_content()
                .unwrap_or(NO_RESPONSE_MESSAGE);
            return Outcome::cited(text, sources);
        }

        let text = self.synthesizer().synthesize(&mut transcript, &rounds).await;
        Outcome::cited(text, sources)
    }

    /// One model call, the tools it asks for, then one answer call.
    async fn run_single_round(
        &self,
        mut transcript: Transcript,
        tools: &[ToolDescriptor],
        registry: Option<&ToolRegistry>,
    ) -> Outcome {
        info!("Single-round call - model: {}", self.model.model_name());

        let reply = match self.model.complete(transcript.messages(), tools).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Model call failed: {}", e);
                return Outcome::text(failure_message(&e));
            }
        };
        info!("Received response with tool calls: {}", reply.has_tool_calls());

        if let Some(registry) = registry.filter(|_| reply.has_tool_calls()) {
            let calls = reply.tool_calls.clone();
            transcript.push(reply.into_message());
            let executed = execute_tool_calls(&calls, &mut transcript, registry, 1).await;

            if self.options.skip_synthesis {
                info!("Skipping synthesis for this provider");
                let text = format_tool_results(&executed.tool_results, PLACEHOLDER_SUBJECT);
                return Outcome::cited(text, executed.sources);
            }

            let question = transcript
                .first_user_content()
                .unwrap_or(PLACEHOLDER_SUBJECT)
                .to_string();
            let text = self
                .synthesizer()
                .final_answer(&transcript, &executed.tool_results, &question)
                .await;
            return Outcome::cited(text, executed.sources);
        }

        match reply.content {
            Some(content) if content.contains(RAW_CALL_MARKER) => {
                answer_from_raw_call(&content, registry).await
            }
            Some(content) if !content.is_empty() => Outcome::text(content),
            _ => Outcome::text(NO_RESPONSE_MESSAGE),
        }
    }

    fn synthesizer(&self) -> Synthesizer<'_> {
        Synthesizer::new(
            self.model.as_ref(),
            &self.prompts,
            self.options.skip_synthesis,
            self.options.synthesis_fallback,
        )
    }
}

/// Fixed answer for a model failure with nothing to recover from.
pub fn failure_message(error: &ModelError) -> String {
    match error {
        ModelError::Timeout(_) => "I apologize, but the response took longer than expected to generate. Please try asking a simpler question or try again later.".to_string(),
        ModelError::Connection(_) => "I'm having trouble connecting to the language model. Please ensure the model server is running at the configured URL.".to_string(),
        ModelError::Provider(_) => format!("An error occurred while generating the response: {}", error),
    }
}

/// Sources of the latest round whose tools cited any.
fn cited_sources(rounds: &[RoundResult]) -> Vec<Source> {
    rounds
        .iter()
        .rev()
        .find(|r| !r.sources.is_empty())
        .map(|r| r.sources.clone())
        .unwrap_or_default()
}

/// Tool list with parameters, followed by the usage guidelines.
fn tool_instructions(tools: &[ToolDescriptor], guidelines: &str) -> String {
    let mut text = String::from("\n\nAVAILABLE TOOLS:\n");

    for tool in tools {
        text.push_str(&format!("- {}: {}\n", tool.name, tool.description));

        let params: Vec<String> = tool
            .parameter_list()
            .into_iter()
            .map(|p| {
                let kind = if p.required { "required" } else { "optional" };
                format!("{} ({}): {}", p.name, kind, p.description)
            })
            .collect();
        if !params.is_empty() {
            text.push_str(&format!("  Parameters: {}\n", params.join("; ")));
        }
    }

    text.push('\n');
    text.push_str(guidelines);
    text
}

/// Extract the function name and arguments of an inline tool call.
fn parse_raw_tool_call(content: &str) -> Option<(String, ToolArgs)> {
    let pattern = Regex::new(RAW_CALL_PATTERN).ok()?;
    let captures = pattern.captures(content)?;
    let name = captures.get(1)?.as_str().to_string();
    let args = serde_json::from_str::<ToolArgs>(captures.get(2)?.as_str()).ok()?;
    Some((name, args))
}

/// Run a tool call written inline in the reply text and present its result.
async fn answer_from_raw_call(content: &str, registry: Option<&ToolRegistry>) -> Outcome {
    let (Some(registry), Some((name, args))) = (registry, parse_raw_tool_call(content)) else {
        warn!("Could not run inline tool call");
        return Outcome::text(UNREADABLE_CALL_MESSAGE);
    };

    info!("Running inline tool call: {}", name);
    let query = args
        .get("query")
        .and_then(|q| q.as_str())
        .unwrap_or(PLACEHOLDER_SUBJECT)
        .to_string();

    let execution = registry.execute(&name, &args).await;
    if execution.succeeded() && !execution.content.is_empty() && !execution.content.starts_with("No") {
        Outcome::cited(format_single_result(&execution.content, &query), execution.sources)
    } else {
        Outcome::text(format!(
            "I couldn't find specific information about {} in the course materials.",
            query
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::ScriptedModel;
    use crate::llm::{ModelReply, Role, ToolCall};
    use crate::tools::test_support::StubTool;
    use serde_json::json;

    fn call(id: &str, query: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "search".to_string(),
            raw_arguments: json!({ "query": query }).to_string(),
        }
    }

    fn tool_round(id: &str, query: &str) -> std::result::Result<ModelReply, ModelError> {
        Ok(ModelReply::with_tool_calls(vec![call(id, query)]))
    }

    fn registry_with(result: &str) -> (ToolRegistry, Arc<StubTool>) {
        let tool = Arc::new(StubTool::new("search", result));
        let mut registry = ToolRegistry::new();
        registry.register(tool.clone()).unwrap();
        (registry, tool)
    }

    fn orchestrator(model: &Arc<ScriptedModel>, options: OrchestratorOptions) -> Orchestrator {
        Orchestrator::new(model.clone(), Prompts::default(), options)
    }

    #[tokio::test]
    async fn test_direct_answer_without_tools() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text("I'm well, thanks!"))]));
        let (registry, tool) = registry_with("[MCP - Lesson 1]\nunused");
        let orch = orchestrator(&model, OrchestratorOptions::default());

        let answer = orch
            .run("Hello, how are you?", None, &registry.tool_definitions(), Some(&registry))
            .await;

        assert_eq!(answer, "I'm well, thanks!");
        assert_eq!(model.call_count(), 1);
        assert_eq!(tool.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_tool_output_is_paired_but_not_counted() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "boom"),
            Ok(ModelReply::text("Nothing useful found")),
        ]));
        let (registry, tool) = registry_with("Tool execution failed: boom");
        let orch = orchestrator(&model, OrchestratorOptions::default());

        let answer = orch
            .run("What is MCP?", None, &registry.tool_definitions(), Some(&registry))
            .await;

        // Unproductive round stops the loop before round two
        assert_eq!(answer, "Nothing useful found");
        assert_eq!(tool.call_count(), 1);
        assert_eq!(model.call_count(), 2);

        let synthesis = &model.requests()[1];
        assert!(synthesis.tool_names.is_empty());
        let paired = synthesis
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .unwrap();
        assert_eq!(paired.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(paired.content.as_deref(), Some("Tool execution failed: boom"));
    }

    #[tokio::test]
    async fn test_two_rounds_then_synthesis() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            tool_round("call_2", "MCP clients"),
            Ok(ModelReply::text("Servers and clients explained")),
        ]));
        let (registry, tool) = registry_with("[MCP - Lesson 1]\nServers expose tools");
        let orch = orchestrator(&model, OrchestratorOptions::default());

        let answer = orch
            .run("How do MCP servers and clients work?", None, &registry.tool_definitions(), Some(&registry))
            .await;

        assert_eq!(answer, "Servers and clients explained");
        assert_eq!(model.call_count(), 3);
        assert_eq!(tool.call_count(), 2);

        let requests = model.requests();
        assert_eq!(requests[0].tool_names, vec!["search"]);
        assert_eq!(requests[1].tool_names, vec!["search"]);
        assert!(requests[2].tool_names.is_empty());
        // Every call id is answered before the next model call
        assert_eq!(requests[1].messages.last().unwrap().tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_sources_come_from_the_request_rounds() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            Ok(ModelReply::text("Servers expose tools.")),
        ]));
        let mut tool = StubTool::new("search", "[MCP - Lesson 1]\nServers expose tools");
        tool.sources = vec![Source {
            label: "MCP - Lesson 1".to_string(),
            url: Some("https://example.com/mcp/1".to_string()),
        }];
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(tool)).unwrap();
        let orch = orchestrator(&model, OrchestratorOptions::default());

        let outcome = orch
            .respond("What is MCP?", None, &registry.tool_definitions(), Some(&registry))
            .await;
        registry.reset_sources();

        assert_eq!(outcome.text, "Servers expose tools.");
        assert_eq!(outcome.sources.len(), 1);
        assert_eq!(outcome.sources[0].label, "MCP - Lesson 1");
    }

    #[tokio::test]
    async fn test_synthesis_timeout_falls_back_to_formatted_results() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            tool_round("call_2", "MCP clients"),
            Err(ModelError::Timeout("synthesis".to_string())),
        ]));
        let (registry, _tool) = registry_with("[MCP - Lesson 1]\nServers expose tools");
        let orch = orchestrator(&model, OrchestratorOptions::default());
        let query = "How do MCP servers work?";

        let answer = orch.run(query, None, &registry.tool_definitions(), Some(&registry)).await;

        let results = vec!["[MCP - Lesson 1]\nServers expose tools".to_string(); 2];
        assert_eq!(answer, format_tool_results(&results, query));
    }

    #[tokio::test]
    async fn test_first_round_failures_map_to_fixed_messages() {
        let (registry, _tool) = registry_with("unused");
        let cases = [
            (ModelError::Timeout("t".to_string()), "took longer than expected"),
            (ModelError::Connection("c".to_string()), "trouble connecting"),
            (ModelError::Provider("bad gateway".to_string()), "An error occurred while generating the response"),
        ];

        for (error, expected) in cases {
            let model = Arc::new(ScriptedModel::new(vec![Err(error)]));
            let orch = orchestrator(&model, OrchestratorOptions::default());
            let answer = orch.run("q", None, &registry.tool_definitions(), Some(&registry)).await;
            assert!(answer.contains(expected), "{}", answer);
            assert_eq!(model.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_later_round_failure_synthesizes_prior_rounds() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            Err(ModelError::Connection("dropped".to_string())),
            Ok(ModelReply::text("From round one")),
        ]));
        let (registry, tool) = registry_with("[MCP - Lesson 1]\nServers expose tools");
        let options = OrchestratorOptions {
            max_rounds: 3,
            ..OrchestratorOptions::default()
        };
        let orch = orchestrator(&model, options);

        let answer = orch.run("What is MCP?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(answer, "From round one");
        assert_eq!(tool.call_count(), 1);
        let synthesis = &model.requests()[2];
        assert_eq!(synthesis.messages.iter().filter(|m| m.role == Role::Tool).count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_query_stops_early() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP basics"),
            tool_round("call_2", "MCP basics"),
            Ok(ModelReply::text("Done")),
        ]));
        let (registry, tool) = registry_with("[MCP - Lesson 0]\nIntro");
        let options = OrchestratorOptions {
            max_rounds: 5,
            ..OrchestratorOptions::default()
        };
        let orch = orchestrator(&model, options);

        let answer = orch.run("MCP basics?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(answer, "Done");
        assert_eq!(model.call_count(), 3);
        assert_eq!(tool.call_count(), 2);
    }

    #[tokio::test]
    async fn test_model_finishing_in_round_two_skips_synthesis() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            Ok(ModelReply::text("MCP servers expose tools.")),
        ]));
        let (registry, _tool) = registry_with("[MCP - Lesson 1]\nServers expose tools");
        let orch = orchestrator(&model, OrchestratorOptions::default());

        let answer = orch.run("What is MCP?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(answer, "MCP servers expose tools.");
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_final_reply_gets_apology() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::default())]));
        let (registry, _tool) = registry_with("unused");
        let orch = orchestrator(&model, OrchestratorOptions::default());

        let answer = orch.run("q", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(answer, NO_RESPONSE_MESSAGE);
    }

    #[tokio::test]
    async fn test_system_message_lists_tools_and_history() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text("ok"))]));
        let (registry, _tool) = registry_with("unused");
        let orch = orchestrator(&model, OrchestratorOptions::default());

        orch.run(
            "And lesson 2?",
            Some("User: What is MCP?\nAssistant: A protocol."),
            &registry.tool_definitions(),
            Some(&registry),
        )
        .await;

        let messages = &model.requests()[0].messages;
        assert_eq!(messages.len(), 2);
        let system = messages[0].content.as_deref().unwrap();
        assert!(system.contains("up to 2 rounds"));
        assert!(system.contains("AVAILABLE TOOLS:\n- search: Stub tool\n  Parameters: query (required): Search query\n"));
        assert!(system.contains("TOOL USAGE GUIDELINES:"));
        assert!(system.ends_with("Previous conversation:\nUser: What is MCP?\nAssistant: A protocol."));
        assert_eq!(messages[1].content.as_deref(), Some("And lesson 2?"));
    }

    #[tokio::test]
    async fn test_single_round_path_when_not_sequential() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            Ok(ModelReply::text("Single-round answer")),
        ]));
        let (registry, tool) = registry_with("[MCP - Lesson 1]\nServers expose tools");
        let options = OrchestratorOptions {
            sequential: false,
            ..OrchestratorOptions::default()
        };
        let orch = orchestrator(&model, options);

        let answer = orch.run("What is MCP?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(answer, "Single-round answer");
        assert_eq!(tool.call_count(), 1);
        let requests = model.requests();
        assert_eq!(requests[0].tool_names, vec!["search"]);
        assert!(requests[1].tool_names.is_empty());
    }

    #[tokio::test]
    async fn test_single_round_empty_answer_falls_back() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            Ok(ModelReply::text("  ")),
        ]));
        let (registry, _tool) = registry_with("[MCP - Lesson 1]\nServers expose tools");
        let options = OrchestratorOptions {
            sequential: false,
            ..OrchestratorOptions::default()
        };
        let orch = orchestrator(&model, options);

        let answer = orch.run("What is MCP?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(
            answer,
            format_tool_results(&["[MCP - Lesson 1]\nServers expose tools".to_string()], "What is MCP?")
        );
    }

    #[tokio::test]
    async fn test_skip_synthesis_formats_directly() {
        let model = Arc::new(ScriptedModel::new(vec![
            tool_round("call_1", "MCP servers"),
            tool_round("call_2", "MCP clients"),
        ]));
        let (registry, _tool) = registry_with("[MCP - Lesson 1]\nServers expose tools");
        let options = OrchestratorOptions {
            skip_synthesis: true,
            ..OrchestratorOptions::default()
        };
        let orch = orchestrator(&model, options);

        let answer = orch.run("What is MCP?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(model.call_count(), 2);
        let rounds = vec!["[MCP - Lesson 1]\nServers expose tools".to_string(); 2];
        assert_eq!(answer, format_tool_results(&rounds, PLACEHOLDER_SUBJECT));
    }

    #[tokio::test]
    async fn test_no_registry_takes_single_round_path() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text("Plain answer"))]));
        let orch = orchestrator(&model, OrchestratorOptions::default());

        let answer = orch.run("What is MCP?", None, &[], None).await;

        assert_eq!(answer, "Plain answer");
        let request = &model.requests()[0];
        assert!(request.tool_names.is_empty());
        assert!(!request.messages[0].content.as_deref().unwrap().contains("AVAILABLE TOOLS"));
    }

    #[tokio::test]
    async fn test_inline_tool_call_is_executed() {
        let raw = r#"<|start|>assistant<|channel|>commentary to=functions.search<|constrain|>json<|message|>{"query":"MCP"}"#;
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text(raw))]));
        let (registry, tool) = registry_with("[MCP - Lesson 1]\nServers expose tools.");
        let options = OrchestratorOptions {
            sequential: false,
            ..OrchestratorOptions::default()
        };
        let orch = orchestrator(&model, options);

        let answer = orch.run("What is MCP?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(tool.call_count(), 1);
        assert_eq!(
            answer,
            "Based on the course materials, here's what I found about MCP:\n\nServers expose tools."
        );
    }

    #[tokio::test]
    async fn test_unreadable_inline_call() {
        let raw = "<|start|>assistant<|channel|>commentary something else";
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelReply::text(raw))]));
        let (registry, tool) = registry_with("unused");
        let options = OrchestratorOptions {
            sequential: false,
            ..OrchestratorOptions::default()
        };
        let orch = orchestrator(&model, options);

        let answer = orch.run("What is MCP?", None, &registry.tool_definitions(), Some(&registry)).await;

        assert_eq!(answer, UNREADABLE_CALL_MESSAGE);
        assert_eq!(tool.call_count(), 0);
    }

    #[test]
    fn test_parse_raw_tool_call() {
        let (name, args) = parse_raw_tool_call(
            r#"x to=functions.get_course_outline<|constrain|>json<|message|>{"course_title":"MCP"} trailing"#,
        )
        .unwrap();
        assert_eq!(name, "get_course_outline");
        assert_eq!(args["course_title"], "MCP");
        assert!(parse_raw_tool_call("to=functions.search<|constrain|>json<|message|>{oops}").is_none());
    }

    #[test]
    fn test_options_follow_active_provider() {
        let mut settings = Settings::default();
        settings.tools.max_rounds = 0;
        settings.provider.anthropic.skip_synthesis = true;

        let options = OrchestratorOptions::from_settings(&settings);
        assert_eq!(options.max_rounds, 1);
        assert!(options.skip_synthesis);

        settings.provider.active = crate::config::ProviderKind::OpenAI;
        assert!(!OrchestratorOptions::from_settings(&settings).skip_synthesis);
    }
}
