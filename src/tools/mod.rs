//! Tool registry and the course tools the model can call.
//!
//! Every tool implements [`Tool`] and is registered by name in a
//! [`ToolRegistry`]. Execution through the registry never fails: errors,
//! timeouts and unknown names come back as failure-shaped text.

mod outline;
mod search;

pub use outline::CourseOutlineTool;
pub use search::CourseSearchTool;

use crate::error::{CoursemateError, Result};
use crate::llm::ToolDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Prefix of every failure-shaped tool result.
pub const FAILURE_PREFIX: &str = "Tool execution failed";

/// Parsed tool-call arguments.
pub type ToolArgs = Map<String, Value>;

/// Failure-shaped tool result text.
pub fn failure_message(reason: impl std::fmt::Display) -> String {
    format!("{}: {}", FAILURE_PREFIX, reason)
}

/// A citation for content returned by a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub label: String,
    pub url: Option<String>,
}

/// What a tool hands back on success.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    /// Sources backing `content`; empty for tools that do not cite.
    pub sources: Vec<Source>,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sources: Vec::new(),
        }
    }
}

/// A capability the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and argument schema advertised to the model.
    fn descriptor(&self) -> ToolDescriptor;

    /// Run the tool with parsed arguments.
    async fn execute(&self, args: &ToolArgs) -> Result<ToolOutput>;
}

/// Whether a registry execution produced usable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStatus {
    Succeeded,
    Failed,
}

/// Outcome of [`ToolRegistry::execute`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecution {
    pub content: String,
    pub status: ToolStatus,
    pub sources: Vec<Source>,
}

impl ToolExecution {
    fn failed(content: String) -> Self {
        Self {
            content,
            status: ToolStatus::Failed,
            sources: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == ToolStatus::Succeeded
    }
}

/// Name-keyed set of tools.
pub struct ToolRegistry {
    tools: Vec<(String, Arc<dyn Tool>)>,
    timeout: Duration,
    last_sources: Mutex<Vec<Source>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create an empty registry with a 30 second per-call timeout.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            timeout: Duration::from_secs(30),
            last_sources: Mutex::new(Vec::new()),
        }
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a tool under its descriptor name, replacing any previous one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.descriptor().name;
        if name.trim().is_empty() {
            return Err(CoursemateError::InvalidInput(
                "Tool must have a name in its definition".to_string(),
            ));
        }

        match self.tools.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = tool,
            None => self.tools.push((name, tool)),
        }
        Ok(())
    }

    /// Descriptors of all registered tools, in registration order.
    pub fn tool_definitions(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|(_, t)| t.descriptor()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name.
    ///
    /// Non-empty sources from a successful call replace the registry's last
    /// sources.
    pub async fn execute(&self, name: &str, args: &ToolArgs) -> ToolExecution {
        let Some((_, tool)) = self.tools.iter().find(|(n, _)| n == name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolExecution::failed(format!("Tool '{}' not found", name));
        };

        let output = match tokio::time::timeout(self.timeout, tool.execute(args)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Tool {} failed: {}", name, e);
                return ToolExecution::failed(failure_message(e));
            }
            Err(_) => {
                warn!("Tool {} timed out after {:?}", name, self.timeout);
                return ToolExecution::failed(failure_message(format!(
                    "timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        if output.content.starts_with(FAILURE_PREFIX) {
            return ToolExecution::failed(output.content);
        }

        if !output.sources.is_empty() {
            debug!("Tool {} recorded {} sources", name, output.sources.len());
            *self.lock_sources() = output.sources.clone();
        }

        ToolExecution {
            content: output.content,
            status: ToolStatus::Succeeded,
            sources: output.sources,
        }
    }

    /// Labels of the sources recorded by the most recent citing call.
    pub fn last_sources(&self) -> Vec<String> {
        self.lock_sources().iter().map(|s| s.label.clone()).collect()
    }

    /// Sources (label and link) recorded by the most recent citing call.
    pub fn last_source_links(&self) -> Vec<Source> {
        self.lock_sources().clone()
    }

    /// Forget recorded sources.
    pub fn reset_sources(&self) {
        self.lock_sources().clear();
    }

    fn lock_sources(&self) -> std::sync::MutexGuard<'_, Vec<Source>> {
        self.last_sources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Required string argument.
pub(crate) fn required_str<'a>(args: &'a ToolArgs, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| CoursemateError::InvalidInput(format!("Missing '{}' argument", key)))
}

/// Optional string argument; null and empty count as absent.
pub(crate) fn optional_str<'a>(args: &'a ToolArgs, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Optional non-negative integer argument. Accepts numeric strings.
pub(crate) fn optional_u32(args: &ToolArgs, key: &str) -> Result<Option<u32>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| CoursemateError::InvalidInput(format!("Invalid '{}' argument: {}", key, n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CoursemateError::InvalidInput(format!("Invalid '{}' argument: {}", key, s))),
        Some(other) => Err(CoursemateError::InvalidInput(format!(
            "Invalid '{}' argument: {}",
            key, other
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::StubTool;
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_unknown_tool_is_failure() {
        let registry = ToolRegistry::new();
        let execution = registry.execute("missing", &ToolArgs::new()).await;
        assert_eq!(execution.content, "Tool 'missing' not found");
        assert!(!execution.succeeded());
    }

    #[tokio::test]
    async fn test_tool_error_becomes_failure_text() {
        let mut registry = ToolRegistry::new();
        let mut tool = StubTool::new("search", "ignored");
        tool.fail = true;
        registry.register(Arc::new(tool)).unwrap();

        let execution = registry.execute("search", &args(json!({"query": "x"}))).await;
        assert_eq!(execution.content, "Tool execution failed: boom");
        assert_eq!(execution.status, ToolStatus::Failed);
    }

    #[tokio::test]
    async fn test_failure_shaped_output_is_failure() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(StubTool::new("search", "Tool execution failed: boom")))
            .unwrap();

        let execution = registry.execute("search", &args(json!({"query": "x"}))).await;
        assert!(!execution.succeeded());
        assert_eq!(execution.content, "Tool execution failed: boom");
    }

    #[tokio::test]
    async fn test_sources_recorded_and_reset() {
        let mut registry = ToolRegistry::new();
        let mut tool = StubTool::new("search", "[MCP - Lesson 1]\ncontent");
        tool.sources = vec![Source {
            label: "MCP - Lesson 1".to_string(),
            url: Some("https://example.com/1".to_string()),
        }];
        registry.register(Arc::new(tool)).unwrap();
        registry.register(Arc::new(StubTool::new("outline", "Course Title: MCP"))).unwrap();

        registry.execute("search", &args(json!({"query": "x"}))).await;
        // A tool without sources leaves the previous record in place
        registry.execute("outline", &args(json!({"query": "y"}))).await;

        assert_eq!(registry.last_sources(), vec!["MCP - Lesson 1".to_string()]);
        assert_eq!(
            registry.last_source_links()[0].url.as_deref(),
            Some("https://example.com/1")
        );

        registry.reset_sources();
        assert!(registry.last_sources().is_empty());
        assert!(registry.last_source_links().is_empty());
    }

    #[test]
    fn test_register_replaces_and_keeps_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StubTool::new("b", "1"))).unwrap();
        registry.register(Arc::new(StubTool::new("a", "2"))).unwrap();
        registry.register(Arc::new(StubTool::new("b", "3"))).unwrap();

        let names: Vec<String> = registry.tool_definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Arc::new(StubTool::new(" ", "x"))).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_argument_helpers() {
        let a = args(json!({"query": "mcp", "lesson_number": 5, "course_name": "", "n": "7", "bad": -1}));
        assert_eq!(required_str(&a, "query").unwrap(), "mcp");
        assert!(required_str(&a, "missing").is_err());
        assert_eq!(optional_str(&a, "course_name"), None);
        assert_eq!(optional_u32(&a, "lesson_number").unwrap(), Some(5));
        assert_eq!(optional_u32(&a, "n").unwrap(), Some(7));
        assert_eq!(optional_u32(&a, "absent").unwrap(), None);
        assert!(optional_u32(&a, "bad").is_err());
    }
}
