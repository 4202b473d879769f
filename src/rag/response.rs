//! Per-request answering with source tracking.

use crate::catalog::{CourseStore, MemoryCourseStore};
use crate::config::{Settings, ToolSettings};
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::session::ConversationHistory;
use crate::tools::{CourseOutlineTool, CourseSearchTool, Source, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Registry with the course search and outline tools over `store`.
pub fn course_tools(store: Arc<dyn CourseStore>, settings: &ToolSettings) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new().with_timeout(settings.timeout());
    registry.register(Arc::new(
        CourseSearchTool::new(store.clone()).with_max_results(settings.max_results),
    ))?;
    registry.register(Arc::new(CourseOutlineTool::new(store)))?;
    Ok(registry)
}

/// Question answering engine over the course tools.
pub struct RagEngine {
    orchestrator: Orchestrator,
    registry: ToolRegistry,
    history: ConversationHistory,
}

impl RagEngine {
    pub fn new(orchestrator: Orchestrator, registry: ToolRegistry) -> Self {
        Self {
            orchestrator,
            registry,
            history: ConversationHistory::new(2),
        }
    }

    /// Set how many exchanges [`RagEngine::chat`] keeps.
    pub fn with_history_limit(mut self, max_exchanges: usize) -> Self {
        self.history = ConversationHistory::new(max_exchanges);
        self
    }

    /// Build an engine from settings: catalog, tools and the active provider.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let store = Arc::new(MemoryCourseStore::load(&settings.catalog_path())?);
        let registry = course_tools(store, &settings.tools)?;
        let orchestrator = Orchestrator::from_settings(settings)?;

        Ok(Self::new(orchestrator, registry).with_history_limit(settings.conversation.max_history))
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Answer one question, optionally with rendered prior conversation.
    #[instrument(skip(self, history), fields(question = %question))]
    pub async fn ask(&self, question: &str, history: Option<&str>) -> Answer {
        info!("Processing question: {}", question);

        let tools = self.registry.tool_definitions();
        let registry = (!self.registry.is_empty()).then_some(&self.registry);
        let outcome = self.orchestrator.respond(question, history, &tools, registry).await;
        debug!("Answered with {} sources", outcome.sources.len());

        Answer {
            text: outcome.text,
            sources: outcome.sources,
        }
    }

    /// Answer a message in the ongoing conversation and remember the exchange.
    pub async fn chat(&mut self, message: &str) -> Answer {
        let history = self.history.render();
        let answer = self.ask(message, history.as_deref()).await;
        self.history.add_exchange(message, &answer.text);
        answer
    }

    /// Clear conversation history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// An answer with the sources cited while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Source>,
}
