//! Tools command: what the model can call, and over which courses.

use crate::catalog::{CourseStore, MemoryCourseStore};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::course_tools;
use anyhow::Result;
use std::sync::Arc;

/// Run the tools command.
pub async fn run_tools(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Tools, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let store = Arc::new(MemoryCourseStore::load(&settings.catalog_path())?);
    let registry = course_tools(store.clone(), &settings.tools)?;

    Output::header("Tools");
    for tool in registry.tool_definitions() {
        Output::list_item(&format!("{}: {}", tool.name, tool.description));
        for param in tool.parameter_list() {
            let kind = if param.required { "required" } else { "optional" };
            Output::kv(&format!("  {} ({})", param.name, kind), &param.description);
        }
    }

    let titles = store.course_titles().await?;
    Output::header(&format!("Courses ({})", titles.len()));
    if titles.is_empty() {
        Output::warning("The catalog has no courses.");
    }
    for title in &titles {
        Output::list_item(title);
    }

    println!();
    Output::kv("Max rounds", &settings.tools.max_rounds().to_string());
    Output::kv("Sequential", &settings.tools.sequential.to_string());
    Output::kv("Synthesis fallback", &settings.tools.synthesis_fallback.to_string());

    Ok(())
}
