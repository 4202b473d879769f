//! Ask command implementation.

use super::with_provider;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagEngine;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    provider: Option<&str>,
    max_rounds: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let mut settings = with_provider(settings, provider)?;
    if let Some(rounds) = max_rounds {
        settings.tools.max_rounds = rounds;
    }

    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'coursemate config path' to find the config file.");
        return Err(e.into());
    }

    let engine = RagEngine::from_settings(&settings)?;

    let spinner = Output::spinner("Searching course materials...");
    let answer = engine.ask(question, None).await;
    spinner.finish_and_clear();

    Output::answer(&answer);
    Ok(())
}
