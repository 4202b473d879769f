//! Final answer synthesis from accumulated tool rounds.

use super::classify::classify_query;
use super::fallback::format_tool_results;
use super::round::RoundResult;
use crate::config::Prompts;
use crate::llm::{ChatModel, Message, ModelError, Transcript};
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Subject used when the question is not at hand.
pub const PLACEHOLDER_SUBJECT: &str = "your question";

/// Answer when synthesis timed out and fallback is disabled.
pub const SYNTHESIS_TIMEOUT_APOLOGY: &str =
    "I apologize, but generating the response took too long. Please try again with a simpler question.";

/// Answer when synthesis failed or came back empty and fallback is disabled.
pub const SYNTHESIS_APOLOGY: &str =
    "I apologize, but I couldn't generate a proper response to your question.";

/// Turns a finished transcript into the user-facing answer.
pub struct Synthesizer<'a> {
    model: &'a dyn ChatModel,
    prompts: &'a Prompts,
    /// Skip the model and format tool output directly.
    skip_synthesis: bool,
    /// Format tool output when the synthesis call fails.
    fallback_enabled: bool,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        model: &'a dyn ChatModel,
        prompts: &'a Prompts,
        skip_synthesis: bool,
        fallback_enabled: bool,
    ) -> Self {
        Self {
            model,
            prompts,
            skip_synthesis,
            fallback_enabled,
        }
    }

    /// Produce the answer for a transcript whose rounds requested tools.
    ///
    /// Appends one system instruction, then issues a single model call without
    /// tool schemas so the model cannot ask for another round.
    pub async fn synthesize(&self, transcript: &mut Transcript, rounds: &[RoundResult]) -> String {
        let results = all_tool_results(rounds);

        if self.skip_synthesis {
            info!("Skipping synthesis for this provider");
            return format_tool_results(&results, PLACEHOLDER_SUBJECT);
        }

        let question = transcript
            .first_user_content()
            .unwrap_or(PLACEHOLDER_SUBJECT)
            .to_string();

        let template = if classify_query(&question).is_comparison() {
            &self.prompts.synthesis.comparison
        } else {
            &self.prompts.synthesis.standard
        };
        let vars = HashMap::from([("question".to_string(), question.clone())]);
        transcript.push(Message::system(self.prompts.render_with_custom(template, &vars)));

        self.final_answer(transcript, &results, &question).await
    }

    /// One tool-less model call over `transcript`, recovering from failure.
    pub(crate) async fn final_answer(
        &self,
        transcript: &Transcript,
        results: &[String],
        question: &str,
    ) -> String {
        info!("Final synthesis call - model: {}", self.model.model_name());

        match self.model.complete(transcript.messages(), &[]).await {
            Ok(reply) => match reply.content.filter(|c| !c.trim().is_empty()) {
                Some(content) => content,
                None => {
                    warn!("Synthesis returned empty content");
                    self.recover(None, results, question)
                }
            },
            Err(e) => {
                error!("Synthesis call failed: {}", e);
                self.recover(Some(&e), results, question)
            }
        }
    }

    fn recover(&self, error: Option<&ModelError>, results: &[String], question: &str) -> String {
        if self.fallback_enabled {
            warn!("Using fallback response generation");
            return format_tool_results(results, question);
        }

        match error {
            Some(e) if e.is_timeout() => SYNTHESIS_TIMEOUT_APOLOGY.to_string(),
            _ => SYNTHESIS_APOLOGY.to_string(),
        }
    }
}

/// Successful tool results of all rounds, in order.
pub fn all_tool_results(rounds: &[RoundResult]) -> Vec<String> {
    rounds
        .iter()
        .flat_map(|r| r.tool_results.iter().cloned())
        .collect()
}
