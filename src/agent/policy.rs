//! Decides whether another tool round is warranted.

use super::round::RoundResult;
use std::collections::HashSet;
use tracing::{info, warn};

/// Why the round loop stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Round ceiling reached.
    MaxRounds,
    /// The model answered without requesting tools.
    ModelFinished,
    /// A query text was issued more than once in the request.
    DuplicateQuery(String),
    /// The last two rounds produced no successful tool output.
    Unproductive,
}

/// Decision of the continuation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Stop(StopReason),
}

/// Evaluate the stop rules in priority order; the first match wins.
pub fn evaluate(completed: &[RoundResult], current_round: usize, max_rounds: usize) -> Continuation {
    if current_round >= max_rounds {
        return Continuation::Stop(StopReason::MaxRounds);
    }

    if completed.last().is_some_and(|r| !r.had_tool_calls) {
        return Continuation::Stop(StopReason::ModelFinished);
    }

    let mut seen = HashSet::new();
    for query in completed.iter().flat_map(|r| r.queries_executed.iter()) {
        if !seen.insert(query.as_str()) {
            return Continuation::Stop(StopReason::DuplicateQuery(query.clone()));
        }
    }

    let recent = &completed[completed.len().saturating_sub(2)..];
    if recent.iter().all(|r| r.tool_results.is_empty()) {
        return Continuation::Stop(StopReason::Unproductive);
    }

    Continuation::Continue
}

/// Whether another round should run after `current_round`.
pub fn should_continue(completed: &[RoundResult], current_round: usize, max_rounds: usize) -> bool {
    match evaluate(completed, current_round, max_rounds) {
        Continuation::Continue => {
            info!("Continuing to round {}", current_round + 1);
            true
        }
        Continuation::Stop(StopReason::DuplicateQuery(query)) => {
            warn!("Duplicate query {:?} detected, stopping rounds", query);
            false
        }
        Continuation::Stop(reason) => {
            info!("Stopping after round {}: {:?}", current_round, reason);
            false
        }
    }
}
