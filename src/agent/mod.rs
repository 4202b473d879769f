//! Building blocks of the tool-calling loop.
//!
//! A request runs as a sequence of rounds ([`execute_round`]). After each one
//! the continuation policy ([`should_continue`]) decides whether another is
//! warranted, and the [`Synthesizer`] turns the accumulated tool output into
//! the final answer. When the model cannot, [`format_tool_results`] assembles
//! one without it.

pub mod classify;
pub mod fallback;
pub mod policy;
pub mod round;
pub mod synthesis;

pub use classify::{classify_query, classify_result, QueryKind, ResultKind};
pub use fallback::{format_single_result, format_tool_results, NO_INFORMATION, NO_LESSON_INFORMATION};
pub use policy::{evaluate, should_continue, Continuation, StopReason};
pub use round::{execute_round, RoundResult};
pub use synthesis::{all_tool_results, Synthesizer, PLACEHOLDER_SUBJECT};
