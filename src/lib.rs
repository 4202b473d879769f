//! Coursemate - course-material question answering with tool calling
//!
//! A CLI and library that answers questions about a course catalog by letting
//! a language model call search and outline tools over several rounds.
//!
//! # Overview
//!
//! For every question Coursemate:
//! - Sends the question with the available tools to an OpenAI-compatible endpoint
//! - Runs the tools the model asks for, round after round, until it is done
//!   or a stop rule fires (round ceiling, repeated query, nothing found)
//! - Has the model synthesize an answer from the tool output, or formats the
//!   output itself when synthesis is skipped or fails
//! - Returns the answer with the lessons it cited
//!
//! # Architecture
//!
//! - `config` - Settings, environment overrides and prompt templates
//! - `llm` - Chat model abstraction and the async-openai backend
//! - `catalog` - Course store abstraction and the in-memory catalog
//! - `tools` - Tool registry with the course search and outline tools
//! - `agent` - Round execution, continuation policy, synthesis and fallback
//! - `orchestrator` - One question end to end
//! - `rag` - Per-request answering with sources
//! - `session` - Conversation history for chat
//!
//! # Example
//!
//! ```rust,no_run
//! use coursemate::config::Settings;
//! use coursemate::rag::RagEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = RagEngine::from_settings(&settings)?;
//!
//!     let answer = engine.ask("What was covered in lesson 5 of the MCP course?", None).await;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod session;
pub mod tools;

pub use error::{CoursemateError, Result};
