//! CLI module for Coursemate.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Coursemate - answers questions about your course materials
///
/// The model searches the course catalog with tools, over several rounds when
/// needed, and answers with the lessons it cites.
#[derive(Parser, Debug)]
#[command(name = "coursemate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "COURSEMATE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question about the course materials
    Ask {
        /// The question to ask
        question: String,

        /// Provider to use (anthropic or openai)
        #[arg(short, long)]
        provider: Option<String>,

        /// Maximum tool rounds for this question
        #[arg(long)]
        max_rounds: Option<usize>,
    },

    /// Start an interactive chat session
    Chat {
        /// Provider to use (anthropic or openai)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// List the tools the model can call and the courses in the catalog
    Tools,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
