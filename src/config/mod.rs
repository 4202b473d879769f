//! Configuration module for Coursemate.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AssistantPrompts, Prompts, SynthesisPrompts};
pub use settings::{
    ConversationSettings, EndpointSettings, GeneralSettings, PromptSettings, ProviderKind,
    ProviderSettings, Settings, ToolSettings,
};
