//! Configuration settings for Coursemate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub provider: ProviderSettings,
    pub tools: ToolSettings,
    pub conversation: ConversationSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Path to the course catalog JSON file.
    pub catalog_path: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            catalog_path: "~/.coursemate/catalog.json".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Which configured model endpoint answers requests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic models behind an OpenAI-compatible proxy.
    #[default]
    Anthropic,
    /// OpenAI or any OpenAI-compatible local model.
    OpenAI,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" => Ok(ProviderKind::OpenAI),
            _ => Err(format!("Unknown model provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::OpenAI => write!(f, "openai"),
        }
    }
}

/// Connection settings for one model endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// API key. Falls back to the endpoint's environment variable when unset.
    pub api_key: Option<String>,
    /// Per-call timeout in seconds.
    pub timeout_seconds: f64,
    /// Answer straight from tool output instead of a synthesis call.
    pub skip_synthesis: bool,
}

impl EndpointSettings {
    fn with_defaults(model: &str, timeout_seconds: f64) -> Self {
        Self {
            base_url: "http://localhost:4000".to_string(),
            model: model.to_string(),
            api_key: None,
            timeout_seconds,
            skip_synthesis: false,
        }
    }

    /// Per-call timeout as a duration. Non-positive values fall back to 5 minutes.
    pub fn timeout(&self) -> Duration {
        if self.timeout_seconds.is_finite() && self.timeout_seconds > 0.0 {
            Duration::from_secs_f64(self.timeout_seconds)
        } else {
            Duration::from_secs(300)
        }
    }
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self::with_defaults("gpt-4o-mini", 300.0)
    }
}

/// Model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider used for requests.
    pub active: ProviderKind,
    pub anthropic: EndpointSettings,
    pub openai: EndpointSettings,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            active: ProviderKind::Anthropic,
            anthropic: EndpointSettings::with_defaults("anthropic/claude-sonnet-4-20250514", 300.0),
            openai: EndpointSettings::with_defaults("qwen3-4b", 900.0),
        }
    }
}

impl ProviderSettings {
    /// Settings of the active endpoint.
    pub fn endpoint(&self) -> &EndpointSettings {
        match self.active {
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::OpenAI => &self.openai,
        }
    }

    /// API key for the active endpoint, from config or environment.
    pub fn api_key(&self) -> String {
        let env_var = match self.active {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        };
        self.endpoint()
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(env_var).ok())
            .unwrap_or_default()
    }
}

/// Tool-calling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Maximum tool rounds per request.
    pub max_rounds: usize,
    /// Enable multi-round tool calling. Disabled means one round plus one answer call.
    pub sequential: bool,
    /// Assemble an answer from raw tool output when synthesis fails.
    pub synthesis_fallback: bool,
    /// Maximum search hits per tool call.
    pub max_results: usize,
    /// Per-tool execution timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            sequential: true,
            synthesis_fallback: true,
            max_results: 5,
            timeout_seconds: 30,
        }
    }
}

impl ToolSettings {
    /// Round ceiling, never below one.
    pub fn max_rounds(&self) -> usize {
        self.max_rounds.max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationSettings {
    /// Number of previous exchanges passed back to the model.
    pub max_history: usize,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self { max_history: 2 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply overrides looked up by environment variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MODEL_PROVIDER") {
            match value.parse() {
                Ok(kind) => self.provider.active = kind,
                Err(e) => warn!("Ignoring MODEL_PROVIDER: {}", e),
            }
        }
        if let Some(rounds) = lookup("MAX_TOOL_ROUNDS").and_then(|v| v.trim().parse().ok()) {
            self.tools.max_rounds = rounds;
        }
        if let Some(flag) = lookup("ENABLE_SEQUENTIAL_TOOLS") {
            self.tools.sequential = parse_flag(&flag);
        }
        if let Some(flag) = lookup("ENABLE_SYNTHESIS_FALLBACK") {
            self.tools.synthesis_fallback = parse_flag(&flag);
        }
        if let Some(flag) = lookup("SKIP_SYNTHESIS_FOR_ANTHROPIC") {
            self.provider.anthropic.skip_synthesis = parse_flag(&flag);
        }

        for (prefix, endpoint) in [
            ("OPENAI", &mut self.provider.openai),
            ("ANTHROPIC", &mut self.provider.anthropic),
        ] {
            if let Some(url) = lookup(&format!("{}_BASE_URL", prefix)) {
                endpoint.base_url = url;
            }
            if let Some(model) = lookup(&format!("{}_MODEL", prefix)) {
                endpoint.model = model;
            }
            if let Some(timeout) = lookup(&format!("{}_TIMEOUT", prefix)).and_then(|v| v.trim().parse().ok()) {
                endpoint.timeout_seconds = timeout;
            }
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CoursemateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursemate")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded catalog path.
    pub fn catalog_path(&self) -> PathBuf {
        Self::expand_path(&self.general.catalog_path)
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
