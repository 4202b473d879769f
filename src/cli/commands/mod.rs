//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod tools;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use tools::run_tools;

use crate::config::Settings;
use crate::error::{CoursemateError, Result};

/// Switch the active provider when one is given on the command line.
fn with_provider(mut settings: Settings, provider: Option<&str>) -> Result<Settings> {
    if let Some(name) = provider {
        settings.provider.active = name.parse().map_err(CoursemateError::InvalidInput)?;
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    #[test]
    fn test_with_provider() {
        let settings = with_provider(Settings::default(), Some("openai")).unwrap();
        assert_eq!(settings.provider.active, ProviderKind::OpenAI);

        let unchanged = with_provider(Settings::default(), None).unwrap();
        assert_eq!(unchanged.provider.active, ProviderKind::Anthropic);

        assert!(with_provider(Settings::default(), Some("gemini")).is_err());
    }
}
