//! OpenAI-compatible client construction for the configured endpoint.

use crate::config::EndpointSettings;
use crate::error::{CoursemateError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for `endpoint`, bounded by the endpoint's timeout.
pub fn create_client(endpoint: &EndpointSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(&endpoint.base_url, api_key, endpoint.timeout())
}

fn create_client_with_timeout(
    base_url: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CoursemateError::OpenAI(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(base_url.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
