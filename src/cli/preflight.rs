//! Pre-flight checks before talking to the model.
//!
//! Catches a missing catalog or a malformed endpoint before a request is
//! sent, instead of failing halfway through a question.

use crate::config::Settings;
use crate::error::{CoursemateError, Result};
use tracing::warn;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions needs the catalog and a usable endpoint.
    Ask,
    /// Listing tools needs only the catalog.
    Tools,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_catalog(settings)?;
    if let Operation::Ask = operation {
        check_endpoint(settings)?;
    }
    Ok(())
}

fn check_catalog(settings: &Settings) -> Result<()> {
    let path = settings.catalog_path();
    if path.is_file() {
        Ok(())
    } else {
        Err(CoursemateError::Catalog(format!(
            "Course catalog not found at {}. Set general.catalog_path in the config file.",
            path.display()
        )))
    }
}

fn check_endpoint(settings: &Settings) -> Result<()> {
    let endpoint = settings.provider.endpoint();
    let url = endpoint.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CoursemateError::Config(format!(
            "Invalid base_url for {} provider: '{}'",
            settings.provider.active, endpoint.base_url
        )));
    }

    // Local proxies often accept any key
    if settings.provider.api_key().is_empty() {
        warn!("No API key configured for {} provider", settings.provider.active);
    }
    Ok(())
}
