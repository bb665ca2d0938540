//! Configuration validation rules.
//!
//! - `api_url` and `web_url` must be http(s) URLs
//! - `default_branch` and `user_agent` must be non-empty
//! - `timeout_secs` must be positive

use reqwest::Url;

use crate::config::schema::UpkeepConfig;
use crate::error::{Result, UpkeepError};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Configuration key at fault
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &UpkeepConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (field, value) in [("api_url", &config.api_url), ("web_url", &config.web_url)] {
        if let Some(message) = check_http_url(value) {
            errors.push(ValidationError {
                field: field.to_string(),
                message,
            });
        }
    }

    if config.default_branch.trim().is_empty() {
        errors.push(ValidationError {
            field: "default_branch".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if config.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if config.user_agent.trim().is_empty() {
        errors.push(ValidationError {
            field: "user_agent".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    errors
}

fn check_http_url(value: &str) -> Option<String> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => None,
        Ok(url) => Some(format!("unsupported scheme '{}'", url.scheme())),
        Err(e) => Some(format!("'{}' is not a valid URL: {}", value, e)),
    }
}

/// Validate and fail on the first batch of errors.
pub fn validate(config: &UpkeepConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(UpkeepError::ConfigValidationError { message })
}
