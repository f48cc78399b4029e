// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;

/// Create a configured asynchronous HTTP client.
///
/// Every request made through it is bounded by `timeout_secs`, so a hung
/// source cannot stall the runner.
pub fn create_async_client(config: &SourceConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::config(format!("HTTP client: {e}")))
}
