// src/config.rs

//! Configuration loading utilities.
//!
//! The effective configuration is built once at startup:
//! TOML file (optional) → `.env` file (optional) → process environment.
//! Later layers win.

use std::env;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, StorageBackend};

/// Environment variables that override file configuration.
pub mod vars {
    pub const SOURCE_URL: &str = "SOURCE_URL";
    pub const FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
    pub const POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
    pub const STATE_BACKEND: &str = "STATE_BACKEND";
    pub const DATA_FILE: &str = "DATA_FILE";
    pub const STATE_BUCKET: &str = "STATE_BUCKET";
    pub const STATE_KEY: &str = "STATE_KEY";
    pub const SMTP_SERVER: &str = "SMTP_SERVER";
    pub const SMTP_PORT: &str = "SMTP_PORT";
    pub const SENDER_EMAIL: &str = "SENDER_EMAIL";
    pub const SENDER_PASSWORD: &str = "SENDER_PASSWORD";
    pub const EMAIL_FROM: &str = "EMAIL_FROM";
    pub const RECIPIENT_EMAIL: &str = "RECIPIENT_EMAIL";
    pub const PORT: &str = "PORT";
    pub const HEALTH_PROBE: &str = "HEALTH_PROBE";
}

/// Load configuration from an optional TOML file plus the environment,
/// then validate it. A missing file means defaults.
pub fn load(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        Config::default()
    };

    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    apply_overrides(&mut config, |name| env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

/// Apply environment-style overrides using the given lookup.
///
/// Empty values are treated as unset.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(vars::SOURCE_URL) {
        config.source.url = v;
    }
    if let Some(v) = get(vars::FETCH_TIMEOUT_SECS) {
        config.source.timeout_secs = parse_var(vars::FETCH_TIMEOUT_SECS, &v)?;
    }
    if let Some(v) = get(vars::POLL_INTERVAL_SECS) {
        config.schedule.interval_secs = parse_var(vars::POLL_INTERVAL_SECS, &v)?;
    }
    if let Some(v) = get(vars::STATE_BACKEND) {
        config.storage.backend = v.parse::<StorageBackend>()?;
    }
    if let Some(v) = get(vars::DATA_FILE) {
        config.storage.path = v;
    }
    if let Some(v) = get(vars::STATE_BUCKET) {
        config.storage.bucket = Some(v);
    }
    if let Some(v) = get(vars::STATE_KEY) {
        config.storage.key = v;
    }
    if let Some(v) = get(vars::SMTP_SERVER) {
        config.smtp.server = v;
    }
    if let Some(v) = get(vars::SMTP_PORT) {
        config.smtp.port = parse_var(vars::SMTP_PORT, &v)?;
    }
    if let Some(v) = get(vars::SENDER_EMAIL) {
        config.smtp.username = Some(v);
    }
    if let Some(v) = get(vars::SENDER_PASSWORD) {
        config.smtp.password = Some(v);
    }
    if let Some(v) = get(vars::EMAIL_FROM) {
        config.smtp.from = Some(v);
    }
    if let Some(v) = get(vars::RECIPIENT_EMAIL) {
        config.smtp.recipient = Some(v);
    }
    if let Some(v) = get(vars::PORT) {
        config.health.port = parse_var(vars::PORT, &v)?;
    }
    if let Some(v) = get(vars::HEALTH_PROBE) {
        config.health.probe = matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes");
    }
    Ok(())
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::config(format!("{name} must be a valid number: {e}")))
}
