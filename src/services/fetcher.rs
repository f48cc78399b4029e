// src/services/fetcher.rs

//! Source page fetcher.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::SourceConfig;
use crate::utils::http::create_async_client;

/// Retrieves the raw markup of a page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return its body.
    ///
    /// Network failures and non-2xx statuses are both `AppError::Fetch`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a shared reqwest client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the source settings.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }

        response.text().await.map_err(|e| AppError::fetch(url, e))
    }
}
