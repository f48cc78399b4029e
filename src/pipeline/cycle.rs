//! One reconciliation cycle: fetch → extract → diff → notify → persist.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::diff::{Diff, calculate_diff};
use crate::services::{Fetcher, HttpFetcher, Notifier, PostExtractor, SmtpNotifier};
use crate::storage::SnapshotStore;

/// Outcome of the notification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Nothing was added, so nothing was sent
    Skipped,
    /// Mail delivered
    Sent,
    /// Delivery failed; the cycle still completed
    Failed(String),
}

/// Summary of a completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Posts extracted from the page
    pub extracted: usize,
    pub diff: Diff,
    pub notification: Notification,
}

/// Wires the pipeline collaborators together.
pub struct Watcher {
    source_url: String,
    fetcher: Arc<dyn Fetcher>,
    extractor: PostExtractor,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
}

impl Watcher {
    pub fn new(
        source_url: impl Into<String>,
        fetcher: Arc<dyn Fetcher>,
        extractor: PostExtractor,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            fetcher,
            extractor,
            store,
            notifier,
        }
    }

    /// Build a watcher with the HTTP fetcher and SMTP notifier.
    pub fn from_config(config: &Config, store: Arc<dyn SnapshotStore>) -> Result<Self> {
        Ok(Self::new(
            config.source.url.clone(),
            Arc::new(HttpFetcher::from_config(&config.source)?),
            PostExtractor::new(&config.extractor)?,
            store,
            Arc::new(SmtpNotifier::new(config.smtp.clone())),
        ))
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Run one cycle.
    ///
    /// Fetch and structure errors return before the store is touched or
    /// the notifier is called. Store errors also propagate, and nothing is
    /// saved. A failed notification is logged and the new snapshot is
    /// saved anyway.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        log::info!("Fetching {}", self.source_url);
        let html = self.fetcher.fetch(&self.source_url).await?;
        let posts = self.extractor.extract(&html)?;
        log::info!("Extracted {} posts", posts.len());

        let previous = self.store.load().await?;
        let diff = calculate_diff(&posts, &previous);

        if !diff.added.is_empty() {
            log::info!("New posts added: {}", diff.added.len());
            for post in &diff.added {
                log::info!("{}", post.line());
            }
        }
        if !diff.removed.is_empty() {
            log::info!("Posts removed: {}", diff.removed.len());
            for post in &diff.removed {
                log::info!("{}", post.line());
            }
        }
        if !diff.has_changes() {
            log::info!("No changes detected.");
        }

        let notification = if diff.added.is_empty() {
            Notification::Skipped
        } else {
            match self.notifier.notify(&diff.added).await {
                Ok(()) => Notification::Sent,
                Err(e) => {
                    log::error!("Failed to send notification: {e}");
                    Notification::Failed(e.to_string())
                }
            }
        };

        self.store.save(&posts).await?;
        log::debug!("Snapshot saved to {}", self.store.location());

        Ok(CycleReport {
            extracted: posts.len(),
            diff,
            notification,
        })
    }
}
