// src/services/extractor.rs

//! Post extraction from the listing markup.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ExtractorConfig, Post};

/// Parses listing pages into posts using configured CSS selectors.
#[derive(Debug, Clone)]
pub struct PostExtractor {
    container: Selector,
    group: Selector,
    entry: Selector,
    link: Selector,
    container_label: String,
    link_attr: String,
}

impl PostExtractor {
    /// Compile the selectors from configuration.
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(Self {
            container: Self::parse_selector(&config.container_selector)?,
            group: Self::parse_selector(&config.group_selector)?,
            entry: Self::parse_selector(&config.entry_selector)?,
            link: Self::parse_selector(&config.link_selector)?,
            container_label: config.container_selector.clone(),
            link_attr: config.link_attr.clone(),
        })
    }

    /// Extract posts from raw markup, in document order.
    ///
    /// Each entry yields its first link carrying the target attribute.
    /// Entries without one are skipped.
    /// A missing container is `AppError::Structure`.
    pub fn extract(&self, html: &str) -> Result<Vec<Post>> {
        let document = Html::parse_document(html);
        let container = document.select(&self.container).next().ok_or_else(|| {
            AppError::structure(format!(
                "container '{}' not found in page",
                self.container_label
            ))
        })?;

        let posts = container
            .select(&self.group)
            .flat_map(|group| group.select(&self.entry))
            .filter_map(|entry| self.parse_entry(&entry))
            .collect();

        Ok(posts)
    }

    fn parse_entry(&self, entry: &ElementRef) -> Option<Post> {
        let Some((link, href)) = entry
            .select(&self.link)
            .find_map(|link| link.value().attr(&self.link_attr).map(|href| (link, href)))
        else {
            log::debug!("Skipping entry without a '{}' link", self.link_attr);
            return None;
        };
        let title: String = link.text().collect();
        Some(Post::new(title, href))
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
