//! Service layer for the watcher.
//!
//! - Page retrieval (`Fetcher`, `HttpFetcher`)
//! - Post extraction (`PostExtractor`)
//! - New-post mail (`Notifier`, `SmtpNotifier`)

mod extractor;
mod fetcher;
mod notifier;

pub use extractor::PostExtractor;
pub use fetcher::{Fetcher, HttpFetcher};
pub use notifier::{Notifier, SUBJECT, SmtpNotifier, compose_body};
