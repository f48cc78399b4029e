// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod post;

pub use config::{
    Config, ExtractorConfig, HealthConfig, LoggingConfig, ScheduleConfig, SmtpConfig,
    SourceConfig, StorageBackend, StorageConfig,
};
pub use post::{Post, Snapshot};
