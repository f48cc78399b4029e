//! Snapshot persistence.
//!
//! The watcher keeps exactly one durable record: the posts seen at the last
//! successful cycle, as a JSON array of `{title, url}` objects. Each save
//! replaces the record wholesale.
//!
//! Backends:
//! - `LocalStorage`: a JSON file on disk
//! - `S3Storage`: a single object in a bucket (feature `s3`)

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Post, Snapshot, StorageBackend, StorageConfig};

// Re-export for convenience
pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Trait for snapshot storage backends.
///
/// Assumes a single writer: nothing else writes between a cycle's `load`
/// and its `save`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot. Absence is an empty snapshot.
    async fn load(&self) -> Result<Snapshot>;

    /// Replace the saved snapshot. A reader never sees a partial write.
    async fn save(&self, snapshot: &[Post]) -> Result<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// Open the backend selected by configuration.
pub async fn open(config: &StorageConfig) -> Result<Arc<dyn SnapshotStore>> {
    match config.backend {
        StorageBackend::Local => Ok(Arc::new(LocalStorage::new(&config.path))),
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            let bucket = config.bucket.clone().ok_or_else(|| {
                AppError::config("storage.bucket is required for the s3 backend")
            })?;
            Ok(Arc::new(S3Storage::from_env(bucket, &config.key).await))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(AppError::config(
            "the s3 backend requires building with the `s3` feature",
        )),
    }
}
