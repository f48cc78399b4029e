//! AWS S3 storage implementation.
//!
//! The snapshot lives in a single object `s3://{bucket}/{key}`. A
//! `PutObject` replaces the object atomically, so readers see either the
//! old or the new snapshot.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::models::{Post, Snapshot};
use crate::storage::SnapshotStore;

/// S3-based snapshot storage.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    key: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Create S3 storage using credentials and region from the environment.
    pub async fn from_env(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), bucket, key)
    }
}

#[async_trait]
impl SnapshotStore for S3Storage {
    async fn load(&self) -> Result<Snapshot> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::persistence(format!("read {}: {e}", self.location())))?;
                Ok(serde_json::from_slice(&bytes.into_bytes())?)
            }
            Err(err) => {
                // Check if it's a "not found" error
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::info!("No existing snapshot at {}", self.location());
                    Ok(Vec::new())
                } else {
                    Err(AppError::persistence(format!(
                        "get {}: {service_err}",
                        self.location()
                    )))
                }
            }
        }
    }

    async fn save(&self, snapshot: &[Post]) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(json))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::persistence(format!("put {}: {e}", self.location())))?;

        log::debug!("Wrote {} posts to {}", snapshot.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
