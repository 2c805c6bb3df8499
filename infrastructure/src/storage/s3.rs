//! S3 artifact store.

use crate::providers::aws::{AwsSettings, load_sdk_config};
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use palaver_application::ports::artifact_store::{ArtifactStore, StoreError};
use palaver_domain::{ArtifactHandle, ArtifactKey};
use tracing::{debug, info};

/// Uploads artifacts to a bucket with `put_object`.
///
/// The bucket must already exist.
pub struct S3ArtifactStore {
    client: S3Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub async fn new(settings: &AwsSettings, bucket: impl Into<String>) -> Self {
        let sdk_config = load_sdk_config(settings).await;
        let bucket = bucket.into();
        info!(bucket = %bucket, region = %settings.region, "S3 artifact store initialized");
        Self {
            client: S3Client::new(&sdk_config),
            bucket,
        }
    }

    pub fn from_client(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(
        &self,
        key: &ArtifactKey,
        payload: &[u8],
        content_type: &str,
    ) -> Result<ArtifactHandle, StoreError> {
        debug!(bucket = %self.bucket, key = %key, "Uploading artifact to S3");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .body(ByteStream::from(payload.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("S3 put_object failed: {}", e)))?;

        Ok(ArtifactHandle {
            kind: key.kind(),
            key: key.as_str().to_string(),
            location: format!("s3://{}/{}", self.bucket, key),
            content_type: content_type.to_string(),
            size_bytes: payload.len(),
        })
    }
}
