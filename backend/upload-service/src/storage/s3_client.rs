// S3 client implementation

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client};
use bytes::Bytes;

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
}

impl S3ObjectStore {
    /// Build the client from the AWS default chain, pinning the region when configured
    ///
    /// Fails when no region can be resolved at all. The bucket is only checked by S3 itself.
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .ok_or_else(|| StorageError::Config("no AWS region resolved, set AWS_REGION".to_string()))?;

        if config.bucket.is_empty() {
            tracing::warn!("AWS_BUCKET is not set; uploads will fail until it is configured");
        }

        Ok(Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket.clone(),
            region,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, content_type: &str, body: Bytes) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
