use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::errors::AppError;

/// Persists processed photos and returns the URL clients load them from.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError>;
}

/// Writes into a local directory served under `/uploads`.
pub struct LocalPhotoStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalPhotoStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PhotoStore for LocalPhotoStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("cannot create upload dir: {e}")))?;
        let path = self.dir.join(key);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("cannot write {}: {e}", path.display())))?;
        info!("Stored upload at {}", path.display());
        Ok(format!("{}/uploads/{key}", self.public_base_url))
    }
}

pub struct S3PhotoStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl S3PhotoStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, endpoint: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PhotoStore for S3PhotoStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        let object_key = format!("profile-photos/{key}");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded photo to s3://{}/{}", self.bucket, object_key);
        Ok(format!("{}/{}/{object_key}", self.endpoint, self.bucket))
    }
}
