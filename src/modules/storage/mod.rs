//! Storage module for file management
//!
//! Report photos go through [`ObjectStorage`]; [`MinIOClient`] is the
//! MinIO/S3-compatible implementation used in production.

use async_trait::async_trait;

use crate::core::error::AppError;

mod minio_client;

pub use minio_client::MinIOClient;

/// Object store holding publicly readable files under storage-relative keys
/// such as `dog_reports/<name>.jpg`
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// URL a client can fetch the object from
    fn public_url(&self, key: &str) -> String;
}
