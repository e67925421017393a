//! Object storage: the bucket is the only link between `export` and `view`.

pub mod latest;
#[cfg(test)]
pub mod memory;
pub mod s3;
pub mod upload;

use std::path::Path;

use async_trait::async_trait;

use crate::error::BucketResult;

pub use latest::download_latest;
pub use s3::S3Store;
pub use upload::upload_with_increment;

/// Operations consumed from a single bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `Ok(false)` only for a definite "not found"; every other failure is an error.
    async fn exists(&self, key: &str) -> BucketResult<bool>;

    async fn put_file(&self, local: &Path, key: &str) -> BucketResult<()>;

    async fn list_keys(&self, prefix: &str) -> BucketResult<Vec<String>>;

    /// Writes the object to `local`, replacing any existing file.
    async fn download(&self, key: &str, local: &Path) -> BucketResult<()>;
}
