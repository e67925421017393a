use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use log::debug;

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::{BucketError, BucketResult};

/// S3 bucket handle built from explicit configuration.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn connect(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "nbalogs-config",
            ));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();
        S3Store::new(Client::from_conf(s3_config), config.bucket.clone())
    }

    pub fn new(client: Client, bucket: String) -> Self {
        S3Store { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn exists(&self, key: &str) -> BucketResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => match err.as_service_error() {
                Some(service_err) if service_err.is_not_found() => Ok(false),
                _ => Err(BucketError::storage("head", key, DisplayErrorContext(&err))),
            },
        }
    }

    async fn put_file(&self, local: &Path, key: &str) -> BucketResult<()> {
        let body = ByteStream::from_path(local)
            .await
            .map_err(|err| BucketError::storage("put", key, err))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("text/csv")
            .body(body)
            .send()
            .await
            .map_err(|err| BucketError::storage("put", key, DisplayErrorContext(&err)))?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> BucketResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|err| BucketError::storage("list", prefix, DisplayErrorContext(&err)))?;

            keys.extend(page.contents().iter().filter_map(|obj| obj.key().map(str::to_string)));
            debug!("listed {} keys under {}/{}", keys.len(), self.bucket, prefix);

            match page.next_continuation_token() {
                Some(token) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string())
                }
                _ => break,
            }
        }
        Ok(keys)
    }

    async fn download(&self, key: &str, local: &Path) -> BucketResult<()> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| BucketError::storage("get", key, DisplayErrorContext(&err)))?;
        let bytes = object
            .body
            .collect()
            .await
            .map_err(|err| BucketError::storage("get", key, err))?
            .into_bytes();
        tokio::fs::write(local, bytes).await?;
        Ok(())
    }
}
