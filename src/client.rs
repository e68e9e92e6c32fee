//! Defines the object-store capability and the global S3 client.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::from_env;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use once_cell::sync::OnceCell;
use std::env;

/// Maximum number of keys the storage service accepts in a single
/// bulk-delete request.
const DELETE_BATCH_SIZE: usize = 1000;

/// The storage operations the provisioning handlers rely on.
/// Implemented by the S3 client, and by an in-memory fake in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists one page of keys found in a bucket under a given prefix.
    /// Returns the page of keys and a token that can be used for a
    /// subsequent fetch.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        next: Option<&str>,
    ) -> Result<(Vec<String>, Option<String>)>;

    /// Server-side copy of a single object between bucket/key pairs.
    async fn copy(
        &self,
        source_bucket: &str,
        source_key: &str,
        bucket: &str,
        key: &str,
    ) -> Result<()>;

    /// Uploads a single object.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;

    /// Removes every named key from the bucket.
    async fn delete_all(&self, bucket: &str, keys: Vec<String>) -> Result<()>;
}

#[async_trait]
impl ObjectStore for Client {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        next: Option<&str>,
    ) -> Result<(Vec<String>, Option<String>)> {
        let mut operation = self.list_objects_v2().bucket(bucket).prefix(prefix);
        if let Some(continuation_token) = next {
            operation = operation.continuation_token(continuation_token)
        }
        let response = operation.send().await.with_context(|| {
            format!(
                "Failed to list keys under {:?} in bucket {:?} \
                 using {} continuation token",
                prefix,
                bucket,
                if next.is_some() { "a" } else { "no" }
            )
        })?;
        Ok((
            response
                .contents()
                .unwrap_or_default()
                .iter()
                .filter_map(|o| o.key().map(String::from))
                .collect(),
            response.next_continuation_token().map(String::from),
        ))
    }

    async fn copy(
        &self,
        source_bucket: &str,
        source_key: &str,
        bucket: &str,
        key: &str,
    ) -> Result<()> {
        self.copy_object()
            .copy_source(format!("{}/{}", source_bucket, source_key))
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to copy object {:?} from bucket {:?} \
                     to object {:?} in bucket {:?}",
                    source_key, source_bucket, key, bucket
                )
            })?;
        Ok(())
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .with_context(|| format!("Failed to upload object {:?} to bucket {:?}", key, bucket))?;
        Ok(())
    }

    async fn delete_all(&self, bucket: &str, keys: Vec<String>) -> Result<()> {
        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            let response = self
                .delete_objects()
                .bucket(bucket)
                .delete(
                    Delete::builder()
                        .set_objects(Some(
                            batch
                                .iter()
                                .map(|key| ObjectIdentifier::builder().key(key).build())
                                .collect(),
                        ))
                        .build(),
                )
                .send()
                .await
                .with_context(|| {
                    format!(
                        "Failed to delete {} objects from bucket {:?}",
                        batch.len(),
                        bucket
                    )
                })?;
            let errors = response.errors().unwrap_or_default();
            if !errors.is_empty() {
                return Err(anyhow!(
                    "Failed to delete {} out of {} objects from bucket {:?}; first error: {:?}",
                    errors.len(),
                    batch.len(),
                    bucket,
                    errors[0].message()
                ));
            }
        }
        Ok(())
    }
}

/// Global S3 client instance.
static CURRENT: OnceCell<Client> = OnceCell::new();

/// Initialize the global S3 client.
pub async fn init() -> Result<()> {
    let endpoint_url_var = env::var("AWS_ENDPOINT_URL");
    let s3_config = if let Ok(endpoint_url) = endpoint_url_var {
        from_env()
            .endpoint_url(
                if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
                    endpoint_url
                } else {
                    format!("https://{}", endpoint_url)
                },
            )
            .region("us-east-1") // should be OK since the endpoint was overridden
            .load()
    } else {
        from_env().load()
    }
    .await;
    let client = Client::new(&s3_config);
    CURRENT
        .set(client)
        .map_err(|_| anyhow!("client::CURRENT was already initialized"))
}

/// Get the current S3 client instance, or panic if it hasn't been initialized.
pub fn current() -> &'static Client {
    CURRENT.get().expect("client is not initialized")
}
