//! Blob store trait and its OpenDAL implementation.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt, stream};
use opendal::{ErrorKind, Operator, services};
use tracing::{debug, info, warn};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::key::generate_storage_key;

/// Byte stream over a stored blob.
///
/// Dropping the stream closes the underlying reader.
pub type BlobStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Durable byte storage keyed by a generated name.
///
/// Implemented over OpenDAL here; any backend that can honour these five
/// operations can sit behind the document service.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under a freshly generated key derived from `original_filename`.
    ///
    /// Never overwrites: an existing key fails with [`StorageError::KeyCollision`].
    fn put(
        &self,
        original_filename: &str,
        bytes: Bytes,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Check whether a blob exists and can be stat'ed.
    fn exists(&self, key: &str) -> impl Future<Output = bool> + Send;

    /// Current size of a blob in bytes.
    fn size(&self, key: &str) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// Open a blob for streaming reads.
    fn open_read(&self, key: &str) -> impl Future<Output = Result<BlobStream, StorageError>> + Send;

    /// Delete a blob. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Blob store backed by an OpenDAL operator.
#[derive(Debug, Clone)]
pub struct OpendalBlobStore {
    operator: Operator,
    config: StorageConfig,
}

impl OpendalBlobStore {
    /// Create a new blob store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::LocalFs { root } => {
                let root = std::path::absolute(root).map_err(|e| {
                    StorageError::configuration(format!("invalid upload directory: {e}"))
                })?;
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };

        Ok(operator)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

}

impl BlobStore for OpendalBlobStore {
    async fn put(&self, original_filename: &str, bytes: Bytes) -> Result<String, StorageError> {
        let key = generate_storage_key(original_filename);

        if self.exists(&key).await {
            return Err(StorageError::key_collision(key));
        }

        let size = bytes.len();
        self.operator.write(&key, bytes).await?;
        debug!(key = %key, size, provider = self.provider_name(), "Blob written");

        Ok(key)
    }

    async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to stat blob");
                false
            }
        }
    }

    async fn size(&self, key: &str) -> Result<u64, StorageError> {
        let meta = self.operator.stat(key).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::not_found(key),
            _ => StorageError::from(e),
        })?;

        Ok(meta.content_length())
    }

    async fn open_read(&self, key: &str) -> Result<BlobStream, StorageError> {
        let reader = self.operator.reader(key).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::not_found(key),
            _ => StorageError::from(e),
        })?;
        let mut chunks = Box::pin(reader.into_bytes_stream(..).await?);

        // The fs backend opens the file on first poll; pull one chunk so a
        // missing or unreadable blob fails here instead of mid-response.
        match chunks.next().await {
            Some(Ok(first)) => Ok(Box::pin(stream::iter([Ok(first)]).chain(chunks))),
            Some(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(key))
            }
            Some(Err(e)) => Err(StorageError::operation(e.to_string())),
            None => Ok(Box::pin(stream::empty())),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if !self.exists(key).await {
            info!(key = %key, "Blob already absent, nothing to delete");
            return Ok(());
        }

        self.operator.delete(key).await.map_err(StorageError::from)?;
        debug!(key = %key, "Blob deleted");
        Ok(())
    }
}
