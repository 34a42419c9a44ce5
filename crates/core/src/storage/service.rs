//! Object store client implementation using Apache OpenDAL.

use opendal::{ErrorKind, Operator, services};
use tracing::warn;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use crate::naming;

/// Thin client around the remote bucket.
///
/// Holds an OpenDAL [`Operator`] plus the public-domain mapping. Constructed
/// once at startup and shared via `Arc`; every operation is stateless.
pub struct ObjectStore {
    operator: Operator,
    config: StorageConfig,
}

impl ObjectStore {
    /// Create a new object store client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Configuration`] if the provider cannot be
    /// initialized. Callers treat this as fatal at process start.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
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
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => {
                let builder = services::Memory::default();

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(operator)
    }

    /// Write an object under `key` with its content type.
    ///
    /// Keys are treated as write-once: replacing an asset means writing a
    /// new key, never overwriting an existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.operator
            .write_with(key, bytes)
            .content_type(content_type)
            .await?;
        Ok(())
    }

    /// Delete an object.
    ///
    /// Idempotent: deleting an already-absent key is not an error, so
    /// callers never need an existence check first.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match self.operator.delete(key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Copy an object to a freshly named key, then delete the original.
    ///
    /// The new key follows the same naming convention as uploads. The copy
    /// happens server-side; bytes are never re-uploaded from this process.
    /// If the copy succeeds but the delete fails, the old key is left as a
    /// logged orphan rather than rolling back - two live copies beat zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy fails.
    pub async fn copy_and_delete(
        &self,
        old_key: &str,
        new_file_name: &str,
    ) -> Result<String, StorageError> {
        let new_key = naming::object_key(new_file_name);

        self.operator.copy(old_key, &new_key).await?;

        if let Err(e) = self.delete(old_key).await {
            warn!(
                old_key = %old_key,
                new_key = %new_key,
                error = %e,
                "copy succeeded but delete failed, old key orphaned"
            );
        }

        Ok(new_key)
    }

    /// Construct the permanent public URL for an object key.
    ///
    /// Pure string construction; never touches the network and cannot fail.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }

    /// Check if an object exists. Used by tests and diagnostics only;
    /// the pipeline itself never gates an operation on existence.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> ObjectStore {
        let config = StorageConfig::new(StorageProvider::memory(), "assets.example.com");
        ObjectStore::from_config(config).expect("memory store should initialize")
    }

    #[tokio::test]
    async fn test_put_then_exists() {
        let store = memory_store();
        store
            .put("uploads/1-logo.webp", vec![1, 2, 3], "image/webp")
            .await
            .expect("put should succeed");
        assert!(store.exists("uploads/1-logo.webp").await);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = memory_store();
        store
            .put("uploads/1-logo.webp", vec![1, 2, 3], "image/webp")
            .await
            .expect("put should succeed");

        store.delete("uploads/1-logo.webp").await.expect("first delete");
        // Deleting an absent key must also succeed.
        store.delete("uploads/1-logo.webp").await.expect("second delete");
        store.delete("uploads/never-existed.webp").await.expect("absent key");
    }

    #[tokio::test]
    async fn test_copy_and_delete_renames() {
        let store = memory_store();
        store
            .put("uploads/1-old.webp", vec![9, 9, 9], "image/webp")
            .await
            .expect("put should succeed");

        let new_key = store
            .copy_and_delete("uploads/1-old.webp", "newname.png")
            .await
            .expect("rename should succeed");

        assert_ne!(new_key, "uploads/1-old.webp");
        assert!(new_key.starts_with("uploads/"));
        assert!(new_key.ends_with("-newname.png"));
        assert!(store.exists(&new_key).await);
        assert!(!store.exists("uploads/1-old.webp").await);

        // Deleting the old key again must not error.
        store.delete("uploads/1-old.webp").await.expect("idempotent delete");
    }

    #[tokio::test]
    async fn test_copy_of_missing_key_fails() {
        let store = memory_store();
        let result = store.copy_and_delete("uploads/ghost.webp", "x.png").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_public_url_is_pure() {
        let store = memory_store();
        assert_eq!(
            store.public_url("uploads/1-logo.webp"),
            "https://assets.example.com/uploads/1-logo.webp"
        );
    }
}
