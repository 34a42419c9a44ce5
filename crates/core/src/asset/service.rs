//! Asset lifecycle manager.

use std::sync::Arc;

use tracing::{info, warn};

use super::error::MediaError;
use super::normalize::{
    CANONICAL_CONTENT_TYPE, CANONICAL_EXTENSION, NormalizeOutcome, NormalizedImage, normalize,
};
use super::reference::{AssetReference, resolve_reference};
use crate::naming;
use crate::storage::ObjectStore;

/// Result of a successful upload.
///
/// Both the key and the URL are returned so the caller can persist the key
/// (the canonical reference) while using the URL immediately for display
/// without a second resolution round-trip.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    /// Object key to persist on the parent entity.
    pub key: String,
    /// Permanent public URL for immediate display.
    pub url: String,
    /// Content type the bytes were stored under.
    pub content_type: String,
    /// What normalization did (observable fail-open).
    pub outcome: NormalizeOutcome,
}

/// Orchestrates upload, removal, and rename of binary assets.
///
/// The only pipeline component callers invoke directly. Holds no mutable
/// state; concurrent operations never require locking. Two callers racing
/// to replace the same parent entity's image are resolved at the caller
/// level (last write wins, the loser's object becomes an orphan).
pub struct MediaService {
    store: Arc<ObjectStore>,
}

impl MediaService {
    /// Create a new lifecycle manager over an object store client.
    #[must_use]
    pub fn new(store: Arc<ObjectStore>) -> Self {
        Self { store }
    }

    /// Upload one asset: normalize, name, store.
    ///
    /// Normalization failures are absorbed (the original bytes are stored
    /// verbatim); only a store-layer failure aborts the upload, as a single
    /// [`MediaError::UploadFailed`]. Nothing is persisted on failure.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::UploadFailed`] if the object write fails.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        declared_content_type: &str,
    ) -> Result<UploadedAsset, MediaError> {
        let normalized = self
            .normalize_off_loop(bytes, declared_content_type)
            .await;

        // Keep extension and content type consistent for consumers that
        // infer one from the other.
        let file_name = if normalized.content_type == CANONICAL_CONTENT_TYPE
            && !file_name.ends_with(&format!(".{CANONICAL_EXTENSION}"))
        {
            naming::rewrite_extension(file_name, CANONICAL_EXTENSION)
        } else {
            file_name.to_string()
        };

        let key = naming::object_key(&file_name);

        self.store
            .put(&key, normalized.bytes, &normalized.content_type)
            .await
            .map_err(MediaError::UploadFailed)?;

        let url = self.store.public_url(&key);

        info!(
            key = %key,
            content_type = %normalized.content_type,
            outcome = normalized.outcome.as_str(),
            "asset uploaded"
        );

        Ok(UploadedAsset {
            key,
            url,
            content_type: normalized.content_type,
            outcome: normalized.outcome,
        })
    }

    /// Remove an asset. Idempotent; removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub async fn remove(&self, key: &str) -> Result<(), MediaError> {
        self.store.delete(key).await?;
        Ok(())
    }

    /// Rename an asset to a freshly named key, deleting the original.
    ///
    /// # Errors
    ///
    /// Returns an error if the server-side copy fails.
    pub async fn rename(&self, old_key: &str, new_file_name: &str) -> Result<String, MediaError> {
        let new_key = self.store.copy_and_delete(old_key, new_file_name).await?;
        Ok(new_key)
    }

    /// Resolve a stored reference into a usable URL.
    #[must_use]
    pub fn resolve(&self, reference: Option<&AssetReference>) -> Option<String> {
        resolve_reference(reference, &self.store)
    }

    /// Access the underlying object store client.
    #[must_use]
    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Run normalization off the request event loop.
    ///
    /// Normalization is CPU-bound; `spawn_blocking` keeps concurrent
    /// requests unaffected. A panicked task is treated like any other
    /// normalization failure: the original bytes pass through.
    async fn normalize_off_loop(
        &self,
        bytes: Vec<u8>,
        declared_content_type: &str,
    ) -> NormalizedImage {
        let content_type = declared_content_type.to_string();
        let input = bytes.clone();

        match tokio::task::spawn_blocking(move || normalize(input, &content_type)).await {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!(error = %e, "normalization task failed, storing original bytes");
                NormalizedImage {
                    bytes,
                    content_type: declared_content_type.to_string(),
                    outcome: NormalizeOutcome::Failed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageConfig, StorageProvider};

    fn media_service() -> MediaService {
        let config = StorageConfig::new(StorageProvider::memory(), "assets.example.com");
        let store = ObjectStore::from_config(config).expect("memory store should initialize");
        MediaService::new(Arc::new(store))
    }

    fn red_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(100, 100, image::Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encode");
        bytes
    }

    #[tokio::test]
    async fn test_upload_round_trip() {
        let service = media_service();
        let uploaded = service
            .upload(red_png(), "red.png", "image/png")
            .await
            .expect("upload should succeed");

        assert_eq!(uploaded.content_type, "image/webp");
        assert_eq!(uploaded.outcome, NormalizeOutcome::Converted);
        assert!(uploaded.key.starts_with("uploads/"));
        assert!(uploaded.key.ends_with(".webp"));
        assert_eq!(
            uploaded.url,
            format!("https://assets.example.com/{}", uploaded.key)
        );
        assert!(service.store().exists(&uploaded.key).await);

        // The stored key resolves to the same URL on read.
        let reference = AssetReference::parse(&uploaded.key);
        assert_eq!(service.resolve(reference.as_ref()), Some(uploaded.url));
    }

    #[tokio::test]
    async fn test_upload_non_image_stores_original() {
        let service = media_service();
        let bytes = b"plain text file".to_vec();
        let uploaded = service
            .upload(bytes, "notes.txt", "text/plain")
            .await
            .expect("upload should succeed");

        assert_eq!(uploaded.content_type, "text/plain");
        assert_eq!(uploaded.outcome, NormalizeOutcome::NotAnImage);
        assert!(uploaded.key.ends_with("-notes.txt"));
    }

    #[tokio::test]
    async fn test_upload_undecodable_image_fails_open() {
        let service = media_service();
        let bytes = b"corrupt".to_vec();
        let uploaded = service
            .upload(bytes, "broken.png", "image/png")
            .await
            .expect("upload must survive normalization failure");

        assert_eq!(uploaded.content_type, "image/png");
        assert_eq!(uploaded.outcome, NormalizeOutcome::Failed);
        // Extension stays .png: the stored bytes are still the original PNG data.
        assert!(uploaded.key.ends_with("-broken.png"));
    }

    #[tokio::test]
    async fn test_upload_sanitizes_file_name() {
        let service = media_service();
        let uploaded = service
            .upload(b"x".to_vec(), "minha loja (1).bin", "application/octet-stream")
            .await
            .expect("upload should succeed");

        assert!(uploaded.key.ends_with("-minha_loja__1_.bin"));
    }

    #[tokio::test]
    async fn test_delete_then_resolve_still_returns_url() {
        let service = media_service();
        let uploaded = service
            .upload(red_png(), "logo.png", "image/png")
            .await
            .expect("upload should succeed");

        service.remove(&uploaded.key).await.expect("remove");
        service.remove(&uploaded.key).await.expect("remove twice");

        // Resolution is existence-agnostic: a deleted key still yields a
        // well-formed URL. Liveness is the rendering layer's concern.
        let reference = AssetReference::Key(uploaded.key.clone());
        assert_eq!(service.resolve(Some(&reference)), Some(uploaded.url));
    }

    #[tokio::test]
    async fn test_rename_yields_new_key() {
        let service = media_service();
        let uploaded = service
            .upload(red_png(), "logo.png", "image/png")
            .await
            .expect("upload should succeed");

        let new_key = service
            .rename(&uploaded.key, "rebrand.png")
            .await
            .expect("rename should succeed");

        assert_ne!(new_key, uploaded.key);
        assert!(service.store().exists(&new_key).await);
        assert!(!service.store().exists(&uploaded.key).await);

        // Old key deletion stays idempotent after the rename.
        service.remove(&uploaded.key).await.expect("idempotent remove");
    }
}
