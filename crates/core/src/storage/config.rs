//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region. R2 uses the literal region `auto`.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-memory store (tests only)
    Memory,
}

impl StorageProvider {
    /// Create an S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create a Cloudflare R2 provider.
    ///
    /// R2 exposes an S3-compatible endpoint derived from the account ID.
    #[must_use]
    pub fn r2(
        account_id: &str,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self::s3(
            format!("https://{account_id}.r2.cloudflarestorage.com"),
            bucket,
            access_key_id,
            secret_access_key,
            "auto",
        )
    }

    /// Create a local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Create an in-memory provider (tests only).
    #[must_use]
    pub const fn memory() -> Self {
        Self::Memory
    }

    /// Get the provider name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket/root name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Object store configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Custom domain mapped to the bucket for public reads.
    ///
    /// Public URLs are `https://{public_domain}/{key}` - permanent,
    /// unsigned, and valid for as long as the domain mapping holds.
    pub public_domain: String,
}

impl StorageConfig {
    /// Create a new storage config.
    #[must_use]
    pub fn new(provider: StorageProvider, public_domain: impl Into<String>) -> Self {
        Self {
            provider,
            public_domain: public_domain.into(),
        }
    }

    /// Construct the permanent public URL for an object key.
    ///
    /// Pure string construction - no network call, no expiry. The URL's
    /// validity depends entirely on the bucket being configured for public
    /// read under the custom domain.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}/{key}", self.public_domain)
    }
}
