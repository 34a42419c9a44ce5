//! Asset pipeline error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Asset pipeline errors.
///
/// Deliberately coarse: normalization problems never surface here at all
/// (the pipeline falls back to the original bytes), and resolution cannot
/// fail by construction. Only store-layer failures escape.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The normalize-then-store pipeline could not complete the write.
    ///
    /// Surfaced to the caller as a single generic failure; not retried
    /// automatically. A failed upload never results in a stored reference.
    #[error("upload failed: {0}")]
    UploadFailed(#[source] StorageError),

    /// A remove or rename operation failed in the store layer.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
