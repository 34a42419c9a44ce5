//! Asset pipeline: normalize, name, store, resolve.
//!
//! This module owns the lifecycle of one uploaded image:
//! - `normalize` - best-effort conversion to the canonical WebP encoding
//! - `reference` - the dual-shape stored reference (key vs. legacy URL)
//!   and its read-time resolution into a usable URL
//! - `service` - the lifecycle manager, the only entry point callers
//!   invoke directly

mod error;
mod normalize;
mod reference;
mod service;

pub use error::MediaError;
pub use normalize::{
    CANONICAL_CONTENT_TYPE, CANONICAL_EXTENSION, NormalizeOutcome, NormalizedImage, WEBP_QUALITY,
    normalize,
};
pub use reference::{AssetReference, resolve_reference};
pub use service::{MediaService, UploadedAsset};
