//! Object store client using Apache OpenDAL.
//!
//! Thin wrapper around a remote bucket: put, delete, copy-and-rename, and
//! pure public URL construction. No business logic lives here.
//!
//! Providers:
//! - S3-compatible: Cloudflare R2 (production), AWS S3
//! - Local filesystem (development)
//! - In-memory (tests)
//!
//! The client is an explicitly constructed, passed-in dependency: handlers
//! receive an `Arc<ObjectStore>` rather than reaching for process-global
//! state, so tests can substitute the in-memory backend.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::ObjectStore;
