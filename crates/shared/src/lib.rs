//! Shared configuration for Vitrine.
//!
//! This crate provides the application configuration consumed by the
//! server and migrator binaries:
//! - Server bind settings
//! - Object storage credentials (Cloudflare R2 / S3-compatible)
//! - Public domain mapping for asset URLs

pub mod config;

pub use config::{AppConfig, ServerConfig, StorageSettings};
