//! Media asset pipeline for Vitrine.
//!
//! This crate contains the full lifecycle of a tenant-uploaded image with
//! ZERO web or database dependencies:
//!
//! - `naming` - Deterministic, collision-resistant object key generation
//! - `storage` - Object store client (Cloudflare R2 / S3 / fs / memory)
//! - `asset` - Normalization, reference resolution, and the lifecycle
//!   manager callers invoke directly
//! - `migrate` - Offline backfill of legacy absolute-URL references

pub mod asset;
pub mod migrate;
pub mod naming;
pub mod storage;
