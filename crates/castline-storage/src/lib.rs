//! Castline Storage Library
//!
//! Object storage abstraction for episode audio, with S3 and local filesystem
//! backends, and the signed URL issuer the pipeline hands out to clients.
//!
//! # Storage key format
//!
//! - **Draft audio**: `drafts/{owner_id}/{draft_id}/original.{ext}` and `.../edits/{revision}.{ext}`
//! - **Episode audio**: `episodes/{podcast_id}/{episode_id}/{revision}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod issuer;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use castline_core::StorageBackend;
pub use factory::{create_storage, StorageHandle};
pub use issuer::{SignedUrl, SignedUrlIssuer, UrlTtls};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::UrlSigner;
pub use traits::{Storage, StorageError, StorageResult};
