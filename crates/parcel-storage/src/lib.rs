//! Parcel Storage Library
//!
//! This crate provides the object store abstraction used by the upload
//! negotiator, with an S3 implementation and an in-process memory backend.
//!
//! # Object keys
//!
//! The object key is the client-supplied file name, unchanged. Keys must not
//! contain a `..` segment, a leading `/` or control characters; see `keys`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::validate_key;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use parcel_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
