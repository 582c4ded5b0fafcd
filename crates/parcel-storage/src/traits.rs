//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object store backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use parcel_core::models::{CompletedPart, CompletedUpload};
use parcel_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
///
/// Each variant carries the backend's own message, which is surfaced to the
/// client unchanged.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Multipart operation failed: {0}")]
    MultipartFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// The backend message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            StorageError::PresignFailed(msg)
            | StorageError::MultipartFailed(msg)
            | StorageError::InvalidKey(msg)
            | StorageError::BackendError(msg)
            | StorageError::ConfigError(msg) => msg,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey(msg) => AppError::Validation(msg),
            other => AppError::Storage(other.message().to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store abstraction trait
///
/// The negotiator only ever talks to the store through these four calls; the
/// object bytes themselves never pass through this process.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a presigned PUT URL for a single-shot upload of `key`.
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Open a multipart session for `key` and return its upload id.
    async fn create_multipart_upload(&self, key: &str, content_type: &str)
        -> StorageResult<String>;

    /// Generate a presigned PUT URL for one part of an open session.
    async fn presigned_part_url(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Stitch the uploaded parts into the final object.
    ///
    /// `parts` are passed to the store exactly as given; ordering and
    /// duplicate checks are left to the store.
    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> StorageResult<CompletedUpload>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
