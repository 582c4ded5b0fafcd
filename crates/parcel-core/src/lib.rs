//! Parcel Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! pure negotiation rules shared by the storage and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod negotiation;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use negotiation::{classify, part_count, UploadPhase, UploadRequest};
pub use storage_types::StorageBackend;
