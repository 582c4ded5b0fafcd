//! Parcel API Library
//!
//! This crate provides the HTTP surface of the upload negotiator: the
//! negotiation service, its axum handlers and application setup.

pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::negotiator::{NegotiatorSettings, UploadNegotiator};
pub use state::AppState;
