//! Application state shared by all handlers.

use crate::services::negotiator::{NegotiatorSettings, UploadNegotiator};
use parcel_core::{Config, StorageBackend};
use parcel_storage::Storage;
use std::sync::Arc;

/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub negotiator: UploadNegotiator,
    pub storage_backend: StorageBackend,
}

impl AppState {
    pub fn new(config: &Config, storage: Arc<dyn Storage>) -> Self {
        let storage_backend = storage.backend_type();
        Self {
            negotiator: UploadNegotiator::new(storage, NegotiatorSettings::from_config(config)),
            storage_backend,
        }
    }
}
