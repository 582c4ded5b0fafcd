//! Object key checks shared by all backends.
//!
//! The key is the file name as sent by the client. It is rejected when it
//! could escape the bucket prefix or break URL signing.

use crate::traits::{StorageError, StorageResult};

/// Validate a client-supplied object key.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "fileName must not start with '/'".to_string(),
        ));
    }

    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "fileName must not contain '..' path segments".to_string(),
        ));
    }

    if key.chars().any(char::is_control) {
        return Err(StorageError::InvalidKey(
            "fileName must not contain control characters".to_string(),
        ));
    }

    Ok(())
}
