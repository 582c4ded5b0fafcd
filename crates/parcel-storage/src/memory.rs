//! In-process storage backend.
//!
//! Hands out `memory://` URLs and tracks open multipart sessions in a map.
//! Useful for local development and for exercising the API without S3.
//!
//! Sessions are only removed on completion. The table is capped at
//! `DEFAULT_MAX_OPEN_SESSIONS` entries; once full, new sessions are refused
//! until some are completed.

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use parcel_core::models::{CompletedPart, CompletedUpload};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const DEFAULT_MAX_OPEN_SESSIONS: usize = 10_000;

#[derive(Debug, Clone)]
struct Session {
    key: String,
    content_type: String,
}

/// Memory storage implementation
pub struct MemoryStorage {
    bucket: String,
    max_open_sessions: usize,
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self::with_session_limit(bucket, DEFAULT_MAX_OPEN_SESSIONS)
    }

    pub fn with_session_limit(bucket: impl Into<String>, max_open_sessions: usize) -> Self {
        Self {
            bucket: bucket.into(),
            max_open_sessions,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, urlencoding::encode(key))
    }

    /// Number of multipart sessions opened and not yet completed.
    pub async fn open_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "{}?contentType={}&expires={}",
            self.object_url(key),
            urlencoding::encode(content_type),
            expires_in.as_secs()
        ))
    }

    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.max_open_sessions {
            tracing::warn!(
                open_sessions = sessions.len(),
                key = %key,
                "Memory storage session table full"
            );
            return Err(StorageError::MultipartFailed(format!(
                "TooManyOpenSessions: {} multipart uploads are already open",
                self.max_open_sessions
            )));
        }

        let upload_id = Uuid::new_v4().to_string();
        sessions.insert(
            upload_id.clone(),
            Session {
                key: key.to_string(),
                content_type: content_type.to_string(),
            },
        );

        tracing::debug!(key = %key, upload_id = %upload_id, "Memory multipart upload created");
        Ok(upload_id)
    }

    async fn presigned_part_url(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "{}?uploadId={}&partNumber={}&expires={}",
            self.object_url(key),
            urlencoding::encode(upload_id),
            part_number,
            expires_in.as_secs()
        ))
    }

    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> StorageResult<CompletedUpload> {
        let mut sessions = self.sessions.lock().await;
        let known = sessions
            .get(upload_id)
            .is_some_and(|session| session.key == key);
        let session = known
            .then(|| sessions.remove(upload_id))
            .flatten()
            .ok_or_else(|| {
                StorageError::BackendError(
                    "NoSuchUpload: The specified upload does not exist".to_string(),
                )
            })?;

        tracing::debug!(
            key = %session.key,
            content_type = %session.content_type,
            upload_id = %upload_id,
            parts = parts.len(),
            "Memory multipart upload completed"
        );

        Ok(CompletedUpload {
            location: Some(self.object_url(key)),
            bucket: Some(self.bucket.clone()),
            key: Some(key.to_string()),
            e_tag: Some(format!("\"{}-{}\"", upload_id, parts.len())),
            version_id: None,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
