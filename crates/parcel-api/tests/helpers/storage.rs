//! Recording storage stub.
//!
//! Counts every call, keeps the parts it was asked to complete, can be told
//! to fail, and answers part presigns in reverse part order.

use async_trait::async_trait;
use parcel_core::models::{CompletedPart, CompletedUpload};
use parcel_storage::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const UPLOAD_ID: &str = "stub-upload-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Nothing,
    PresignPut,
    CreateMultipart,
    PresignPart(u32),
    Complete,
}

pub struct RecordingStorage {
    fail_on: FailOn,
    /// Per-part delay unit; part `n` of `max_part` waits `(max_part - n) * unit`.
    part_delay_unit: Duration,
    max_part_hint: u32,
    put_calls: AtomicUsize,
    create_calls: AtomicUsize,
    part_calls: AtomicUsize,
    complete_calls: AtomicUsize,
    part_completion_order: Mutex<Vec<u32>>,
    completed_parts: Mutex<Vec<CompletedPart>>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::failing(FailOn::Nothing)
    }

    pub fn failing(fail_on: FailOn) -> Self {
        Self {
            fail_on,
            part_delay_unit: Duration::ZERO,
            max_part_hint: 0,
            put_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            part_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            part_completion_order: Mutex::new(Vec::new()),
            completed_parts: Mutex::new(Vec::new()),
        }
    }

    /// Make higher part numbers finish first.
    pub fn with_reverse_part_delays(mut self, max_part: u32, unit: Duration) -> Self {
        self.max_part_hint = max_part;
        self.part_delay_unit = unit;
        self
    }

    pub fn total_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
            + self.create_calls.load(Ordering::SeqCst)
            + self.part_calls.load(Ordering::SeqCst)
            + self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn part_calls(&self) -> usize {
        self.part_calls.load(Ordering::SeqCst)
    }

    pub fn complete_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }

    pub fn part_completion_order(&self) -> Vec<u32> {
        self.part_completion_order.lock().unwrap().clone()
    }

    pub fn completed_parts(&self) -> Vec<CompletedPart> {
        self.completed_parts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn presigned_put_url(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == FailOn::PresignPut {
            return Err(StorageError::PresignFailed(
                "The AWS Access Key Id you provided does not exist in our records.".to_string(),
            ));
        }
        Ok(format!(
            "https://stub.example/{}?X-Amz-Expires={}",
            key,
            expires_in.as_secs()
        ))
    }

    async fn create_multipart_upload(
        &self,
        _key: &str,
        _content_type: &str,
    ) -> StorageResult<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == FailOn::CreateMultipart {
            return Err(StorageError::MultipartFailed("Access Denied".to_string()));
        }
        Ok(UPLOAD_ID.to_string())
    }

    async fn presigned_part_url(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.part_calls.fetch_add(1, Ordering::SeqCst);

        let steps = self.max_part_hint.saturating_sub(part_number);
        if !self.part_delay_unit.is_zero() {
            tokio::time::sleep(self.part_delay_unit * steps).await;
        }

        if self.fail_on == FailOn::PresignPart(part_number) {
            return Err(StorageError::PresignFailed("SlowDown".to_string()));
        }

        self.part_completion_order.lock().unwrap().push(part_number);
        Ok(format!(
            "https://stub.example/{}?uploadId={}&partNumber={}&X-Amz-Expires={}",
            key,
            upload_id,
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
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        *self.completed_parts.lock().unwrap() = parts.to_vec();
        if self.fail_on == FailOn::Complete {
            return Err(StorageError::MultipartFailed(
                "The specified upload does not exist.".to_string(),
            ));
        }
        Ok(CompletedUpload {
            location: Some(format!("https://stub.example/{}", key)),
            bucket: Some("stub-bucket".to_string()),
            key: Some(key.to_string()),
            e_tag: Some(format!("\"{}-{}\"", upload_id, parts.len())),
            version_id: None,
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
