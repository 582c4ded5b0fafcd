//! Upload negotiation service.
//!
//! Turns one upload request into a presigned single PUT URL, a new multipart
//! session with per-part URLs, or a completed multipart object. The service
//! holds no per-request state; the storage handle and settings are fixed at
//! construction.

use futures::stream::{self, StreamExt, TryStreamExt};
use parcel_core::constants::{
    DEFAULT_MULTIPART_THRESHOLD_BYTES, DEFAULT_PART_URL_EXPIRY_SECS, DEFAULT_PRESIGN_CONCURRENCY,
    DEFAULT_SINGLE_URL_EXPIRY_SECS,
};
use parcel_core::models::{
    CompletedPart, MultipartCompleteResult, MultipartStartPlan, NegotiationOutcome, PartUrl,
    SingleUploadPlan, UploadRequestBody,
};
use parcel_core::{AppError, Config, UploadPhase, UploadRequest};
use parcel_storage::{validate_key, Storage};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct NegotiatorSettings {
    /// Largest size served by a single PUT; also the multipart part size.
    pub multipart_threshold_bytes: u64,
    pub single_url_expiry: Duration,
    pub part_url_expiry: Duration,
    pub presign_concurrency: usize,
}

impl Default for NegotiatorSettings {
    fn default() -> Self {
        Self {
            multipart_threshold_bytes: DEFAULT_MULTIPART_THRESHOLD_BYTES,
            single_url_expiry: Duration::from_secs(DEFAULT_SINGLE_URL_EXPIRY_SECS),
            part_url_expiry: Duration::from_secs(DEFAULT_PART_URL_EXPIRY_SECS),
            presign_concurrency: DEFAULT_PRESIGN_CONCURRENCY,
        }
    }
}

impl NegotiatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            multipart_threshold_bytes: config.multipart_threshold_bytes(),
            single_url_expiry: config.single_url_expiry(),
            part_url_expiry: config.part_url_expiry(),
            presign_concurrency: config.presign_concurrency(),
        }
    }
}

pub struct UploadNegotiator {
    storage: Arc<dyn Storage>,
    settings: NegotiatorSettings,
}

impl UploadNegotiator {
    pub fn new(storage: Arc<dyn Storage>, settings: NegotiatorSettings) -> Self {
        Self { storage, settings }
    }

    /// Run one negotiation.
    ///
    /// All validation happens before the first storage call, so a rejected
    /// request never opens a session or signs a URL.
    #[tracing::instrument(skip(self, body), fields(operation = "negotiate_upload"))]
    pub async fn negotiate(&self, body: UploadRequestBody) -> Result<NegotiationOutcome, AppError> {
        let request = UploadRequest::from_body(body)?;
        validate_key(&request.file_name)?;

        match request.phase(self.settings.multipart_threshold_bytes)? {
            UploadPhase::Single => self.single(&request).await,
            UploadPhase::MultipartStart { total_parts } => {
                self.start_multipart(&request, total_parts).await
            }
            UploadPhase::MultipartComplete { upload_id, parts } => {
                self.complete_multipart(&request, upload_id, parts).await
            }
        }
    }

    async fn single(&self, request: &UploadRequest) -> Result<NegotiationOutcome, AppError> {
        let url = self
            .storage
            .presigned_put_url(
                &request.file_name,
                &request.content_type,
                self.settings.single_url_expiry,
            )
            .await?;

        tracing::info!(
            file_name = %request.file_name,
            file_size = request.file_size,
            "Issued single upload URL"
        );

        Ok(NegotiationOutcome::Single(SingleUploadPlan::new(
            &request.file_name,
            &request.content_type,
            url,
        )))
    }

    async fn start_multipart(
        &self,
        request: &UploadRequest,
        total_parts: u32,
    ) -> Result<NegotiationOutcome, AppError> {
        let start = Instant::now();
        let key = request.file_name.as_str();

        let upload_id = self
            .storage
            .create_multipart_upload(key, &request.content_type)
            .await?;

        let storage = &self.storage;
        let expiry = self.settings.part_url_expiry;
        let session = upload_id.as_str();

        let mut urls: Vec<PartUrl> = stream::iter(1..=total_parts)
            .map(move |part_number| async move {
                storage
                    .presigned_part_url(key, session, part_number, expiry)
                    .await
                    .map(|url| PartUrl { part_number, url })
            })
            .buffer_unordered(self.settings.presign_concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| {
                // The session stays open on the backend; nothing aborts it.
                tracing::warn!(
                    upload_id = %upload_id,
                    file_name = %key,
                    error = %e,
                    "Part URL presign failed after multipart session was created"
                );
                AppError::from(e)
            })?;

        urls.sort_by_key(|part| part.part_number);

        tracing::info!(
            file_name = %key,
            file_size = request.file_size,
            upload_id = %upload_id,
            total_parts = total_parts,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Started multipart upload"
        );

        Ok(NegotiationOutcome::MultipartStarted(MultipartStartPlan::new(
            key,
            &request.content_type,
            upload_id,
            urls,
        )))
    }

    async fn complete_multipart(
        &self,
        request: &UploadRequest,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<NegotiationOutcome, AppError> {
        let result = self
            .storage
            .complete_multipart_upload(&request.file_name, upload_id, parts)
            .await?;

        tracing::info!(
            file_name = %request.file_name,
            upload_id = %upload_id,
            parts = parts.len(),
            "Completed multipart upload"
        );

        Ok(NegotiationOutcome::MultipartCompleted(
            MultipartCompleteResult::new(&request.file_name, result),
        ))
    }
}
