use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart as S3CompletedPart};
use aws_sdk_s3::Client;
use parcel_core::models::{CompletedPart, CompletedUpload};
use std::time::{Duration, Instant};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_retry_mode(RetryMode::Standard);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config.clone())
            .load()
            .await;

        let client = if let Some(ref endpoint) = endpoint_url {
            let mut s3_config_builder = aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .endpoint_url(endpoint)
                .region(config.region().cloned())
                .retry_config(retry_config);
            if let Some(provider) = config.credentials_provider() {
                s3_config_builder = s3_config_builder.credentials_provider(provider);
            }
            // MinIO and most S3-compatible providers need path-style addressing
            s3_config_builder = s3_config_builder.force_path_style(true);

            Client::from_conf(s3_config_builder.build())
        } else {
            Client::new(&config)
        };

        tracing::info!(
            bucket = %bucket,
            endpoint = endpoint_url.as_deref().unwrap_or("aws"),
            "S3 storage initialized"
        );

        Ok(Self::with_client(client, bucket))
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client, bucket: String) -> Self {
        S3Storage { client, bucket }
    }
}

fn presigning_config(expires_in: Duration) -> StorageResult<PresigningConfig> {
    PresigningConfig::expires_in(expires_in)
        .map_err(|e| StorageError::ConfigError(format!("Invalid presign expiry: {}", e)))
}

/// Message reported by S3 for a failed call, falling back to the full error chain.
fn backend_message<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service_err) => match (service_err.code(), service_err.message()) {
            (_, Some(message)) => message.to_string(),
            (Some(code), None) => code.to_string(),
            (None, None) => DisplayErrorContext(err).to_string(),
        },
        None => DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl Storage for S3Storage {
    #[tracing::instrument(skip(self, content_type), fields(bucket = %self.bucket))]
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| {
                let message = backend_message(&e);
                tracing::error!(error = %message, key = %key, "S3 presign PUT failed");
                StorageError::PresignFailed(message)
            })?;

        Ok(presigned.uri().to_string())
    }

    #[tracing::instrument(skip(self, content_type), fields(bucket = %self.bucket))]
    async fn create_multipart_upload(
        &self,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        let start = Instant::now();

        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                let message = backend_message(&e);
                tracing::error!(
                    error = %message,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Failed to create multipart upload"
                );
                StorageError::MultipartFailed(message)
            })?;

        let upload_id = output
            .upload_id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                StorageError::MultipartFailed("No upload ID returned from S3".to_string())
            })?
            .to_string();

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            upload_id = %upload_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 multipart upload created"
        );

        Ok(upload_id)
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn presigned_part_url(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let s3_part_number = i32::try_from(part_number).map_err(|_| {
            StorageError::PresignFailed(format!("Part number {} out of range", part_number))
        })?;

        let presigned = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(s3_part_number)
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| {
                let message = backend_message(&e);
                tracing::error!(
                    error = %message,
                    key = %key,
                    upload_id = %upload_id,
                    part_number = part_number,
                    "S3 presign upload_part failed"
                );
                StorageError::PresignFailed(message)
            })?;

        Ok(presigned.uri().to_string())
    }

    #[tracing::instrument(skip(self, parts), fields(bucket = %self.bucket, parts = parts.len()))]
    async fn complete_multipart_upload(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> StorageResult<CompletedUpload> {
        let start = Instant::now();

        let s3_parts = parts
            .iter()
            .map(|part| {
                let part_number = i32::try_from(part.part_number).map_err(|_| {
                    StorageError::MultipartFailed(format!(
                        "Part number {} out of range",
                        part.part_number
                    ))
                })?;
                Ok(S3CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(&part.e_tag)
                    .build())
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let completed = CompletedMultipartUpload::builder()
            .set_parts(Some(s3_parts))
            .build();

        let output = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed)
            .send()
            .await
            .map_err(|e| {
                let message = backend_message(&e);
                tracing::error!(
                    error = %message,
                    bucket = %self.bucket,
                    key = %key,
                    upload_id = %upload_id,
                    parts = parts.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Failed to complete multipart upload"
                );
                StorageError::MultipartFailed(message)
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            upload_id = %upload_id,
            parts = parts.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 multipart upload completed"
        );

        Ok(CompletedUpload {
            location: output.location().map(String::from),
            bucket: output.bucket().map(String::from),
            key: output.key().map(String::from),
            e_tag: output.e_tag().map(String::from),
            version_id: output.version_id().map(String::from),
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
