//! Configuration module
//!
//! Configuration is read once at process start (environment plus an optional
//! `.env` file) and then passed explicitly to the storage factory and the
//! negotiator. Nothing reads the environment after startup.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MULTIPART_THRESHOLD_BYTES, DEFAULT_PART_URL_EXPIRY_SECS, DEFAULT_PRESIGN_CONCURRENCY,
    DEFAULT_SINGLE_URL_EXPIRY_SECS, MAX_PRESIGN_EXPIRY_SECS,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub max_request_body_bytes: usize,
    pub environment: String,
    pub log_json: bool,
}

/// Object store and negotiation settings
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub multipart_threshold_bytes: u64,
    pub single_url_expiry_secs: u64,
    pub part_url_expiry_secs: u64,
    pub presign_concurrency: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub upload: UploadConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: parse_or(&lookup, "PORT", SERVER_PORT)?,
            cors_origins,
            max_request_body_bytes: parse_or(
                &lookup,
                "MAX_REQUEST_BODY_BYTES",
                MAX_REQUEST_BODY_BYTES,
            )?,
            environment,
            log_json: lookup("LOG_FORMAT")
                .map(|s| s.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let upload = UploadConfig {
            storage_backend,
            s3_bucket: lookup("S3_BUCKET").or_else(|| lookup("BUCKET_NAME")),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            multipart_threshold_bytes: parse_or(
                &lookup,
                "MULTIPART_THRESHOLD_BYTES",
                DEFAULT_MULTIPART_THRESHOLD_BYTES,
            )?,
            single_url_expiry_secs: parse_or(
                &lookup,
                "SINGLE_URL_EXPIRY_SECS",
                DEFAULT_SINGLE_URL_EXPIRY_SECS,
            )?,
            part_url_expiry_secs: parse_or(
                &lookup,
                "PART_URL_EXPIRY_SECS",
                DEFAULT_PART_URL_EXPIRY_SECS,
            )?,
            presign_concurrency: parse_or(
                &lookup,
                "PRESIGN_CONCURRENCY",
                DEFAULT_PRESIGN_CONCURRENCY,
            )?,
        };

        Ok(Config { base, upload })
    }

    /// Fail fast on settings that would break every request.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.upload.multipart_threshold_bytes == 0 {
            return Err(anyhow::anyhow!("MULTIPART_THRESHOLD_BYTES cannot be 0"));
        }

        if self.upload.presign_concurrency == 0 {
            return Err(anyhow::anyhow!("PRESIGN_CONCURRENCY cannot be 0"));
        }

        for (name, secs) in [
            ("SINGLE_URL_EXPIRY_SECS", self.upload.single_url_expiry_secs),
            ("PART_URL_EXPIRY_SECS", self.upload.part_url_expiry_secs),
        ] {
            if secs == 0 || secs > MAX_PRESIGN_EXPIRY_SECS {
                return Err(anyhow::anyhow!(
                    "{} must be between 1 and {} seconds",
                    name,
                    MAX_PRESIGN_EXPIRY_SECS
                ));
            }
        }

        if self.upload.storage_backend == StorageBackend::S3 {
            if self.s3_bucket().is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.region().is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.base.max_request_body_bytes
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn log_json(&self) -> bool {
        self.base.log_json
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.upload.storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.upload.s3_bucket.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.upload.s3_endpoint.as_deref()
    }

    /// S3_REGION takes precedence over AWS_REGION.
    pub fn region(&self) -> Option<&str> {
        self.upload
            .s3_region
            .as_deref()
            .or(self.upload.aws_region.as_deref())
    }

    pub fn multipart_threshold_bytes(&self) -> u64 {
        self.upload.multipart_threshold_bytes
    }

    pub fn single_url_expiry(&self) -> Duration {
        Duration::from_secs(self.upload.single_url_expiry_secs)
    }

    pub fn part_url_expiry(&self) -> Duration {
        Duration::from_secs(self.upload.part_url_expiry_secs)
    }

    pub fn presign_concurrency(&self) -> usize {
        self.upload.presign_concurrency
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
