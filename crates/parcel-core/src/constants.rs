//! Protocol constants shared across crates.

/// Default single-upload threshold, also used as the multipart part size (5 MiB).
pub const DEFAULT_MULTIPART_THRESHOLD_BYTES: u64 = 5 * 1024 * 1024;

/// Validity of a single-shot PUT URL.
pub const DEFAULT_SINGLE_URL_EXPIRY_SECS: u64 = 15 * 60;

/// Validity of each per-part PUT URL.
pub const DEFAULT_PART_URL_EXPIRY_SECS: u64 = 60 * 60;

/// Upper bound on in-flight part presign requests for one invocation.
pub const DEFAULT_PRESIGN_CONCURRENCY: usize = 16;

/// S3 allows part numbers 1..=10_000.
pub const MAX_MULTIPART_PARTS: u32 = 10_000;

/// SigV4 query presigning accepts at most seven days.
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

pub const MISSING_COMPLETION_FIELDS: &str =
    "must provide uploadId, complete, and parts together";

pub const INVALID_JSON_BODY: &str = "Invalid JSON body";
