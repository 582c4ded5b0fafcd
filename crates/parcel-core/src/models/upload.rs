//! Upload negotiation wire models.
//!
//! Every value here is request-scoped: it is created for one invocation and
//! handed back to the caller. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::MAX_MULTIPART_PARTS;

/// Raw request body as received.
///
/// All fields are optional at this level so that a missing field is reported as
/// a validation error naming that field instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequestBody {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Declared object size in bytes
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Multipart session identifier returned by a previous start call
    #[serde(default)]
    pub upload_id: Option<String>,
    #[serde(default)]
    pub complete: Option<bool>,
    /// Uploaded parts, in the order the client wants them stitched
    #[serde(default)]
    pub parts: Option<Vec<CompletedPart>>,
}

/// One uploaded part as reported by the client after its PUT succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPart {
    #[validate(range(
        min = 1,
        max = MAX_MULTIPART_PARTS,
        message = "partNumber must be between 1 and 10000"
    ))]
    pub part_number: u32,
    #[validate(length(min = 1, message = "eTag must not be empty"))]
    pub e_tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadType {
    Single,
    Multipart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleUploadPlan {
    pub upload_type: UploadType,
    pub file_name: String,
    pub content_type: String,
    pub url: String,
}

impl SingleUploadPlan {
    pub fn new(file_name: &str, content_type: &str, url: String) -> Self {
        Self {
            upload_type: UploadType::Single,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            url,
        }
    }
}

/// Presigned URL for one part of a multipart session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartUrl {
    pub part_number: u32,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartStartPlan {
    pub upload_type: UploadType,
    pub file_name: String,
    pub content_type: String,
    pub upload_id: String,
    pub total_parts: u32,
    /// Ordered by part number, 1..=total_parts
    pub urls: Vec<PartUrl>,
}

impl MultipartStartPlan {
    pub fn new(file_name: &str, content_type: &str, upload_id: String, urls: Vec<PartUrl>) -> Self {
        Self {
            upload_type: UploadType::Multipart,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            upload_id,
            total_parts: urls.len() as u32,
            urls,
        }
    }
}

/// Completion record returned by the object store.
///
/// Uses the S3 field names so clients see the backend's own record shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompletedUpload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "ETag", default, skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartCompleteResult {
    pub upload_type: UploadType,
    pub file_name: String,
    pub result: CompletedUpload,
}

impl MultipartCompleteResult {
    pub fn new(file_name: &str, result: CompletedUpload) -> Self {
        Self {
            upload_type: UploadType::Multipart,
            file_name: file_name.to_string(),
            result,
        }
    }
}

/// The successful outcome of one negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NegotiationOutcome {
    Single(SingleUploadPlan),
    MultipartStarted(MultipartStartPlan),
    MultipartCompleted(MultipartCompleteResult),
}

impl NegotiationOutcome {
    pub fn upload_type(&self) -> UploadType {
        match self {
            NegotiationOutcome::Single(_) => UploadType::Single,
            NegotiationOutcome::MultipartStarted(_) | NegotiationOutcome::MultipartCompleted(_) => {
                UploadType::Multipart
            }
        }
    }
}
