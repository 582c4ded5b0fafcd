//! Upload protocol rules.
//!
//! Everything in here is pure: classification by declared size, part counting,
//! required-field validation and multipart sub-phase selection. No storage call
//! is made before these checks pass.

use crate::constants::{MAX_MULTIPART_PARTS, MISSING_COMPLETION_FIELDS};
use crate::error::AppError;
use crate::models::{CompletedPart, UploadRequestBody, UploadType};
use validator::Validate;

/// Decide between a single PUT and a multipart upload.
///
/// An absent or zero size, or any size up to and including `threshold`, is a
/// single upload.
pub fn classify(file_size: Option<u64>, threshold: u64) -> UploadType {
    match file_size {
        Some(size) if size > threshold => UploadType::Multipart,
        _ => UploadType::Single,
    }
}

/// Number of parts needed to carry `file_size` bytes in `part_size` chunks.
pub fn part_count(file_size: u64, part_size: u64) -> u64 {
    file_size.div_ceil(part_size.max(1))
}

/// Request with the always-required fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub file_size: u64,
    pub upload_id: Option<String>,
    pub complete: Option<bool>,
    pub parts: Option<Vec<CompletedPart>>,
}

/// The protocol step a request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhase<'a> {
    Single,
    MultipartStart {
        total_parts: u32,
    },
    MultipartComplete {
        upload_id: &'a str,
        parts: &'a [CompletedPart],
    },
}

impl UploadRequest {
    /// Check the fields every phase needs. Empty strings count as missing.
    pub fn from_body(body: UploadRequestBody) -> Result<Self, AppError> {
        let file_name = body.file_name.filter(|s| !s.trim().is_empty());
        let content_type = body.content_type.filter(|s| !s.trim().is_empty());
        let file_size = body.file_size;

        let missing: Vec<&str> = [
            ("fileName", file_name.is_none()),
            ("contentType", content_type.is_none()),
            ("fileSize", file_size.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, is_missing)| is_missing.then_some(name))
        .collect();

        let (Some(file_name), Some(content_type), Some(file_size)) =
            (file_name, content_type, file_size)
        else {
            return Err(AppError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        };

        Ok(Self {
            file_name,
            content_type,
            file_size,
            upload_id: body.upload_id,
            complete: body.complete,
            parts: body.parts,
        })
    }

    pub fn upload_type(&self, threshold: u64) -> UploadType {
        classify(Some(self.file_size), threshold)
    }

    /// Select the protocol step.
    ///
    /// For multipart sizes the checks run in order: no `uploadId` starts a
    /// session; `uploadId` with `complete == true` and a non-empty `parts` list
    /// completes it; anything else is rejected.
    pub fn phase(&self, threshold: u64) -> Result<UploadPhase<'_>, AppError> {
        if self.upload_type(threshold) == UploadType::Single {
            return Ok(UploadPhase::Single);
        }

        match (
            self.upload_id.as_deref(),
            self.complete,
            self.parts.as_deref(),
        ) {
            (None, _, _) => {
                let total_parts = part_count(self.file_size, threshold);
                if total_parts > u64::from(MAX_MULTIPART_PARTS) {
                    return Err(AppError::Validation(format!(
                        "fileSize {} needs {} parts of {} bytes; at most {} parts are allowed",
                        self.file_size, total_parts, threshold, MAX_MULTIPART_PARTS
                    )));
                }
                Ok(UploadPhase::MultipartStart {
                    total_parts: total_parts as u32,
                })
            }
            (Some(upload_id), Some(true), Some(parts))
                if !upload_id.is_empty() && !parts.is_empty() =>
            {
                for (index, part) in parts.iter().enumerate() {
                    part.validate().map_err(|e| {
                        AppError::Validation(format!("parts[{}]: {}", index, e))
                    })?;
                }
                Ok(UploadPhase::MultipartComplete { upload_id, parts })
            }
            _ => Err(AppError::Validation(MISSING_COMPLETION_FIELDS.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MULTIPART_THRESHOLD_BYTES as LIMIT;

    fn body(file_size: u64) -> UploadRequestBody {
        UploadRequestBody {
            file_name: Some("a.bin".to_string()),
            content_type: Some("application/octet-stream".to_string()),
            file_size: Some(file_size),
            ..Default::default()
        }
    }

    fn part(n: u32) -> CompletedPart {
        CompletedPart {
            part_number: n,
            e_tag: format!("\"etag-{}\"", n),
        }
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(None, LIMIT), UploadType::Single);
        assert_eq!(classify(Some(0), LIMIT), UploadType::Single);
        assert_eq!(classify(Some(1), LIMIT), UploadType::Single);
        assert_eq!(classify(Some(LIMIT), LIMIT), UploadType::Single);
        assert_eq!(classify(Some(LIMIT + 1), LIMIT), UploadType::Multipart);
        assert_eq!(classify(Some(u64::MAX), LIMIT), UploadType::Multipart);
    }

    #[test]
    fn test_part_count_is_ceiling() {
        assert_eq!(part_count(LIMIT + 1, LIMIT), 2);
        assert_eq!(part_count(2 * LIMIT, LIMIT), 2);
        assert_eq!(part_count(12 * 1024 * 1024, LIMIT), 3);
        assert_eq!(part_count(10, 3), 4);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let err = UploadRequest::from_body(UploadRequestBody::default()).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("fileName"));
                assert!(msg.contains("contentType"));
                assert!(msg.contains("fileSize"));
            }
            other => panic!("Expected Validation, got {:?}", other),
        }

        let mut only_size_missing = body(1);
        only_size_missing.file_size = None;
        let err = UploadRequest::from_body(only_size_missing).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "Missing required field(s): fileSize");
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let mut b = body(1);
        b.file_name = Some(String::new());
        b.content_type = Some("   ".to_string());
        let err = UploadRequest::from_body(b).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("fileName"));
                assert!(msg.contains("contentType"));
                assert!(!msg.contains("fileSize"));
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_size_is_single() {
        let request = UploadRequest::from_body(body(0)).unwrap();
        assert_eq!(request.phase(LIMIT).unwrap(), UploadPhase::Single);
    }

    #[test]
    fn test_small_size_ignores_multipart_fields() {
        let mut b = body(1024);
        b.upload_id = Some("dangling".to_string());
        let request = UploadRequest::from_body(b).unwrap();
        assert_eq!(request.phase(LIMIT).unwrap(), UploadPhase::Single);
    }

    #[test]
    fn test_start_without_upload_id() {
        let request = UploadRequest::from_body(body(12 * 1024 * 1024)).unwrap();
        assert_eq!(
            request.phase(LIMIT).unwrap(),
            UploadPhase::MultipartStart { total_parts: 3 }
        );
    }

    #[test]
    fn test_start_ignores_complete_flag_without_upload_id() {
        let mut b = body(LIMIT + 1);
        b.complete = Some(true);
        b.parts = Some(vec![part(1)]);
        let request = UploadRequest::from_body(b).unwrap();
        assert_eq!(
            request.phase(LIMIT).unwrap(),
            UploadPhase::MultipartStart { total_parts: 2 }
        );
    }

    #[test]
    fn test_too_many_parts_rejected() {
        let request = UploadRequest::from_body(body(LIMIT * 10_001)).unwrap();
        assert!(matches!(
            request.phase(LIMIT),
            Err(AppError::Validation(msg)) if msg.contains("10000")
        ));
    }

    #[test]
    fn test_complete_keeps_parts_as_received() {
        let mut b = body(3 * LIMIT);
        b.upload_id = Some("up-1".to_string());
        b.complete = Some(true);
        b.parts = Some(vec![part(3), part(1), part(1), part(2)]);
        let request = UploadRequest::from_body(b).unwrap();

        match request.phase(LIMIT).unwrap() {
            UploadPhase::MultipartComplete { upload_id, parts } => {
                assert_eq!(upload_id, "up-1");
                assert_eq!(parts, &[part(3), part(1), part(1), part(2)]);
            }
            other => panic!("Expected MultipartComplete, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_id_without_completion_fields() {
        let cases = [
            (None, None),
            (Some(true), None),
            (None, Some(vec![part(1)])),
            (Some(false), Some(vec![part(1)])),
            (Some(true), Some(vec![])),
        ];

        for (complete, parts) in cases {
            let mut b = body(LIMIT * 2);
            b.upload_id = Some("up-1".to_string());
            b.complete = complete;
            b.parts = parts;
            let request = UploadRequest::from_body(b).unwrap();
            match request.phase(LIMIT) {
                Err(AppError::Validation(msg)) => assert_eq!(msg, MISSING_COMPLETION_FIELDS),
                other => panic!("Expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_upload_id_is_not_a_session() {
        let mut b = body(LIMIT * 2);
        b.upload_id = Some(String::new());
        b.complete = Some(true);
        b.parts = Some(vec![part(1)]);
        let request = UploadRequest::from_body(b).unwrap();
        assert!(matches!(
            request.phase(LIMIT),
            Err(AppError::Validation(msg)) if msg == MISSING_COMPLETION_FIELDS
        ));
    }

    #[test]
    fn test_invalid_part_rejected() {
        let mut b = body(LIMIT * 2);
        b.upload_id = Some("up-1".to_string());
        b.complete = Some(true);
        b.parts = Some(vec![part(1), part(0)]);
        let request = UploadRequest::from_body(b).unwrap();
        assert!(matches!(
            request.phase(LIMIT),
            Err(AppError::Validation(msg)) if msg.starts_with("parts[1]")
        ));
    }
}
