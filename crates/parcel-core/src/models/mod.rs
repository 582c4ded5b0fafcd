pub mod upload;

pub use upload::{
    CompletedPart, CompletedUpload, MultipartCompleteResult, MultipartStartPlan,
    NegotiationOutcome, PartUrl, SingleUploadPlan, UploadRequestBody, UploadType,
};
