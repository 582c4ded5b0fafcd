use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use parcel_core::models::UploadRequestBody;
use parcel_core::AppError;
use std::sync::Arc;

/// Negotiate a direct-to-storage upload
///
/// The body is read raw so that a body which is not JSON at all and a JSON
/// body with wrongly typed fields produce different 400 messages. Body read
/// failures (over-limit bodies included) still render as JSON.
#[tracing::instrument(skip(state, body), fields(body_bytes = tracing::field::Empty))]
pub async fn negotiate_upload(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let body = body?;
    tracing::Span::current().record("body_bytes", body.len());
    let request = parse_body(&body)?;
    let outcome = state.negotiator.negotiate(request).await?;

    tracing::debug!(upload_type = ?outcome.upload_type(), "Upload negotiated");

    Ok((StatusCode::OK, Json(outcome)))
}

fn parse_body(raw: &[u8]) -> Result<UploadRequestBody, AppError> {
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}
