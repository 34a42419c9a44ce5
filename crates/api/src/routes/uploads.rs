//! Upload endpoint consumed by the dashboard UI.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::AppState;

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/uploads", post(upload))
}

/// Response for a successful upload.
///
/// The caller persists `key` (the canonical reference) and may use `url`
/// immediately for display without a resolution round-trip.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Permanent public URL for immediate display.
    pub url: String,
    /// Object key to store on the parent entity.
    pub key: String,
}

/// POST `/uploads`
///
/// Accepts multipart form data with a `file` field and runs it through the
/// pipeline: normalize, name, store. Any pipeline failure surfaces as one
/// generic error; the caller may re-submit.
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    let mut file: Option<(Vec<u8>, String, String)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "malformed multipart body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_multipart",
                        "message": "Malformed multipart body"
                    })),
                )
                    .into_response();
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("file").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        match field.bytes().await {
            Ok(bytes) => {
                file = Some((bytes.to_vec(), file_name, content_type));
                break;
            }
            Err(e) => {
                error!(error = %e, "failed to read upload body");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_multipart",
                        "message": "Could not read file data"
                    })),
                )
                    .into_response();
            }
        }
    }

    let Some((bytes, file_name, content_type)) = file else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_file",
                "message": "No file was sent"
            })),
        )
            .into_response();
    };

    match state.media.upload(bytes, &file_name, &content_type).await {
        Ok(uploaded) => {
            info!(
                key = %uploaded.key,
                content_type = %uploaded.content_type,
                "upload accepted"
            );
            (
                StatusCode::OK,
                Json(UploadResponse {
                    url: uploaded.url,
                    key: uploaded.key,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "upload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "upload_failed",
                    "message": "Upload failed"
                })),
            )
                .into_response()
        }
    }
}
