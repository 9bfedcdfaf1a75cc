// handlers/public/intake.rs - Anonymous complaint submission
//
// POST /api/complaint-text/:enterprise_id
// POST /api/complaint-voice/:enterprise_id

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::blob::BlobUpload;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::VoiceReceipt;
use crate::types::TenantContext;

/// Multipart field carrying the recording
const VOICE_FIELD: &str = "complaint";

#[derive(Debug, Deserialize)]
pub struct TextComplaintRequest {
    pub complaint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: i32,
}

/// POST /api/complaint-text/:enterprise_id - Submit a text complaint
///
/// ```json
/// { "complaint": "The elevator has been broken for a week" }
/// ```
///
/// Answers 201 with the new id. Blank text is 400, an unknown enterprise 404.
pub async fn complaint_text(
    State(state): State<AppState>,
    enterprise_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<TextComplaintRequest>, JsonRejection>,
) -> ApiResult<Created> {
    let Path(enterprise_id) = enterprise_id?;
    let Json(request) = payload?;

    let text = request
        .complaint
        .ok_or_else(|| ApiError::field_error("complaint", "Complaint text is required."))?;

    let tenant = TenantContext::from_path(enterprise_id);
    let id = state.complaints.submit_text(&tenant, &text).await?;
    Ok(ApiResponse::created(Created { id }))
}

/// POST /api/complaint-voice/:enterprise_id - Submit a recorded complaint
///
/// Multipart body with the audio in a `complaint` file field. Answers 201
/// with `{ id, url }`; a storage failure is 502 and nothing is recorded.
pub async fn complaint_voice(
    State(state): State<AppState>,
    enterprise_id: Result<Path<i32>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<VoiceReceipt> {
    let Path(enterprise_id) = enterprise_id?;
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VOICE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some(BlobUpload {
            bytes: bytes.to_vec(),
            filename,
            content_type,
        });
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::field_error(VOICE_FIELD, "No audio file uploaded."))?;

    let tenant = TenantContext::from_path(enterprise_id);
    let receipt = state.complaints.submit_voice(&tenant, upload).await?;
    Ok(ApiResponse::created(receipt))
}
