// handlers/protected/complaints.rs - Complaints of the caller's enterprise
//
// GET    /api/complaints
// DELETE /api/complaints/:id
// PUT    /api/complaints/:id/status

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::session_tenant;
use crate::database::models::Complaint;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::ComplaintStatus;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusChanged {
    pub id: i32,
    pub status: ComplaintStatus,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i32,
}

/// GET /api/complaints - Newest first
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Complaint>> {
    let tenant = session_tenant(&user)?;
    let complaints = state.complaints.list(&tenant).await?;
    Ok(ApiResponse::success(complaints))
}

/// DELETE /api/complaints/:id
///
/// A complaint of another enterprise is reported as not found. For voice
/// complaints the recording is removed first; if that fails the complaint is
/// kept and the answer is 502.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    let tenant = session_tenant(&user)?;

    state.complaints.delete(&tenant, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}

/// PUT /api/complaints/:id/status
///
/// ```json
/// { "status": "resolved" }
/// ```
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<StatusChanged> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let tenant = session_tenant(&user)?;

    let requested = request
        .status
        .ok_or_else(|| ApiError::field_error("status", "Status is required"))?;

    let status = state.complaints.set_status(&tenant, id, &requested).await?;
    Ok(ApiResponse::success(StatusChanged { id, status }))
}
