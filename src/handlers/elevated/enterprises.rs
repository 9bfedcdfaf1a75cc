// handlers/elevated/enterprises.rs - Enterprise management
//
// GET, POST /api/manage/enterprises
// DELETE    /api/manage/enterprises/:id
// GET       /api/manage/enterprises/:id/users

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::models::{Enterprise, User};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct CreateEnterpriseRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i32,
}

/// GET /api/manage/enterprises - Alphabetical by name
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Enterprise>> {
    Ok(ApiResponse::success(state.directory.list_enterprises().await?))
}

/// POST /api/manage/enterprises
///
/// ```json
/// { "name": "Acme" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateEnterpriseRequest>, JsonRejection>,
) -> ApiResult<Enterprise> {
    let Json(request) = payload?;
    let enterprise = state.directory.create_enterprise(&request.name).await?;
    Ok(ApiResponse::created(enterprise))
}

/// DELETE /api/manage/enterprises/:id - Removes its users and complaints too
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    state.directory.delete_enterprise(&caller, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}

/// GET /api/manage/enterprises/:id/users - Alphabetical by username, no hashes
pub async fn users(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Vec<User>> {
    let Path(id) = id?;
    Ok(ApiResponse::success(state.directory.list_users_of(id).await?))
}
