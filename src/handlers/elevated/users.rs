// handlers/elevated/users.rs - User management
//
// POST   /api/manage/users
// DELETE /api/manage/users/:id

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::CreateUser;
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "enterpriseId", alias = "enterprise_id")]
    pub enterprise_id: Option<i32>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i32,
}

/// POST /api/manage/users - Create a user inside an enterprise
///
/// ```json
/// { "username": "alice", "password": "secret", "enterpriseId": 3, "role": "admin" }
/// ```
///
/// `role` defaults to `admin`. A taken username is 409.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<User> {
    let Json(request) = payload?;

    let enterprise_id = request
        .enterprise_id
        .ok_or_else(|| ApiError::field_error("enterpriseId", "Enterprise id is required"))?;

    let role = match request.role.as_deref() {
        None => Role::default(),
        Some(raw) => raw
            .parse::<Role>()
            .map_err(|e| ApiError::field_error("role", e.to_string()))?,
    };

    let user = state
        .directory
        .create_user(CreateUser {
            username: request.username,
            password: request.password,
            enterprise_id,
            role,
        })
        .await?;

    Ok(ApiResponse::created(user))
}

/// DELETE /api/manage/users/:id - Callers cannot delete their own account
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Deleted> {
    let Path(id) = id?;
    state.directory.delete_user(&caller, id).await?;
    Ok(ApiResponse::success(Deleted { id }))
}
