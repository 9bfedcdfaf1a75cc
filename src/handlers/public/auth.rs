// handlers/public/auth.rs - POST /api/auth/login

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login - Exchange credentials for a session token
///
/// Expected Input:
/// ```json
/// { "username": "bob", "password": "pw1" }
/// ```
///
/// Expected Output:
/// ```json
/// { "success": true, "data": { "accessToken": "eyJ...", "expiresIn": 86400 } }
/// ```
///
/// Unknown username and wrong password both answer 400 with the same body.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;

    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::validation_error("Username and password are required"));
    }

    let response = state.auth.login(request.username.trim(), &request.password).await?;
    Ok(ApiResponse::success(response))
}
