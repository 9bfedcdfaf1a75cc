// handlers/protected/auth.rs - GET /api/auth/whoami

use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/whoami - Identity carried by the caller's session
///
/// ```json
/// { "success": true, "data": { "id": 2, "username": "bob", "enterpriseId": 1, "role": "admin" } }
/// ```
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
