pub mod auth;
pub mod response;

pub use auth::{require_session, require_superadmin, AuthUser};
pub use response::{ApiResponse, ApiResult};
