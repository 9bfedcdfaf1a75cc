use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use chrono::FixedOffset;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{CredentialVerifier, PasswordService, SessionIssuer};
use crate::blob::{BlobStore, CloudinaryStore};
use crate::config::AppConfig;
use crate::database::{
    ComplaintRepository, DatabaseManager, DirectoryRepository, PgComplaintRepository, PgDirectoryRepository,
};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_session, require_superadmin};
use crate::services::{AuthService, ComplaintService, DirectoryService};

/// Everything a handler can reach. Built once at startup, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionIssuer,
    pub auth: AuthService,
    pub complaints: ComplaintService,
    pub directory: DirectoryService,
    storage: Arc<dyn DirectoryRepository>,
}

impl AppState {
    /// Wire services over the Postgres repositories and the Cloudinary store
    pub fn build(config: AppConfig, database: &DatabaseManager) -> anyhow::Result<Self> {
        let blobs = CloudinaryStore::new(config.blob.clone());
        if !blobs.is_configured() {
            tracing::warn!("Cloudinary credentials missing; voice complaints will fail with 502");
        }

        Self::from_parts(
            config,
            Arc::new(PgDirectoryRepository::new(database.pool().clone())),
            Arc::new(PgComplaintRepository::new(database.pool().clone())),
            Arc::new(blobs),
        )
    }

    pub fn from_parts(
        config: AppConfig,
        directory: Arc<dyn DirectoryRepository>,
        complaints: Arc<dyn ComplaintRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> anyhow::Result<Self> {
        let passwords = PasswordService::new(config.security.bcrypt_cost).context("failed to prepare password hashing")?;
        let sessions = SessionIssuer::new(&config.security.jwt_secret);
        let offset = FixedOffset::east_opt(config.intake.utc_offset_minutes * 60)
            .context("intake UTC offset out of range")?;

        Ok(Self {
            auth: AuthService::new(CredentialVerifier::new(directory.clone(), passwords.clone()), sessions.clone()),
            complaints: ComplaintService::new(complaints, directory.clone(), blobs.clone(), offset),
            directory: DirectoryService::new(directory.clone(), blobs, passwords),
            sessions,
            storage: directory,
            config: Arc::new(config),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes(&state))
        .merge(elevated_routes(&state))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/complaint-text/:enterprise_id", post(public::intake::complaint_text))
        .route("/api/complaint-voice/:enterprise_id", post(public::intake::complaint_voice))
        .route("/api/auth/login", post(public::auth::login))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/complaints", get(protected::complaints::list))
        .route("/api/complaints/:id", delete(protected::complaints::remove))
        .route("/api/complaints/:id/status", put(protected::complaints::update_status))
        .route_layer(from_fn_with_state(state.sessions.clone(), require_session))
}

fn elevated_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/manage/enterprises",
            get(elevated::enterprises::list).post(elevated::enterprises::create),
        )
        .route("/api/manage/enterprises/:id", delete(elevated::enterprises::remove))
        .route("/api/manage/enterprises/:id/users", get(elevated::enterprises::users))
        .route("/api/manage/users", post(elevated::users::create))
        .route("/api/manage/users/:id", delete(elevated::users::remove))
        // Last added runs first: session, then role
        .route_layer(from_fn(require_superadmin))
        .route_layer(from_fn_with_state(state.sessions.clone(), require_session))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Complaint Desk",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "intake": "/api/complaint-text/:enterpriseId, /api/complaint-voice/:enterpriseId (public)",
                "auth": "/api/auth/login (public), /api/auth/whoami (session)",
                "complaints": "/api/complaints[/:id[/status]] (session)",
                "manage": "/api/manage/* (superadmin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.storage.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
