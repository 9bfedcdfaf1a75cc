//! In-memory doubles for the repositories and blob store, and a `TestApp`
//! that drives the full router without a database or network.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceExt;

use crate::app::{router, AppState};
use crate::auth::PasswordService;
use crate::blob::{BlobError, BlobStore, BlobUpload, StoredBlob};
use crate::config::AppConfig;
use crate::database::models::{
    Complaint, ComplaintRow, Enterprise, NewComplaint, NewUser, User, UserCredentials, UserRow,
};
use crate::database::{ComplaintRepository, DatabaseError, DirectoryRepository};
use crate::types::{ComplaintStatus, Role, TenantContext};

#[derive(Default)]
struct Tables {
    last_id: i32,
    enterprises: BTreeMap<i32, Enterprise>,
    users: BTreeMap<i32, UserRow>,
    complaints: BTreeMap<i32, ComplaintRow>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_user(&mut self, user: &NewUser) -> Result<User, DatabaseError> {
        if self.users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation("users_username_key".to_string()));
        }
        if let Some(enterprise_id) = user.enterprise_id {
            if !self.enterprises.contains_key(&enterprise_id) {
                return Err(DatabaseError::ForeignKeyViolation("users_enterprise_id_fkey".to_string()));
            }
        }

        let id = self.next_id();
        let row = UserRow {
            id,
            enterprise_id: user.enterprise_id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_string(),
        };
        self.users.insert(id, row.clone());
        User::try_from(row)
    }
}

/// Both repositories over shared tables, with the same constraints the
/// Postgres schema enforces: unique usernames, enterprise FKs and cascades.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_complaint_inserts: AtomicBool,
}

impl MemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn seed_enterprise(&self, name: &str) -> Enterprise {
        let mut tables = self.tables();
        let enterprise = Enterprise {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.enterprises.insert(enterprise.id, enterprise.clone());
        enterprise
    }

    pub fn seed_user(&self, username: &str, password_hash: &str, enterprise_id: Option<i32>, role: Role) -> User {
        self.tables()
            .insert_user(&NewUser {
                enterprise_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                role,
            })
            .unwrap()
    }

    pub fn complaint_count(&self, enterprise_id: i32) -> usize {
        self.tables()
            .complaints
            .values()
            .filter(|c| c.enterprise_id == enterprise_id)
            .count()
    }

    /// Makes every complaint insert fail as if the database went away
    pub fn set_fail_complaint_inserts(&self, fail: bool) {
        self.fail_complaint_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ComplaintRepository for MemoryStore {
    async fn insert(&self, tenant: &TenantContext, new: &NewComplaint) -> Result<i32, DatabaseError> {
        if self.fail_complaint_inserts.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("insert disabled".to_string()));
        }

        let mut tables = self.tables();
        if !tables.enterprises.contains_key(&tenant.enterprise_id()) {
            return Err(DatabaseError::ForeignKeyViolation("complaints_enterprise_id_fkey".to_string()));
        }

        let (complaint, filepath, blob_ref) = new.payload.columns();
        let id = tables.next_id();
        let row = ComplaintRow {
            id,
            enterprise_id: tenant.enterprise_id(),
            complaint: complaint.map(str::to_string),
            kind: new.payload.kind().as_str().to_string(),
            status: ComplaintStatus::Open.as_str().to_string(),
            timestamp: new.timestamp.clone(),
            filepath: filepath.map(str::to_string),
            blob_ref: blob_ref.map(str::to_string),
        };
        tables.complaints.insert(id, row);
        Ok(id)
    }

    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Complaint>, DatabaseError> {
        self.tables()
            .complaints
            .values()
            .rev()
            .filter(|c| c.enterprise_id == tenant.enterprise_id())
            .cloned()
            .map(Complaint::try_from)
            .collect()
    }

    async fn find(&self, tenant: &TenantContext, id: i32) -> Result<Option<Complaint>, DatabaseError> {
        self.tables()
            .complaints
            .get(&id)
            .filter(|c| c.enterprise_id == tenant.enterprise_id())
            .cloned()
            .map(Complaint::try_from)
            .transpose()
    }

    async fn delete(&self, tenant: &TenantContext, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables();
        match tables.complaints.get(&id) {
            Some(c) if c.enterprise_id == tenant.enterprise_id() => {
                tables.complaints.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_status(
        &self,
        tenant: &TenantContext,
        id: i32,
        status: ComplaintStatus,
    ) -> Result<bool, DatabaseError> {
        match self.tables().complaints.get_mut(&id) {
            Some(c) if c.enterprise_id == tenant.enterprise_id() => {
                c.status = status.as_str().to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

}

#[async_trait]
impl DirectoryRepository for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_enterprises(&self) -> Result<Vec<Enterprise>, DatabaseError> {
        let mut enterprises: Vec<Enterprise> = self.tables().enterprises.values().cloned().collect();
        enterprises.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(enterprises)
    }

    async fn find_enterprise(&self, id: i32) -> Result<Option<Enterprise>, DatabaseError> {
        Ok(self.tables().enterprises.get(&id).cloned())
    }

    async fn insert_enterprise(&self, name: &str) -> Result<Enterprise, DatabaseError> {
        Ok(self.seed_enterprise(name))
    }

    async fn find_or_insert_enterprise(&self, name: &str) -> Result<Enterprise, DatabaseError> {
        let existing = self.tables().enterprises.values().find(|e| e.name == name).cloned();
        match existing {
            Some(enterprise) => Ok(enterprise),
            None => Ok(self.seed_enterprise(name)),
        }
    }

    async fn delete_enterprise(&self, id: i32) -> Result<Option<Vec<String>>, DatabaseError> {
        let mut tables = self.tables();
        if tables.enterprises.remove(&id).is_none() {
            return Ok(None);
        }
        let refs = tables
            .complaints
            .values()
            .filter(|c| c.enterprise_id == id)
            .filter_map(|c| c.blob_ref.clone())
            .collect();
        tables.users.retain(|_, u| u.enterprise_id != Some(id));
        tables.complaints.retain(|_, c| c.enterprise_id != id);
        Ok(Some(refs))
    }

    async fn list_users(&self, enterprise_id: i32) -> Result<Vec<User>, DatabaseError> {
        let mut rows: Vec<UserRow> = self
            .tables()
            .users
            .values()
            .filter(|u| u.enterprise_id == Some(enterprise_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.username.cmp(&b.username));
        rows.into_iter().map(User::try_from).collect()
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<UserCredentials>, DatabaseError> {
        self.tables()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .map(UserCredentials::try_from)
            .transpose()
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        self.tables().insert_user(user)
    }

    async fn insert_user_if_absent(&self, user: &NewUser) -> Result<Option<User>, DatabaseError> {
        match self.tables().insert_user(user) {
            Ok(user) => Ok(Some(user)),
            Err(DatabaseError::UniqueViolation(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete_user(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.tables().users.remove(&id).is_some())
    }
}

/// Blob store keeping uploads in a map, with switches to make either
/// direction fail.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    counter: AtomicU32,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, blob_ref: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(blob_ref)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobError::Rejected {
                status: 500,
                message: "upload disabled".to_string(),
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let blob_ref = format!("complaints/voice_{}", n);
        self.blobs.lock().unwrap().insert(blob_ref.clone(), upload.bytes);

        Ok(StoredBlob {
            url: format!("https://blobs.test/{}.webm", blob_ref),
            blob_ref,
        })
    }

    async fn delete(&self, blob_ref: &str) -> Result<(), BlobError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Rejected {
                status: 500,
                message: "delete disabled".to_string(),
            });
        }
        self.blobs.lock().unwrap().remove(blob_ref);
        Ok(())
    }
}

/// Full router over in-memory state
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub blobs: Arc<MemoryBlobStore>,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        let state = AppState::from_parts(AppConfig::for_tests(), store.clone(), store.clone(), blobs.clone()).unwrap();
        let router = router(state.clone());

        Self {
            store,
            blobs,
            state,
            router,
        }
    }

    pub fn seed_enterprise(&self, name: &str) -> Enterprise {
        self.store.seed_enterprise(name)
    }

    pub async fn seed_user(&self, username: &str, password: &str, enterprise_id: Option<i32>, role: Role) -> User {
        let hash = PasswordService::new(4).unwrap().hash(password).await.unwrap();
        self.store.seed_user(username, &hash, enterprise_id, role)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn login_status(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self.login_status(username, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["accessToken"].as_str().unwrap().to_string()
    }

    /// Multipart body with a single `complaint` file field
    pub async fn upload_voice(&self, enterprise_id: i32, bytes: &[u8]) -> (StatusCode, Value) {
        let boundary = "complaint-desk-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"complaint\"; filename=\"note.webm\"\r\nContent-Type: audio/webm\r\n\r\n",
                b = boundary
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/complaint-voice/{}", enterprise_id))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}
