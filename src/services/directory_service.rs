use std::sync::Arc;
use tracing::{info, warn};

use super::ServiceError;
use crate::auth::PasswordService;
use crate::blob::BlobStore;
use crate::database::models::{Enterprise, NewUser, User};
use crate::database::{DatabaseError, DirectoryRepository};
use crate::middleware::AuthUser;
use crate::types::Role;

/// Enterprise the bootstrap superadmin belongs to
pub const SUPERADMIN_ENTERPRISE_NAME: &str = "SaaS Platform Admin";

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub enterprise_id: i32,
    pub role: Role,
}

/// Cross-tenant management of enterprises and their users
#[derive(Clone)]
pub struct DirectoryService {
    directory: Arc<dyn DirectoryRepository>,
    blobs: Arc<dyn BlobStore>,
    passwords: PasswordService,
}

impl DirectoryService {
    pub fn new(
        directory: Arc<dyn DirectoryRepository>,
        blobs: Arc<dyn BlobStore>,
        passwords: PasswordService,
    ) -> Self {
        Self {
            directory,
            blobs,
            passwords,
        }
    }

    pub async fn list_enterprises(&self) -> Result<Vec<Enterprise>, ServiceError> {
        Ok(self.directory.list_enterprises().await?)
    }

    pub async fn list_users_of(&self, enterprise_id: i32) -> Result<Vec<User>, ServiceError> {
        if self.directory.find_enterprise(enterprise_id).await?.is_none() {
            return Err(ServiceError::NotFound("Enterprise not found".to_string()));
        }
        Ok(self.directory.list_users(enterprise_id).await?)
    }

    pub async fn create_enterprise(&self, name: &str) -> Result<Enterprise, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("name", "Enterprise name is required"));
        }

        let enterprise = self.directory.insert_enterprise(name).await?;
        info!(enterprise_id = enterprise.id, name = %enterprise.name, "Enterprise created");
        Ok(enterprise)
    }

    pub async fn create_user(&self, request: CreateUser) -> Result<User, ServiceError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(ServiceError::validation("username", "Username is required"));
        }
        if request.password.is_empty() {
            return Err(ServiceError::validation("password", "Password is required"));
        }

        let new = NewUser {
            enterprise_id: Some(request.enterprise_id),
            username: username.to_string(),
            password_hash: self.passwords.hash(&request.password).await?,
            role: request.role,
        };

        let user = self.directory.insert_user(&new).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => ServiceError::Conflict(format!("Username '{}' already exists", new.username)),
            DatabaseError::ForeignKeyViolation(_) => ServiceError::NotFound("Enterprise not found".to_string()),
            other => ServiceError::Database(other),
        })?;

        info!(user_id = user.id, enterprise_id = request.enterprise_id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn delete_user(&self, caller: &AuthUser, id: i32) -> Result<(), ServiceError> {
        if caller.id == id {
            return Err(ServiceError::SelfDeletionForbidden(
                "You cannot delete your own account".to_string(),
            ));
        }

        if !self.directory.delete_user(id).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!(user_id = id, deleted_by = caller.id, "User deleted");
        Ok(())
    }

    /// Users and complaints go with the enterprise through the schema's
    /// cascades. Voice blobs of the removed complaints are deleted afterwards
    /// on a best-effort basis.
    pub async fn delete_enterprise(&self, caller: &AuthUser, id: i32) -> Result<(), ServiceError> {
        if caller.enterprise_id == Some(id) {
            return Err(ServiceError::SelfDeletionForbidden(
                "You cannot delete your own enterprise".to_string(),
            ));
        }

        let blob_refs = self
            .directory
            .delete_enterprise(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Enterprise not found".to_string()))?;

        for blob_ref in &blob_refs {
            if let Err(e) = self.blobs.delete(blob_ref).await {
                warn!(enterprise_id = id, blob_ref = %blob_ref, "Orphaned voice recording after enterprise delete: {}", e);
            }
        }

        info!(enterprise_id = id, deleted_by = caller.id, recordings = blob_refs.len(), "Enterprise deleted");
        Ok(())
    }

    /// Creates the platform enterprise and superadmin account unless the
    /// username is already taken. Returns the new user when one was created.
    pub async fn ensure_superadmin(&self, username: &str, password: &str) -> Result<Option<User>, ServiceError> {
        let enterprise = self
            .directory
            .find_or_insert_enterprise(SUPERADMIN_ENTERPRISE_NAME)
            .await?;

        let new = NewUser {
            enterprise_id: Some(enterprise.id),
            username: username.to_string(),
            password_hash: self.passwords.hash(password).await?,
            role: Role::SuperAdmin,
        };

        let created = self.directory.insert_user_if_absent(&new).await?;
        match &created {
            Some(user) => info!(user_id = user.id, username, "Superadmin account created"),
            None => info!(username, "Superadmin account already present"),
        }
        Ok(created)
    }
}
