use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::ServiceError;
use crate::blob::{BlobStore, BlobUpload};
use crate::database::models::{Complaint, ComplaintPayload, NewComplaint};
use crate::database::{ComplaintRepository, DatabaseError, DirectoryRepository};
use crate::types::{ComplaintKind, ComplaintStatus, TenantContext};

/// `M/D/YYYY, h:mm:ss AM|PM`, always rendered at the configured fixed offset
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Answer to a stored voice complaint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceReceipt {
    pub id: i32,
    pub url: String,
}

pub fn format_timestamp(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string()
}

/// Complaint lifecycle: intake of both payload shapes, listing, deletion and
/// the open <-> resolved transitions. Every call is scoped by a `TenantContext`.
#[derive(Clone)]
pub struct ComplaintService {
    complaints: Arc<dyn ComplaintRepository>,
    directory: Arc<dyn DirectoryRepository>,
    blobs: Arc<dyn BlobStore>,
    offset: FixedOffset,
}

impl ComplaintService {
    pub fn new(
        complaints: Arc<dyn ComplaintRepository>,
        directory: Arc<dyn DirectoryRepository>,
        blobs: Arc<dyn BlobStore>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            complaints,
            directory,
            blobs,
            offset,
        }
    }

    fn now(&self) -> String {
        format_timestamp(Utc::now(), self.offset)
    }

    /// The only FK on an intake insert is the enterprise
    fn intake_error(err: DatabaseError) -> ServiceError {
        match err {
            DatabaseError::ForeignKeyViolation(_) => ServiceError::NotFound("Enterprise not found".to_string()),
            other => ServiceError::Database(other),
        }
    }

    pub async fn submit_text(&self, tenant: &TenantContext, text: &str) -> Result<i32, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::validation("complaint", "Complaint text cannot be empty."));
        }

        let new = NewComplaint {
            payload: ComplaintPayload::Text {
                complaint: text.to_string(),
            },
            timestamp: self.now(),
        };

        let id = self
            .complaints
            .insert(tenant, &new)
            .await
            .map_err(Self::intake_error)?;

        info!(complaint_id = id, enterprise_id = tenant.enterprise_id(), "Text complaint submitted");
        Ok(id)
    }

    /// Upload first, then insert. If the insert fails the upload is removed
    /// again; a failed removal is reported as an upstream failure.
    pub async fn submit_voice(&self, tenant: &TenantContext, upload: BlobUpload) -> Result<VoiceReceipt, ServiceError> {
        if upload.bytes.is_empty() {
            return Err(ServiceError::validation("complaint", "Voice recording cannot be empty."));
        }
        if let Some(content_type) = upload.content_type.as_deref() {
            content_type.parse::<mime::Mime>().map_err(|_| {
                ServiceError::validation("complaint", format!("Unsupported content type '{}'", content_type))
            })?;
        }

        if self.directory.find_enterprise(tenant.enterprise_id()).await?.is_none() {
            return Err(ServiceError::NotFound("Enterprise not found".to_string()));
        }

        let stored = self.blobs.upload(upload).await.map_err(|e| {
            error!(enterprise_id = tenant.enterprise_id(), "Voice upload failed: {}", e);
            ServiceError::Upstream("Failed to store voice recording".to_string())
        })?;

        let new = NewComplaint {
            payload: ComplaintPayload::Voice {
                filepath: stored.url.clone(),
                blob_ref: Some(stored.blob_ref.clone()),
            },
            timestamp: self.now(),
        };

        match self.complaints.insert(tenant, &new).await {
            Ok(id) => {
                info!(complaint_id = id, enterprise_id = tenant.enterprise_id(), "Voice complaint submitted");
                Ok(VoiceReceipt { id, url: stored.url })
            }
            Err(insert_err) => {
                warn!(blob_ref = %stored.blob_ref, "Insert failed after upload, removing blob: {}", insert_err);
                match self.blobs.delete(&stored.blob_ref).await {
                    Ok(()) => Err(Self::intake_error(insert_err)),
                    Err(cleanup_err) => {
                        error!(blob_ref = %stored.blob_ref, "Orphaned voice upload: {}", cleanup_err);
                        Err(ServiceError::Upstream(
                            "Voice complaint could not be saved and its upload could not be removed".to_string(),
                        ))
                    }
                }
            }
        }
    }

    pub async fn list(&self, tenant: &TenantContext) -> Result<Vec<Complaint>, ServiceError> {
        Ok(self.complaints.list(tenant).await?)
    }

    /// Voice blobs are deleted before the row. If that fails the row stays so
    /// the caller can retry.
    pub async fn delete(&self, tenant: &TenantContext, id: i32) -> Result<(), ServiceError> {
        let complaint = self
            .complaints
            .find(tenant, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Complaint not found".to_string()))?;

        match complaint.blob_ref() {
            Some(blob_ref) => {
                self.blobs.delete(blob_ref).await.map_err(|e| {
                    error!(complaint_id = id, blob_ref, "Blob delete failed, keeping complaint: {}", e);
                    ServiceError::Upstream("Failed to delete voice recording; complaint kept".to_string())
                })?;
            }
            None if complaint.kind() == ComplaintKind::Voice => {
                warn!(complaint_id = id, "Voice complaint has no blob reference, deleting row only");
            }
            None => {}
        }

        if !self.complaints.delete(tenant, id).await? {
            return Err(ServiceError::NotFound("Complaint not found".to_string()));
        }

        info!(complaint_id = id, enterprise_id = tenant.enterprise_id(), "Complaint deleted");
        Ok(())
    }

    /// Validates the requested state before anything is written
    pub async fn set_status(&self, tenant: &TenantContext, id: i32, status: &str) -> Result<ComplaintStatus, ServiceError> {
        let status = status
            .parse::<ComplaintStatus>()
            .map_err(|e| ServiceError::validation("status", format!("{}; expected 'open' or 'resolved'", e)))?;

        self.transition(tenant, id, status).await?;
        Ok(status)
    }

    pub async fn resolve(&self, tenant: &TenantContext, id: i32) -> Result<(), ServiceError> {
        self.transition(tenant, id, ComplaintStatus::Resolved).await
    }

    pub async fn reopen(&self, tenant: &TenantContext, id: i32) -> Result<(), ServiceError> {
        self.transition(tenant, id, ComplaintStatus::Open).await
    }

    // Last writer wins; no version check
    async fn transition(&self, tenant: &TenantContext, id: i32, status: ComplaintStatus) -> Result<(), ServiceError> {
        if !self.complaints.update_status(tenant, id, status).await? {
            return Err(ServiceError::NotFound("Complaint not found".to_string()));
        }

        info!(complaint_id = id, enterprise_id = tenant.enterprise_id(), %status, "Complaint status changed");
        Ok(())
    }
}
