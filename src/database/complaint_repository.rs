use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{Complaint, ComplaintRow, NewComplaint};
use super::DatabaseError;
use crate::types::{ComplaintStatus, TenantContext};

/// Tenant-scoped access to complaints.
///
/// Every method that reads or writes a complaint takes the caller's
/// `TenantContext` and filters by it inside the query itself, so a forged id
/// from another enterprise simply matches no rows.
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Insert with status `open`; returns the generated id
    async fn insert(&self, tenant: &TenantContext, new: &NewComplaint) -> Result<i32, DatabaseError>;

    /// All complaints of the tenant, newest id first
    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Complaint>, DatabaseError>;

    async fn find(&self, tenant: &TenantContext, id: i32) -> Result<Option<Complaint>, DatabaseError>;

    /// Returns false when no row matched id and tenant
    async fn delete(&self, tenant: &TenantContext, id: i32) -> Result<bool, DatabaseError>;

    /// Returns false when no row matched id and tenant
    async fn update_status(
        &self,
        tenant: &TenantContext,
        id: i32,
        status: ComplaintStatus,
    ) -> Result<bool, DatabaseError>;
}

const COMPLAINT_COLUMNS: &str = "id, enterprise_id, complaint, type, status, timestamp, filepath, blob_ref";

pub struct PgComplaintRepository {
    pool: PgPool,
}

impl PgComplaintRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ComplaintRepository for PgComplaintRepository {
    async fn insert(&self, tenant: &TenantContext, new: &NewComplaint) -> Result<i32, DatabaseError> {
        let (complaint, filepath, blob_ref) = new.payload.columns();

        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO complaints (enterprise_id, complaint, type, status, timestamp, filepath, blob_ref)
            VALUES ($1, $2, $3, 'open', $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(tenant.enterprise_id())
        .bind(complaint)
        .bind(new.payload.kind().as_str())
        .bind(&new.timestamp)
        .bind(filepath)
        .bind(blob_ref)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list(&self, tenant: &TenantContext) -> Result<Vec<Complaint>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM complaints WHERE enterprise_id = $1 ORDER BY id DESC",
            COMPLAINT_COLUMNS
        );

        let rows: Vec<ComplaintRow> = sqlx::query_as(&sql)
            .bind(tenant.enterprise_id())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Complaint::try_from).collect()
    }

    async fn find(&self, tenant: &TenantContext, id: i32) -> Result<Option<Complaint>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM complaints WHERE id = $1 AND enterprise_id = $2",
            COMPLAINT_COLUMNS
        );

        let row: Option<ComplaintRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(tenant.enterprise_id())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Complaint::try_from).transpose()
    }

    async fn delete(&self, tenant: &TenantContext, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1 AND enterprise_id = $2")
            .bind(id)
            .bind(tenant.enterprise_id())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        tenant: &TenantContext,
        id: i32,
        status: ComplaintStatus,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE complaints SET status = $1 WHERE id = $2 AND enterprise_id = $3")
            .bind(status.as_str())
            .bind(id)
            .bind(tenant.enterprise_id())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

}
