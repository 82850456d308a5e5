//! # Audit Log Repository
//!
//! Append-only log of successful mutations. There is no update or delete
//! path here on purpose.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crewpay_core::AuditEntry;

/// Repository for the append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends one entry.
    ///
    /// Callers treat a failure here as non-fatal: the mutation being
    /// audited has already committed and must not be rolled back over a
    /// logging problem.
    pub async fn append(&self, entry: &AuditEntry) -> DbResult<()> {
        debug!(category = %entry.category, action = %entry.action, "Appending audit entry");

        sqlx::query(
            r#"
            INSERT INTO audit_log (
                id, category, action, description, target, performed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.category)
        .bind(&entry.action)
        .bind(&entry.description)
        .bind(&entry.target)
        .bind(&entry.performed_by)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the most recent entries, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<AuditEntry>> {
        let entries: Vec<AuditEntry> = sqlx::query_as(
            r#"
            SELECT id, category, action, description, target, performed_by, created_at
            FROM audit_log
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
