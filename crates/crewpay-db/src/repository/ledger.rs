//! # Ledger Repositories
//!
//! Advances, independent deductions and leaves.
//!
//! ## Advance Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_advance() → Advance { status: Pending }                        │
//! │       │                                                                 │
//! │       ▼   next payroll generation for the employee                      │
//! │  installment feeds the advance-deduction suggestion                    │
//! │       │                                                                 │
//! │       ▼   payroll persisted                                             │
//! │  mark_applied() → Advance { status: Applied, applied_at }              │
//! │       (conditional write: an advance is consumed at most once)          │
//! │                                                                         │
//! │  Applied advances are kept forever for history.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crewpay_core::{Advance, Deduction, Leave};

// =============================================================================
// Advances
// =============================================================================

/// Repository for salary advances.
#[derive(Debug, Clone)]
pub struct AdvanceRepository {
    pool: SqlitePool,
}

impl AdvanceRepository {
    /// Creates a new AdvanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdvanceRepository { pool }
    }

    /// Inserts a new advance.
    pub async fn insert(&self, advance: &Advance) -> DbResult<()> {
        debug!(
            employee_id = %advance.employee_id,
            amount = advance.amount_cents,
            "Recording advance"
        );

        sqlx::query(
            r#"
            INSERT INTO advances (
                id, employee_id, amount_cents, installment_cents,
                reason, status, created_at, applied_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&advance.id)
        .bind(&advance.employee_id)
        .bind(advance.amount_cents)
        .bind(advance.installment_cents)
        .bind(&advance.reason)
        .bind(advance.status)
        .bind(advance.created_at)
        .bind(advance.applied_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an advance by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Advance>> {
        let advance: Option<Advance> = sqlx::query_as(
            r#"
            SELECT id, employee_id, amount_cents, installment_cents,
                   reason, status, created_at, applied_at
            FROM advances
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(advance)
    }

    /// Lists an employee's pending advances, oldest first.
    pub async fn list_pending_for_employee(&self, employee_id: &str) -> DbResult<Vec<Advance>> {
        let advances: Vec<Advance> = sqlx::query_as(
            r#"
            SELECT id, employee_id, amount_cents, installment_cents,
                   reason, status, created_at, applied_at
            FROM advances
            WHERE employee_id = ?1 AND status = 'pending'
            ORDER BY created_at
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(advances)
    }

    /// Lists all advances for an employee, newest first.
    pub async fn list_for_employee(&self, employee_id: &str) -> DbResult<Vec<Advance>> {
        let advances: Vec<Advance> = sqlx::query_as(
            r#"
            SELECT id, employee_id, amount_cents, installment_cents,
                   reason, status, created_at, applied_at
            FROM advances
            WHERE employee_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(advances)
    }

    /// Marks an advance as consumed by a payroll run.
    ///
    /// Conditional on the advance still being pending, so two concurrent
    /// payroll runs cannot both consume it.
    pub async fn mark_applied(&self, id: &str, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE advances SET
                status = 'applied',
                applied_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Advance (pending)", id));
        }

        Ok(())
    }
}

// =============================================================================
// Deductions
// =============================================================================

/// Repository for independent deduction ledger entries.
#[derive(Debug, Clone)]
pub struct DeductionRepository {
    pool: SqlitePool,
}

impl DeductionRepository {
    /// Creates a new DeductionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeductionRepository { pool }
    }

    /// Inserts a new deduction entry.
    pub async fn insert(&self, deduction: &Deduction) -> DbResult<()> {
        debug!(
            employee_id = %deduction.employee_id,
            amount = deduction.amount_cents,
            "Recording deduction"
        );

        sqlx::query(
            r#"
            INSERT INTO deductions (
                id, employee_id, kind, amount_cents, description, date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&deduction.id)
        .bind(&deduction.employee_id)
        .bind(deduction.kind)
        .bind(deduction.amount_cents)
        .bind(&deduction.description)
        .bind(deduction.date)
        .bind(deduction.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all deduction entries for an employee, newest first.
    pub async fn list_for_employee(&self, employee_id: &str) -> DbResult<Vec<Deduction>> {
        let deductions: Vec<Deduction> = sqlx::query_as(
            r#"
            SELECT id, employee_id, kind, amount_cents, description, date, created_at
            FROM deductions
            WHERE employee_id = ?1
            ORDER BY date DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(deductions)
    }
}

// =============================================================================
// Leaves
// =============================================================================

/// Repository for leave ranges.
#[derive(Debug, Clone)]
pub struct LeaveRepository {
    pool: SqlitePool,
}

impl LeaveRepository {
    /// Creates a new LeaveRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LeaveRepository { pool }
    }

    /// Inserts a new leave range.
    pub async fn insert(&self, leave: &Leave) -> DbResult<()> {
        debug!(
            employee_id = %leave.employee_id,
            start = %leave.start_date,
            end = %leave.end_date,
            "Recording leave"
        );

        sqlx::query(
            r#"
            INSERT INTO leaves (
                id, employee_id, start_date, end_date, reason, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&leave.id)
        .bind(&leave.employee_id)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(&leave.reason)
        .bind(leave.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all leave ranges for an employee.
    ///
    /// Deliberately broad: month overlap checks happen in the engine.
    pub async fn list_for_employee(&self, employee_id: &str) -> DbResult<Vec<Leave>> {
        let leaves: Vec<Leave> = sqlx::query_as(
            r#"
            SELECT id, employee_id, start_date, end_date, reason, created_at
            FROM leaves
            WHERE employee_id = ?1
            ORDER BY start_date DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(leaves)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{NaiveDate, NaiveTime};
    use crewpay_core::{
        AdvanceStatus, DeductionKind, Employee, EmployeeStatus, WorkDay, WorkSchedule,
    };
    use uuid::Uuid;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let emp = Employee {
            id: "emp-1".to_string(),
            code: "E-01".to_string(),
            name: "Sara".to_string(),
            schedule: WorkSchedule {
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                work_days: vec![WorkDay::Monday],
                grace_period_minutes: 15,
            },
            basic_salary_cents: 300_000,
            allowances_cents: 0,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        };
        db.employees().insert(&emp).await.unwrap();
        db
    }

    fn advance(id: &str) -> Advance {
        Advance {
            id: id.to_string(),
            employee_id: "emp-1".to_string(),
            amount_cents: 40_000,
            installment_cents: 10_000,
            reason: Some("rent".to_string()),
            status: AdvanceStatus::Pending,
            created_at: Utc::now(),
            applied_at: None,
        }
    }

    #[tokio::test]
    async fn test_advance_lifecycle() {
        let db = setup().await;
        let repo = db.advances();

        repo.insert(&advance("adv-1")).await.unwrap();
        assert_eq!(repo.list_pending_for_employee("emp-1").await.unwrap().len(), 1);

        repo.mark_applied("adv-1", Utc::now()).await.unwrap();
        assert!(repo.list_pending_for_employee("emp-1").await.unwrap().is_empty());

        // History is kept
        let loaded = repo.get_by_id("adv-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, AdvanceStatus::Applied);
        assert!(loaded.applied_at.is_some());

        // An advance is consumed at most once
        let err = repo.mark_applied("adv-1", Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deduction_round_trip() {
        let db = setup().await;
        let repo = db.deductions();

        let deduction = Deduction {
            id: Uuid::new_v4().to_string(),
            employee_id: "emp-1".to_string(),
            kind: DeductionKind::Penalty,
            amount_cents: 5_000,
            description: "broken mirror".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
            created_at: Utc::now(),
        };
        repo.insert(&deduction).await.unwrap();

        let loaded = repo.list_for_employee("emp-1").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].kind, DeductionKind::Penalty);
        assert_eq!(loaded[0].amount_cents, 5_000);
    }

    #[tokio::test]
    async fn test_leave_round_trip() {
        let db = setup().await;
        let repo = db.leaves();

        let leave = Leave {
            id: Uuid::new_v4().to_string(),
            employee_id: "emp-1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 12).unwrap(),
            reason: Some("sick".to_string()),
            created_at: Utc::now(),
        };
        repo.insert(&leave).await.unwrap();

        let loaded = repo.list_for_employee("emp-1").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].covers(NaiveDate::from_ymd_opt(2026, 8, 11).unwrap()));
    }
}
