//! # Employee Repository
//!
//! Database operations for employees.
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  deactivate() flips status to 'inactive'; nothing is ever removed.     │
//! │                                                                         │
//! │  Inactive employees:                                                   │
//! │    • keep their attendance, payroll and ledger history                 │
//! │    • cannot check in                                                   │
//! │    • are skipped by payroll batch runs                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crewpay_core::{Employee, EmployeeStatus, WorkDay, WorkSchedule};

/// Flat row shape for the employees table. The nested `WorkSchedule` is
/// reassembled in `TryFrom`.
#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    code: String,
    name: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    work_days: String,
    grace_period_minutes: i64,
    basic_salary_cents: i64,
    allowances_cents: i64,
    status: EmployeeStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = DbError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let work_days: Vec<WorkDay> = serde_json::from_str(&row.work_days)
            .map_err(|e| DbError::corrupt("Employee", format!("work_days: {e}")))?;

        Ok(Employee {
            id: row.id,
            code: row.code,
            name: row.name,
            schedule: WorkSchedule {
                start_time: row.start_time,
                end_time: row.end_time,
                work_days,
                grace_period_minutes: row.grace_period_minutes,
            },
            basic_salary_cents: row.basic_salary_cents,
            allowances_cents: row.allowances_cents,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, code, name,
        start_time, end_time, work_days, grace_period_minutes,
        basic_salary_cents, allowances_cents,
        status, created_at, updated_at
    FROM employees
"#;

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Inserts a new employee.
    ///
    /// A duplicate `code` trips the UNIQUE constraint and surfaces as
    /// `DbError::UniqueViolation`.
    pub async fn insert(&self, employee: &Employee) -> DbResult<()> {
        debug!(id = %employee.id, code = %employee.code, "Inserting employee");

        let work_days = serde_json::to_string(&employee.schedule.work_days)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, code, name,
                start_time, end_time, work_days, grace_period_minutes,
                basic_salary_cents, allowances_cents,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.code)
        .bind(&employee.name)
        .bind(employee.schedule.start_time)
        .bind(employee.schedule.end_time)
        .bind(work_days)
        .bind(employee.schedule.grace_period_minutes)
        .bind(employee.basic_salary_cents)
        .bind(employee.allowances_cents)
        .bind(employee.status)
        .bind(employee.created_at)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an employee by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Employee>> {
        let row: Option<EmployeeRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Employee::try_from).transpose()
    }

    /// Gets an employee by business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Employee>> {
        let row: Option<EmployeeRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE code = ?1"))
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Employee::try_from).transpose()
    }

    /// Lists all employees, active and inactive, ordered by code.
    pub async fn list_all(&self) -> DbResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY code"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    /// Lists active employees ordered by code.
    pub async fn list_active(&self) -> DbResult<Vec<Employee>> {
        let rows: Vec<EmployeeRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE status = 'active' ORDER BY code"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Employee::try_from).collect()
    }

    /// Updates an employee's mutable fields (name, schedule, salary).
    pub async fn update(&self, employee: &Employee) -> DbResult<()> {
        debug!(id = %employee.id, "Updating employee");

        let work_days = serde_json::to_string(&employee.schedule.work_days)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE employees SET
                name = ?2,
                start_time = ?3,
                end_time = ?4,
                work_days = ?5,
                grace_period_minutes = ?6,
                basic_salary_cents = ?7,
                allowances_cents = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.name)
        .bind(employee.schedule.start_time)
        .bind(employee.schedule.end_time)
        .bind(work_days)
        .bind(employee.schedule.grace_period_minutes)
        .bind(employee.basic_salary_cents)
        .bind(employee.allowances_cents)
        .bind(employee.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", &employee.id));
        }

        Ok(())
    }

    /// Soft-deletes an employee (status → inactive). Conditional on the
    /// employee still being active.
    pub async fn deactivate(&self, id: &str, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET
                status = 'inactive',
                updated_at = ?2
            WHERE id = ?1 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee (active)", id));
        }

        Ok(())
    }

    /// Reactivates a previously deactivated employee.
    pub async fn reactivate(&self, id: &str, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE employees SET
                status = 'active',
                updated_at = ?2
            WHERE id = ?1 AND status = 'inactive'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee (inactive)", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveTime;

    fn employee(id: &str, code: &str) -> Employee {
        let now = Utc::now();
        Employee {
            id: id.to_string(),
            code: code.to_string(),
            name: "Sara".to_string(),
            schedule: WorkSchedule {
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                work_days: vec![WorkDay::Monday, WorkDay::Tuesday, WorkDay::Wednesday],
                grace_period_minutes: 15,
            },
            basic_salary_cents: 300_000,
            allowances_cents: 20_000,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_round_trip_schedule() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.employees();

        let emp = employee("emp-1", "E-01");
        repo.insert(&emp).await.unwrap();

        let loaded = repo.get_by_id("emp-1").await.unwrap().unwrap();
        assert_eq!(loaded.code, "E-01");
        assert_eq!(loaded.schedule.start_time, emp.schedule.start_time);
        assert_eq!(loaded.schedule.work_days, emp.schedule.work_days);
        assert_eq!(loaded.status, EmployeeStatus::Active);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.employees();

        repo.insert(&employee("emp-1", "E-01")).await.unwrap();
        let err = repo.insert(&employee("emp-2", "E-01")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_is_soft() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.employees();

        repo.insert(&employee("emp-1", "E-01")).await.unwrap();
        repo.deactivate("emp-1", Utc::now()).await.unwrap();

        // Still loadable, just inactive
        let loaded = repo.get_by_id("emp-1").await.unwrap().unwrap();
        assert_eq!(loaded.status, EmployeeStatus::Inactive);
        assert!(repo.list_active().await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);

        // Second deactivate matches no active row
        let err = repo.deactivate("emp-1", Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
