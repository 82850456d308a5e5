//! # Payroll Repository
//!
//! Persistence for payroll settlements.
//!
//! ## Payroll Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. GENERATE                                                            │
//! │     └── insert() → Payroll { status: Pending }                         │
//! │         (UNIQUE(employee_id, month, year): one settlement per period)  │
//! │                                                                         │
//! │  2. EDIT (repeatable)                                                  │
//! │     └── update_editable() → conditional on status = 'pending'          │
//! │                                                                         │
//! │  3. MARK PAID                                                          │
//! │     └── mark_paid() → Payroll { status: Paid, paid_at }                │
//! │         (conditional write; a paid payroll is frozen forever)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crewpay_core::{
    AttendanceSummary, Deductions, Earnings, Payroll, PayrollStatus, PayrollSuggestions,
};

/// Flat row shape for the payrolls table. The nested summary, suggestions,
/// earnings and deductions blocks are reassembled in `From`.
#[derive(Debug, sqlx::FromRow)]
struct PayrollRow {
    id: String,
    employee_id: String,
    month: u32,
    year: i32,

    total_work_days: i64,
    present_days: i64,
    absent_days: i64,
    leave_days: i64,
    late_days: i64,
    total_late_minutes: i64,
    total_overtime_minutes: i64,
    total_work_hours: f64,

    suggested_absent_deduction_cents: i64,
    suggested_late_deduction_cents: i64,
    suggested_advance_deduction_cents: i64,

    basic_salary_cents: i64,
    allowances_cents: i64,
    bonuses_cents: i64,
    overtime_pay_cents: i64,
    earnings_total_cents: i64,

    absent_deduction_cents: i64,
    late_deduction_cents: i64,
    advance_deduction_cents: i64,
    other_deductions_cents: i64,
    deductions_total_cents: i64,

    net_salary_cents: i64,
    status: PayrollStatus,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl From<PayrollRow> for Payroll {
    fn from(row: PayrollRow) -> Self {
        Payroll {
            id: row.id,
            employee_id: row.employee_id,
            month: row.month,
            year: row.year,
            summary: AttendanceSummary {
                total_work_days: row.total_work_days,
                present_days: row.present_days,
                absent_days: row.absent_days,
                leave_days: row.leave_days,
                late_days: row.late_days,
                total_late_minutes: row.total_late_minutes,
                total_overtime_minutes: row.total_overtime_minutes,
                total_work_hours: row.total_work_hours,
            },
            suggestions: PayrollSuggestions {
                absent_deduction_cents: row.suggested_absent_deduction_cents,
                late_deduction_cents: row.suggested_late_deduction_cents,
                advance_deduction_cents: row.suggested_advance_deduction_cents,
            },
            earnings: Earnings {
                basic_salary_cents: row.basic_salary_cents,
                allowances_cents: row.allowances_cents,
                bonuses_cents: row.bonuses_cents,
                overtime_pay_cents: row.overtime_pay_cents,
                total_cents: row.earnings_total_cents,
            },
            deductions: Deductions {
                absent_deduction_cents: row.absent_deduction_cents,
                late_deduction_cents: row.late_deduction_cents,
                advance_deduction_cents: row.advance_deduction_cents,
                other_deductions_cents: row.other_deductions_cents,
                total_cents: row.deductions_total_cents,
            },
            net_salary_cents: row.net_salary_cents,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            paid_at: row.paid_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, employee_id, month, year,
        total_work_days, present_days, absent_days, leave_days, late_days,
        total_late_minutes, total_overtime_minutes, total_work_hours,
        suggested_absent_deduction_cents, suggested_late_deduction_cents,
        suggested_advance_deduction_cents,
        basic_salary_cents, allowances_cents, bonuses_cents, overtime_pay_cents,
        earnings_total_cents,
        absent_deduction_cents, late_deduction_cents, advance_deduction_cents,
        other_deductions_cents, deductions_total_cents,
        net_salary_cents, status,
        created_at, updated_at, paid_at
    FROM payrolls
"#;

/// Repository for payroll database operations.
#[derive(Debug, Clone)]
pub struct PayrollRepository {
    pool: SqlitePool,
}

impl PayrollRepository {
    /// Creates a new PayrollRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PayrollRepository { pool }
    }

    /// Inserts a freshly generated payroll.
    ///
    /// A duplicate period for the same employee loses at
    /// UNIQUE(employee_id, month, year).
    pub async fn insert(&self, payroll: &Payroll) -> DbResult<()> {
        debug!(
            employee_id = %payroll.employee_id,
            month = payroll.month,
            year = payroll.year,
            "Inserting payroll"
        );

        sqlx::query(
            r#"
            INSERT INTO payrolls (
                id, employee_id, month, year,
                total_work_days, present_days, absent_days, leave_days, late_days,
                total_late_minutes, total_overtime_minutes, total_work_hours,
                suggested_absent_deduction_cents, suggested_late_deduction_cents,
                suggested_advance_deduction_cents,
                basic_salary_cents, allowances_cents, bonuses_cents, overtime_pay_cents,
                earnings_total_cents,
                absent_deduction_cents, late_deduction_cents, advance_deduction_cents,
                other_deductions_cents, deductions_total_cents,
                net_salary_cents, status,
                created_at, updated_at, paid_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14,
                ?15,
                ?16, ?17, ?18, ?19,
                ?20,
                ?21, ?22, ?23,
                ?24, ?25,
                ?26, ?27,
                ?28, ?29, ?30
            )
            "#,
        )
        .bind(&payroll.id)
        .bind(&payroll.employee_id)
        .bind(payroll.month)
        .bind(payroll.year)
        .bind(payroll.summary.total_work_days)
        .bind(payroll.summary.present_days)
        .bind(payroll.summary.absent_days)
        .bind(payroll.summary.leave_days)
        .bind(payroll.summary.late_days)
        .bind(payroll.summary.total_late_minutes)
        .bind(payroll.summary.total_overtime_minutes)
        .bind(payroll.summary.total_work_hours)
        .bind(payroll.suggestions.absent_deduction_cents)
        .bind(payroll.suggestions.late_deduction_cents)
        .bind(payroll.suggestions.advance_deduction_cents)
        .bind(payroll.earnings.basic_salary_cents)
        .bind(payroll.earnings.allowances_cents)
        .bind(payroll.earnings.bonuses_cents)
        .bind(payroll.earnings.overtime_pay_cents)
        .bind(payroll.earnings.total_cents)
        .bind(payroll.deductions.absent_deduction_cents)
        .bind(payroll.deductions.late_deduction_cents)
        .bind(payroll.deductions.advance_deduction_cents)
        .bind(payroll.deductions.other_deductions_cents)
        .bind(payroll.deductions.total_cents)
        .bind(payroll.net_salary_cents)
        .bind(payroll.status)
        .bind(payroll.created_at)
        .bind(payroll.updated_at)
        .bind(payroll.paid_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a payroll by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payroll>> {
        let row: Option<PayrollRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Payroll::from))
    }

    /// Gets one employee's payroll for a period, if any.
    pub async fn get_for_period(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> DbResult<Option<Payroll>> {
        let row: Option<PayrollRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE employee_id = ?1 AND month = ?2 AND year = ?3"
        ))
        .bind(employee_id)
        .bind(month)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Payroll::from))
    }

    /// Lists all payrolls for a period across employees.
    pub async fn list_for_period(&self, month: u32, year: i32) -> DbResult<Vec<Payroll>> {
        let rows: Vec<PayrollRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE month = ?1 AND year = ?2 ORDER BY employee_id"
        ))
        .bind(month)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Payroll::from).collect())
    }

    /// Lists all payrolls for one employee, newest period first.
    pub async fn list_for_employee(&self, employee_id: &str) -> DbResult<Vec<Payroll>> {
        let rows: Vec<PayrollRow> = sqlx::query_as(&format!(
            "{SELECT_COLUMNS} WHERE employee_id = ?1 ORDER BY year DESC, month DESC"
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Payroll::from).collect())
    }

    /// Writes an edited payroll's editable fields and recomputed totals.
    ///
    /// Conditional on the payroll still being pending: a paid payroll is
    /// frozen and the write affects zero rows.
    pub async fn update_editable(&self, payroll: &Payroll) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payrolls SET
                bonuses_cents = ?2,
                overtime_pay_cents = ?3,
                earnings_total_cents = ?4,
                absent_deduction_cents = ?5,
                late_deduction_cents = ?6,
                advance_deduction_cents = ?7,
                other_deductions_cents = ?8,
                deductions_total_cents = ?9,
                net_salary_cents = ?10,
                updated_at = ?11
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(&payroll.id)
        .bind(payroll.earnings.bonuses_cents)
        .bind(payroll.earnings.overtime_pay_cents)
        .bind(payroll.earnings.total_cents)
        .bind(payroll.deductions.absent_deduction_cents)
        .bind(payroll.deductions.late_deduction_cents)
        .bind(payroll.deductions.advance_deduction_cents)
        .bind(payroll.deductions.other_deductions_cents)
        .bind(payroll.deductions.total_cents)
        .bind(payroll.net_salary_cents)
        .bind(payroll.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payroll (pending)", &payroll.id));
        }

        Ok(())
    }

    /// Marks a payroll as paid, freezing it forever.
    pub async fn mark_paid(&self, id: &str, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payrolls SET
                status = 'paid',
                paid_at = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Payroll (pending)", id));
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
    use crewpay_core::payroll::{build_payroll, PayrollOverrides, PayrollPolicy};
    use crewpay_core::{Employee, EmployeeStatus, WorkDay, WorkSchedule};

    fn employee() -> Employee {
        let now = Utc::now();
        Employee {
            id: "emp-1".to_string(),
            code: "E-01".to_string(),
            name: "Sara".to_string(),
            schedule: WorkSchedule {
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                work_days: vec![
                    WorkDay::Monday,
                    WorkDay::Tuesday,
                    WorkDay::Wednesday,
                    WorkDay::Thursday,
                    WorkDay::Friday,
                ],
                grace_period_minutes: 15,
            },
            basic_salary_cents: 420_000,
            allowances_cents: 30_000,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    async fn setup() -> (Database, Payroll) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let emp = employee();
        db.employees().insert(&emp).await.unwrap();

        let payroll = build_payroll(
            &emp,
            2026,
            8,
            &[],
            &[],
            &[],
            &PayrollOverrides::default(),
            &PayrollPolicy::default(),
            Utc::now(),
        )
        .unwrap();
        (db, payroll)
    }

    #[tokio::test]
    async fn test_insert_and_round_trip() {
        let (db, payroll) = setup().await;
        let repo = db.payrolls();

        repo.insert(&payroll).await.unwrap();

        let loaded = repo.get_for_period("emp-1", 8, 2026).await.unwrap().unwrap();
        assert_eq!(loaded.id, payroll.id);
        assert_eq!(loaded.summary.total_work_days, 21);
        assert_eq!(loaded.net_salary_cents, payroll.net_salary_cents);
        assert_eq!(loaded.suggestions, payroll.suggestions);
        assert_eq!(loaded.status, PayrollStatus::Pending);
    }

    #[tokio::test]
    async fn test_one_payroll_per_period() {
        let (db, payroll) = setup().await;
        let repo = db.payrolls();

        repo.insert(&payroll).await.unwrap();

        // A regenerated payroll for the same period races into the
        // UNIQUE constraint
        let mut duplicate = payroll.clone();
        duplicate.id = "another-id".to_string();
        let err = repo.insert(&duplicate).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_paid_payroll_is_frozen() {
        let (db, mut payroll) = setup().await;
        let repo = db.payrolls();

        repo.insert(&payroll).await.unwrap();
        repo.mark_paid(&payroll.id, Utc::now()).await.unwrap();

        let loaded = repo.get_by_id(&payroll.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, PayrollStatus::Paid);
        assert!(loaded.paid_at.is_some());

        // Edits and repeated mark_paid match no pending row
        payroll.earnings.bonuses_cents = 10_000;
        let err = repo.update_editable(&payroll).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        let err = repo.mark_paid(&payroll.id, Utc::now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
