//! # Attendance Repository
//!
//! Persistence for the per-day attendance records.
//!
//! ## Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two guards back the one-record-per-day invariant:                      │
//! │                                                                         │
//! │  1. INSERT races lose at UNIQUE(employee_id, date)                     │
//! │     → second concurrent check-in gets UniqueViolation                  │
//! │                                                                         │
//! │  2. Check-out is a conditional write:                                  │
//! │     UPDATE ... WHERE id = ? AND check_out_time IS NULL                 │
//! │     → second concurrent check-out affects zero rows → NotFound         │
//! │                                                                         │
//! │  The first writer's record is never overwritten.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crewpay_core::timeclock::WorkHours;
use crewpay_core::{AttendanceRecord, AttendanceStatus, CheckIn, CheckOut, EntryMethod};

/// Flat row shape for attendance_records. Check-out and calculations
/// columns are nullable as a unit.
#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: String,
    employee_id: String,
    date: NaiveDate,

    check_in_time: DateTime<Utc>,
    late: bool,
    late_minutes: i64,
    grace_period_used: bool,
    grace_minutes_used: i64,

    check_out_time: Option<DateTime<Utc>>,
    early: Option<bool>,
    early_minutes: Option<i64>,
    overtime_minutes: Option<i64>,

    total_minutes: Option<i64>,
    total_hours: Option<f64>,
    regular_hours: Option<f64>,
    overtime_hours: Option<f64>,

    status: AttendanceStatus,
    recorded_by: String,
    entry_method: EntryMethod,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        let check_out = row.check_out_time.map(|time| CheckOut {
            time,
            early: row.early.unwrap_or(false),
            early_minutes: row.early_minutes.unwrap_or(0),
            overtime_minutes: row.overtime_minutes.unwrap_or(0),
        });

        let calculations = match (row.total_minutes, row.total_hours) {
            (Some(total_minutes), Some(total_hours)) => Some(WorkHours {
                total_minutes,
                total_hours,
                regular_hours: row.regular_hours.unwrap_or(0.0),
                overtime_hours: row.overtime_hours.unwrap_or(0.0),
            }),
            _ => None,
        };

        AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            check_in: CheckIn {
                time: row.check_in_time,
                late: row.late,
                late_minutes: row.late_minutes,
                grace_period_used: row.grace_period_used,
                grace_minutes_used: row.grace_minutes_used,
            },
            check_out,
            calculations,
            status: row.status,
            recorded_by: row.recorded_by,
            entry_method: row.entry_method,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, employee_id, date,
        check_in_time, late, late_minutes, grace_period_used, grace_minutes_used,
        check_out_time, early, early_minutes, overtime_minutes,
        total_minutes, total_hours, regular_hours, overtime_hours,
        status, recorded_by, entry_method,
        created_at, updated_at
    FROM attendance_records
"#;

/// Repository for attendance database operations.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    /// Creates a new AttendanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AttendanceRepository { pool }
    }

    /// Inserts a freshly built check-in record.
    ///
    /// A concurrent duplicate loses at UNIQUE(employee_id, date) and gets
    /// `DbError::UniqueViolation`.
    pub async fn insert(&self, record: &AttendanceRecord) -> DbResult<()> {
        debug!(
            employee_id = %record.employee_id,
            date = %record.date,
            "Inserting attendance record"
        );

        sqlx::query(
            r#"
            INSERT INTO attendance_records (
                id, employee_id, date,
                check_in_time, late, late_minutes, grace_period_used, grace_minutes_used,
                status, recorded_by, entry_method,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&record.id)
        .bind(&record.employee_id)
        .bind(record.date)
        .bind(record.check_in.time)
        .bind(record.check_in.late)
        .bind(record.check_in.late_minutes)
        .bind(record.check_in.grace_period_used)
        .bind(record.check_in.grace_minutes_used)
        .bind(record.status)
        .bind(&record.recorded_by)
        .bind(record.entry_method)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets the record for one (employee, date), if any.
    pub async fn get_for_day(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> DbResult<Option<AttendanceRecord>> {
        let row: Option<AttendanceRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE employee_id = ?1 AND date = ?2"))
                .bind(employee_id)
                .bind(date)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(AttendanceRecord::from))
    }

    /// Writes the check-out half of a record.
    ///
    /// Conditional on the record still being open: a second check-out (or a
    /// concurrent one that lost the race) affects zero rows and returns
    /// `DbError::NotFound`.
    pub async fn complete_check_out(&self, record: &AttendanceRecord) -> DbResult<()> {
        let check_out = record
            .check_out
            .as_ref()
            .ok_or_else(|| DbError::Internal("record has no check-out to persist".to_string()))?;
        let calc = record
            .calculations
            .as_ref()
            .ok_or_else(|| DbError::Internal("record has no calculations to persist".to_string()))?;

        debug!(
            employee_id = %record.employee_id,
            date = %record.date,
            "Completing check-out"
        );

        let result = sqlx::query(
            r#"
            UPDATE attendance_records SET
                check_out_time = ?2,
                early = ?3,
                early_minutes = ?4,
                overtime_minutes = ?5,
                total_minutes = ?6,
                total_hours = ?7,
                regular_hours = ?8,
                overtime_hours = ?9,
                updated_at = ?10
            WHERE id = ?1 AND check_out_time IS NULL
            "#,
        )
        .bind(&record.id)
        .bind(check_out.time)
        .bind(check_out.early)
        .bind(check_out.early_minutes)
        .bind(check_out.overtime_minutes)
        .bind(calc.total_minutes)
        .bind(calc.total_hours)
        .bind(calc.regular_hours)
        .bind(calc.overtime_hours)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Attendance record (open)", &record.id));
        }

        Ok(())
    }

    /// Lists all records for an employee, newest first.
    ///
    /// Deliberately broad: month filtering happens in the engine.
    pub async fn list_for_employee(&self, employee_id: &str) -> DbResult<Vec<AttendanceRecord>> {
        let rows: Vec<AttendanceRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE employee_id = ?1 ORDER BY date DESC"))
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    /// Lists every record for one calendar day across all employees.
    pub async fn list_for_date(&self, date: NaiveDate) -> DbResult<Vec<AttendanceRecord>> {
        let rows: Vec<AttendanceRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE date = ?1 ORDER BY employee_id"))
                .bind(date)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use crewpay_core::attendance::{apply_check_out, build_check_in};
    use crewpay_core::{Employee, EmployeeStatus, WorkDay, WorkSchedule};

    fn employee() -> Employee {
        let now = Utc::now();
        Employee {
            id: "emp-1".to_string(),
            code: "E-01".to_string(),
            name: "Sara".to_string(),
            schedule: WorkSchedule {
                start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                work_days: vec![
                    WorkDay::Monday,
                    WorkDay::Tuesday,
                    WorkDay::Wednesday,
                    WorkDay::Thursday,
                    WorkDay::Friday,
                ],
                grace_period_minutes: 15,
            },
            basic_salary_cents: 300_000,
            allowances_cents: 0,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// 2026-08-24 is a Monday; local HH:MM at UTC+2.
    fn monday_local(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, hour - 2, minute, 0).unwrap()
    }

    async fn setup() -> (Database, Employee) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let emp = employee();
        db.employees().insert(&emp).await.unwrap();
        (db, emp)
    }

    #[tokio::test]
    async fn test_insert_and_load_round_trip() {
        let (db, emp) = setup().await;
        let repo = db.attendance();

        let instant = monday_local(9, 10);
        let record =
            build_check_in(&emp, instant, instant, &emp.id, EntryMethod::SelfService, None)
                .unwrap();
        repo.insert(&record).await.unwrap();

        let loaded = repo.get_for_day(&emp.id, record.date).await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.check_in.time, instant);
        assert!(loaded.check_in.grace_period_used);
        assert!(loaded.check_out.is_none());
        assert!(loaded.calculations.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_day_loses_at_unique_constraint() {
        let (db, emp) = setup().await;
        let repo = db.attendance();

        let first =
            build_check_in(&emp, monday_local(9, 0), monday_local(9, 0), &emp.id,
                EntryMethod::SelfService, None)
            .unwrap();
        repo.insert(&first).await.unwrap();

        // A second record for the same day, as a lost race would produce
        let second =
            build_check_in(&emp, monday_local(9, 5), monday_local(9, 5), &emp.id,
                EntryMethod::SelfService, None)
            .unwrap();
        let err = repo.insert(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // First record untouched
        let loaded = repo.get_for_day(&emp.id, first.date).await.unwrap().unwrap();
        assert_eq!(loaded.id, first.id);
        assert_eq!(loaded.check_in.time, first.check_in.time);
    }

    #[tokio::test]
    async fn test_check_out_is_conditional() {
        let (db, emp) = setup().await;
        let repo = db.attendance();

        let mut record =
            build_check_in(&emp, monday_local(9, 0), monday_local(9, 0), &emp.id,
                EntryMethod::SelfService, None)
            .unwrap();
        repo.insert(&record).await.unwrap();

        apply_check_out(&mut record, &emp, monday_local(17, 30), monday_local(17, 30)).unwrap();
        repo.complete_check_out(&record).await.unwrap();

        let loaded = repo.get_for_day(&emp.id, record.date).await.unwrap().unwrap();
        let check_out = loaded.check_out.unwrap();
        assert_eq!(check_out.overtime_minutes, 30);
        let calc = loaded.calculations.unwrap();
        assert_eq!(calc.total_hours, 8.5);

        // Second completion matches no open row
        let err = repo.complete_check_out(&record).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_for_employee_is_broad() {
        let (db, emp) = setup().await;
        let repo = db.attendance();

        for day in [24, 25] {
            let instant = Utc.with_ymd_and_hms(2026, 8, day, 7, 0, 0).unwrap();
            let record =
                build_check_in(&emp, instant, instant, &emp.id, EntryMethod::SelfService, None)
                    .unwrap();
            repo.insert(&record).await.unwrap();
        }

        let records = repo.list_for_employee(&emp.id).await.unwrap();
        assert_eq!(records.len(), 2);
        // Newest first
        assert!(records[0].date > records[1].date);
    }
}
