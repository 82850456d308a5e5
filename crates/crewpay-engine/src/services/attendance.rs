//! # Attendance Service
//!
//! Clock-in/clock-out orchestration.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check_in(req)                                                          │
//! │    1. load employee                  ── NOT_FOUND if missing            │
//! │    2. load existing record for day                                      │
//! │    3. build_check_in (pure)          ── business errors surface here    │
//! │    4. insert                         ── UNIQUE backstops races          │
//! │    5. audit (best-effort)                                               │
//! │                                                                         │
//! │  check_out(req)                                                         │
//! │    1. load employee + day record     ── NotCheckedIn if no record       │
//! │    2. apply_check_out (pure)                                            │
//! │    3. complete_check_out             ── conditional write; a concurrent │
//! │       (WHERE check_out IS NULL)         winner turns us into NotFound   │
//! │    4. audit (best-effort)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The day-progression decisions live in `crewpay_core::attendance`; this
//! service only loads, delegates and persists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crewpay_core::attendance::{apply_check_out, build_check_in};
use crewpay_core::timeclock::attendance_date;
use crewpay_core::{AttendanceRecord, AttendanceState, CoreError, EntryMethod};
use crewpay_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::services::audit;

/// Request to record a check-in.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub employee_id: String,

    /// Explicit instant for operator entries. `None` means "now"
    /// (self-service).
    #[ts(as = "Option<String>")]
    pub instant: Option<DateTime<Utc>>,

    /// User id of whoever recorded the event.
    pub recorded_by: String,

    pub entry_method: EntryMethod,
}

/// Request to record a check-out.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    pub employee_id: String,

    /// Explicit instant for operator entries. `None` means "now".
    #[ts(as = "Option<String>")]
    pub instant: Option<DateTime<Utc>>,

    pub recorded_by: String,
}

/// One employee's progression for one day, for display.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DayStatus {
    pub employee_id: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub state: AttendanceState,
    pub record: Option<AttendanceRecord>,
}

/// Clock-in/clock-out operations.
#[derive(Clone)]
pub struct AttendanceService {
    db: Database,
}

impl AttendanceService {
    pub fn new(db: Database) -> Self {
        AttendanceService { db }
    }

    /// Records a check-in, creating the day's attendance record.
    pub async fn check_in(&self, req: CheckInRequest) -> EngineResult<AttendanceRecord> {
        let now = Utc::now();
        let instant = req.instant.unwrap_or(now);

        let employee = self
            .db
            .employees()
            .get_by_id(&req.employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Employee", &req.employee_id))?;

        let date = attendance_date(instant);
        let existing = self
            .db
            .attendance()
            .get_for_day(&req.employee_id, date)
            .await?;

        let record = build_check_in(
            &employee,
            instant,
            now,
            &req.recorded_by,
            req.entry_method,
            existing.as_ref(),
        )?;

        // Two concurrent first check-ins both pass the existence read; the
        // UNIQUE(employee_id, date) constraint rejects the loser here.
        self.db.attendance().insert(&record).await?;

        info!(
            employee_id = %employee.id,
            %date,
            late = record.check_in.late,
            entry_method = ?record.entry_method,
            "Check-in recorded"
        );

        audit(
            &self.db,
            "attendance",
            "check_in",
            format!("{} checked in on {}", employee.name, date),
            &record.id,
            &req.recorded_by,
        )
        .await;

        Ok(record)
    }

    /// Records a check-out, completing the day's attendance record.
    pub async fn check_out(&self, req: CheckOutRequest) -> EngineResult<AttendanceRecord> {
        let now = Utc::now();
        let instant = req.instant.unwrap_or(now);

        let employee = self
            .db
            .employees()
            .get_by_id(&req.employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Employee", &req.employee_id))?;

        let date = attendance_date(instant);
        let mut record = self
            .db
            .attendance()
            .get_for_day(&req.employee_id, date)
            .await?
            .ok_or_else(|| CoreError::NotCheckedIn {
                employee_id: req.employee_id.clone(),
                date,
            })?;

        apply_check_out(&mut record, &employee, instant, now)?;

        // Conditional write; if a concurrent check-out already landed this
        // comes back as NotFound and the in-memory mutation is discarded.
        self.db.attendance().complete_check_out(&record).await?;

        info!(
            employee_id = %employee.id,
            %date,
            overtime_minutes = record.check_out.map_or(0, |c| c.overtime_minutes),
            "Check-out recorded"
        );

        audit(
            &self.db,
            "attendance",
            "check_out",
            format!("{} checked out on {}", employee.name, date),
            &record.id,
            &req.recorded_by,
        )
        .await;

        Ok(record)
    }

    /// Reports the day's progression for an employee.
    pub async fn day_status(&self, employee_id: &str, date: NaiveDate) -> EngineResult<DayStatus> {
        // Existence check so an unknown id is NOT_FOUND, not NotCheckedIn.
        let employee = self
            .db
            .employees()
            .get_by_id(employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Employee", employee_id))?;

        let record = self.db.attendance().get_for_day(employee_id, date).await?;
        let state = record
            .as_ref()
            .map_or(AttendanceState::NotCheckedIn, AttendanceRecord::state);

        Ok(DayStatus {
            employee_id: employee.id,
            date,
            state,
            record,
        })
    }

    /// Lists all attendance records for one calendar day.
    pub async fn records_for_date(&self, date: NaiveDate) -> EngineResult<Vec<AttendanceRecord>> {
        Ok(self.db.attendance().list_for_date(date).await?)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::TimeZone;
    use crewpay_core::{Employee, EmployeeStatus, WorkDay, WorkSchedule};
    use crewpay_db::DbConfig;
    use uuid::Uuid;

    async fn setup() -> (Database, Employee) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            code: "E-01".to_string(),
            name: "Sara Haddad".to_string(),
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
            basic_salary_cents: 420_000,
            allowances_cents: 20_000,
            status: EmployeeStatus::Active,
            created_at: now,
            updated_at: now,
        };
        db.employees().insert(&employee).await.unwrap();
        (db, employee)
    }

    /// 2026-08-24 is a Monday; local HH:MM at UTC+2 is (HH-2):MM UTC.
    fn monday_local(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, hour - 2, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn test_check_in_then_check_out() {
        let (db, employee) = setup().await;
        let service = AttendanceService::new(db);

        let record = service
            .check_in(CheckInRequest {
                employee_id: employee.id.clone(),
                instant: Some(monday_local(9, 10)),
                recorded_by: employee.id.clone(),
                entry_method: EntryMethod::SelfService,
            })
            .await
            .unwrap();
        assert_eq!(record.state(), AttendanceState::CheckedIn);
        assert!(record.check_in.grace_period_used);

        let record = service
            .check_out(CheckOutRequest {
                employee_id: employee.id.clone(),
                instant: Some(monday_local(17, 30)),
                recorded_by: employee.id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(record.state(), AttendanceState::Completed);
        assert_eq!(record.check_out.unwrap().overtime_minutes, 30);

        let status = service
            .day_status(&employee.id, record.date)
            .await
            .unwrap();
        assert_eq!(status.state, AttendanceState::Completed);
    }

    #[tokio::test]
    async fn test_duplicate_check_in_rejected_first_record_unchanged() {
        let (db, employee) = setup().await;
        let service = AttendanceService::new(db);

        let first = service
            .check_in(CheckInRequest {
                employee_id: employee.id.clone(),
                instant: Some(monday_local(9, 0)),
                recorded_by: employee.id.clone(),
                entry_method: EntryMethod::SelfService,
            })
            .await
            .unwrap();

        let err = service
            .check_in(CheckInRequest {
                employee_id: employee.id.clone(),
                instant: Some(monday_local(9, 45)),
                recorded_by: employee.id.clone(),
                entry_method: EntryMethod::SelfService,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        let status = service
            .day_status(&employee.id, first.date)
            .await
            .unwrap();
        let stored = status.record.unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.check_in.time, first.check_in.time);
    }

    #[tokio::test]
    async fn test_check_out_without_check_in_rejected() {
        let (db, employee) = setup().await;
        let service = AttendanceService::new(db);

        let err = service
            .check_out(CheckOutRequest {
                employee_id: employee.id.clone(),
                instant: Some(monday_local(17, 0)),
                recorded_by: employee.id.clone(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert!(err.message.contains("not checked in"));
    }

    #[tokio::test]
    async fn test_unknown_employee_is_not_found() {
        let (db, _) = setup().await;
        let service = AttendanceService::new(db);

        let err = service
            .check_in(CheckInRequest {
                employee_id: "missing".to_string(),
                instant: Some(monday_local(9, 0)),
                recorded_by: "missing".to_string(),
                entry_method: EntryMethod::SelfService,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_check_in() {
        let (db, employee) = setup().await;

        // Break the audit sink; the primary write must still succeed
        sqlx::query("DROP TABLE audit_log")
            .execute(db.pool())
            .await
            .unwrap();

        let service = AttendanceService::new(db);
        let record = service
            .check_in(CheckInRequest {
                employee_id: employee.id.clone(),
                instant: Some(monday_local(9, 0)),
                recorded_by: employee.id.clone(),
                entry_method: EntryMethod::SelfService,
            })
            .await
            .unwrap();
        assert_eq!(record.state(), AttendanceState::CheckedIn);
    }

    #[tokio::test]
    async fn test_check_in_audited() {
        let (db, employee) = setup().await;
        let service = AttendanceService::new(db.clone());

        service
            .check_in(CheckInRequest {
                employee_id: employee.id.clone(),
                instant: Some(monday_local(9, 0)),
                recorded_by: "manager-1".to_string(),
                entry_method: EntryMethod::Operator,
            })
            .await
            .unwrap();

        let entries = db.audit_log().list_recent(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "attendance");
        assert_eq!(entries[0].action, "check_in");
        assert_eq!(entries[0].performed_by, "manager-1");
    }
}
