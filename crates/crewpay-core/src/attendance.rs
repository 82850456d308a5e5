//! # Attendance State Machine
//!
//! Pure decision logic for the per-day attendance progression.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              NOT_CHECKED_IN ──► CHECKED_IN ──► COMPLETED                │
//! │                                                                         │
//! │  CHECK_IN requires:                                                    │
//! │    • employee active                                                   │
//! │    • instant falls on a configured work day                            │
//! │    • no existing record for (employee, date)                           │
//! │                                                                         │
//! │  CHECK_OUT requires:                                                   │
//! │    • an existing record with check_in set and check_out unset          │
//! │    • instant strictly after the stored check-in                        │
//! │                                                                         │
//! │  COMPLETED is terminal per day and derived at read time from           │
//! │  check_out being set. Duplicates are rejected, never overwritten.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module makes the decisions; persistence (and the UNIQUE constraint
//! that backs the one-record-per-day invariant under concurrency) lives in
//! crewpay-db, and orchestration in crewpay-engine.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::timeclock;
use crate::types::{
    AttendanceRecord, AttendanceStatus, CheckIn, CheckOut, Employee, EntryMethod,
};

/// Builds a new attendance record for a check-in event.
///
/// ## Arguments
/// * `employee` - the employee clocking in
/// * `instant` - the clock-in instant (self-service "now" or an operator
///   supplied past instant)
/// * `now` - the wall-clock time of recording, used for audit timestamps
/// * `recorded_by` - user id of whoever recorded the event
/// * `entry_method` - self-service vs operator entry
/// * `existing` - the day's record, if the store already has one
///
/// ## Errors
/// * `EmployeeInactive` - soft-deleted employees cannot clock in
/// * `AlreadyCheckedIn` - a record already exists for the day; the first
///   record is left unchanged
/// * `NotAWorkDay` - the instant's fixed-offset date is not in the
///   employee's configured work-day set
pub fn build_check_in(
    employee: &Employee,
    instant: DateTime<Utc>,
    now: DateTime<Utc>,
    recorded_by: &str,
    entry_method: EntryMethod,
    existing: Option<&AttendanceRecord>,
) -> CoreResult<AttendanceRecord> {
    if !employee.is_active() {
        return Err(CoreError::EmployeeInactive(employee.id.clone()));
    }

    let date = timeclock::attendance_date(instant);

    if existing.is_some() {
        return Err(CoreError::AlreadyCheckedIn {
            employee_id: employee.id.clone(),
            date,
        });
    }

    if !timeclock::is_work_day(instant, &employee.schedule.work_days) {
        return Err(CoreError::NotAWorkDay {
            employee_id: employee.id.clone(),
            date,
        });
    }

    let late = timeclock::late_minutes(
        employee.schedule.start_time,
        instant,
        employee.schedule.grace_period_minutes,
    );

    Ok(AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        employee_id: employee.id.clone(),
        date,
        check_in: CheckIn {
            time: instant,
            late: late.late,
            late_minutes: late.late_minutes,
            grace_period_used: late.grace_period_used,
            grace_minutes_used: late.grace_minutes_used,
        },
        check_out: None,
        calculations: None,
        status: AttendanceStatus::Present,
        recorded_by: recorded_by.to_string(),
        entry_method,
        created_at: now,
        updated_at: now,
    })
}

/// Applies a check-out event to an existing record.
///
/// Computes early/overtime against the scheduled end and the actual-hours
/// block from the stored check-in timestamp.
///
/// ## Errors
/// * `AlreadyCheckedOut` - the day is already completed
/// * `CheckOutNotAfterCheckIn` - the instant is at or before the stored
///   check-in (equal instants are rejected)
pub fn apply_check_out(
    record: &mut AttendanceRecord,
    employee: &Employee,
    instant: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    if record.check_out.is_some() {
        return Err(CoreError::AlreadyCheckedOut {
            employee_id: record.employee_id.clone(),
            date: record.date,
        });
    }

    if instant <= record.check_in.time {
        return Err(CoreError::CheckOutNotAfterCheckIn { date: record.date });
    }

    let early = timeclock::early_minutes(employee.schedule.end_time, instant);
    let overtime = timeclock::overtime_minutes(employee.schedule.end_time, instant);

    record.check_out = Some(CheckOut {
        time: instant,
        early: early.early,
        early_minutes: early.early_minutes,
        overtime_minutes: overtime.overtime_minutes,
    });
    record.calculations = Some(timeclock::actual_work_hours(record.check_in.time, instant));
    record.updated_at = now;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
