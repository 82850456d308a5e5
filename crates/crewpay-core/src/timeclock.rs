//! # Timeclock Module
//!
//! Pure wall-clock arithmetic for attendance: late/grace, early leave,
//! overtime, actual work hours and work-day calendar membership.
//!
//! ## The Fixed Offset Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ALL wall-clock math runs at a FIXED UTC+2 offset                       │
//! │                                                                         │
//! │  • Clock events are stored as UTC instants                              │
//! │  • Schedules are local times-of-day ("09:00", "17:00")                  │
//! │  • Comparing the two requires picking a wall clock: it is ALWAYS        │
//! │    UTC+2, never a tz database and never daylight-saving aware           │
//! │                                                                         │
//! │  Why? The deployed system behaves this way, and late/early results on   │
//! │  DST-affected dates must not diverge between installations.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Overtime Definitions
//! The system tracks overtime twice, on purpose:
//! - `overtime_minutes` - shift overrun past the scheduled end time
//! - `WorkHours::overtime_hours` - actual hours worked beyond the 8-hour day
//!
//! They answer different questions ("stayed late?" vs "worked long?") and
//! are persisted as distinct fields.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::WorkDay;

// =============================================================================
// Constants
// =============================================================================

/// The fixed wall-clock offset, in seconds east of UTC (UTC+2).
pub const WALL_CLOCK_OFFSET_SECS: i32 = 2 * 3600;

/// The regular working day used to split actual hours into regular/overtime.
pub const STANDARD_DAY_HOURS: f64 = 8.0;

/// Returns the fixed UTC+2 offset used for all wall-clock math.
pub fn wall_clock_offset() -> FixedOffset {
    // 2 hours is always within the ±24h range FixedOffset accepts
    FixedOffset::east_opt(WALL_CLOCK_OFFSET_SECS).expect("fixed offset in range")
}

/// The calendar date an instant falls on, at the fixed wall clock.
///
/// Attendance records are keyed by this date, so a 23:30 UTC clock-in lands
/// on the next local day.
pub fn attendance_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&wall_clock_offset()).date_naive()
}

/// Builds the UTC instant of a scheduled time-of-day on a given local date.
fn scheduled_instant(date: NaiveDate, time_of_day: NaiveTime) -> DateTime<Utc> {
    // A fixed offset has no DST gaps or folds, so every local datetime maps
    // to exactly one instant.
    wall_clock_offset()
        .from_local_datetime(&date.and_time(time_of_day))
        .single()
        .expect("fixed offset is unambiguous")
        .with_timezone(&Utc)
}

// =============================================================================
// Result Types
// =============================================================================

/// Outcome of the late check at check-in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LateResult {
    pub late: bool,
    pub late_minutes: i64,
    pub grace_period_used: bool,
    pub grace_minutes_used: i64,
}

impl LateResult {
    /// Arrival at or before the scheduled start.
    pub const fn on_time() -> Self {
        LateResult {
            late: false,
            late_minutes: 0,
            grace_period_used: false,
            grace_minutes_used: 0,
        }
    }
}

/// Outcome of the early-leave check at check-out time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EarlyResult {
    pub early: bool,
    pub early_minutes: i64,
}

/// Outcome of the shift-overrun check at check-out time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OvertimeResult {
    pub overtime: bool,
    pub overtime_minutes: i64,
}

/// Actual hours worked between check-in and check-out.
///
/// `regular_hours`/`overtime_hours` use the 8-hour cap, independent of the
/// shift-overrun overtime in [`OvertimeResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WorkHours {
    pub total_minutes: i64,
    pub total_hours: f64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
}

// =============================================================================
// Calculations
// =============================================================================

/// Computes lateness for an arrival against a scheduled start time.
///
/// The scheduled-start instant is built from the arrival's calendar date at
/// the fixed UTC+2 offset; `grace_end = scheduled_start + grace`.
///
/// ## Policy
/// - `arrival <= scheduled_start` → on time
/// - `scheduled_start < arrival <= grace_end` → not late, grace consumed,
///   `grace_minutes_used` = whole minutes since the scheduled start
/// - `arrival > grace_end` → late, with `late_minutes` measured from the
///   **scheduled start**, not from the end of the grace window. Once
///   lateness triggers, the grace window's elapsed minutes are included in
///   `late_minutes`. This is observed business policy and is kept as-is.
///
/// ## Example
/// ```rust
/// use chrono::{NaiveTime, TimeZone, Utc};
/// use crewpay_core::timeclock::late_minutes;
///
/// let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// // 09:20 local = 07:20 UTC
/// let arrival = Utc.with_ymd_and_hms(2026, 8, 24, 7, 20, 0).unwrap();
/// let result = late_minutes(start, arrival, 15);
/// assert!(result.late);
/// assert_eq!(result.late_minutes, 20);
/// ```
pub fn late_minutes(
    scheduled_start: NaiveTime,
    arrival: DateTime<Utc>,
    grace_period_minutes: i64,
) -> LateResult {
    let scheduled = scheduled_instant(attendance_date(arrival), scheduled_start);

    if arrival <= scheduled {
        return LateResult::on_time();
    }

    let grace_end = scheduled + Duration::minutes(grace_period_minutes);
    let elapsed_minutes = (arrival - scheduled).num_minutes();

    if arrival <= grace_end {
        LateResult {
            late: false,
            late_minutes: 0,
            grace_period_used: true,
            grace_minutes_used: elapsed_minutes,
        }
    } else {
        LateResult {
            late: true,
            late_minutes: elapsed_minutes,
            grace_period_used: false,
            grace_minutes_used: 0,
        }
    }
}

/// Computes early-leave minutes for a departure against a scheduled end time.
///
/// Mutually exclusive with [`overtime_minutes`]: a departure is early,
/// on-time, or overtime, never two of those at once.
pub fn early_minutes(scheduled_end: NaiveTime, departure: DateTime<Utc>) -> EarlyResult {
    let scheduled = scheduled_instant(attendance_date(departure), scheduled_end);

    if departure < scheduled {
        EarlyResult {
            early: true,
            early_minutes: (scheduled - departure).num_minutes(),
        }
    } else {
        EarlyResult {
            early: false,
            early_minutes: 0,
        }
    }
}

/// Computes shift-overrun overtime minutes for a departure against a
/// scheduled end time. Symmetric counterpart of [`early_minutes`].
pub fn overtime_minutes(scheduled_end: NaiveTime, departure: DateTime<Utc>) -> OvertimeResult {
    let scheduled = scheduled_instant(attendance_date(departure), scheduled_end);

    if departure > scheduled {
        OvertimeResult {
            overtime: true,
            overtime_minutes: (departure - scheduled).num_minutes(),
        }
    } else {
        OvertimeResult {
            overtime: false,
            overtime_minutes: 0,
        }
    }
}

/// Computes actual hours worked between a check-in and check-out pair.
///
/// - `total_minutes` = whole minutes between the instants
/// - `total_hours` = minutes / 60, rounded to 2 decimals
/// - `regular_hours` = min(total_hours, 8)
/// - `overtime_hours` = max(0, total_hours − 8)
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use crewpay_core::timeclock::actual_work_hours;
///
/// let check_in = Utc.with_ymd_and_hms(2026, 8, 24, 7, 0, 0).unwrap();
/// let check_out = Utc.with_ymd_and_hms(2026, 8, 24, 16, 30, 0).unwrap();
/// let hours = actual_work_hours(check_in, check_out);
/// assert_eq!(hours.total_hours, 9.5);
/// assert_eq!(hours.regular_hours, 8.0);
/// assert_eq!(hours.overtime_hours, 1.5);
/// ```
pub fn actual_work_hours(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> WorkHours {
    let total_minutes = (check_out - check_in).num_minutes();
    let total_hours = round2(total_minutes as f64 / 60.0);
    let regular_hours = total_hours.min(STANDARD_DAY_HOURS);
    let overtime_hours = round2((total_hours - STANDARD_DAY_HOURS).max(0.0));

    WorkHours {
        total_minutes,
        total_hours,
        regular_hours,
        overtime_hours,
    }
}

/// Checks whether an instant falls on one of the configured work days,
/// using the fixed-offset calendar.
pub fn is_work_day(instant: DateTime<Utc>, work_days: &[WorkDay]) -> bool {
    let weekday = instant.with_timezone(&wall_clock_offset()).weekday();
    work_days.contains(&WorkDay::from_weekday(weekday))
}

/// Counts the calendar days in (year, month) whose weekday is in the
/// configured work-day set. Returns `None` for an impossible month.
pub fn work_days_in_month(year: i32, month: u32, work_days: &[WorkDay]) -> Option<i64> {
    let mut day = NaiveDate::from_ymd_opt(year, month, 1)?;
    let mut count = 0;

    while day.month() == month {
        if work_days.contains(&WorkDay::from_weekday(day.weekday())) {
            count += 1;
        }
        day = day.succ_opt()?;
    }

    Some(count)
}

/// Rounds to 2 decimal places (reporting precision for hour figures).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn nine_am() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    fn five_pm() -> NaiveTime {
        NaiveTime::from_hms_opt(17, 0, 0).unwrap()
    }

    /// 2026-08-24 is a Monday. Local HH:MM at UTC+2 = (HH-2):MM UTC.
    fn monday_local(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, hour - 2, minute, 0).unwrap()
    }

    #[test]
    fn test_arrival_exactly_on_time() {
        let result = late_minutes(nine_am(), monday_local(9, 0), 15);
        assert!(!result.late);
        assert_eq!(result.late_minutes, 0);
        assert!(!result.grace_period_used);
    }

    #[test]
    fn test_arrival_within_grace() {
        let result = late_minutes(nine_am(), monday_local(9, 10), 15);
        assert!(!result.late);
        assert_eq!(result.late_minutes, 0);
        assert!(result.grace_period_used);
        assert_eq!(result.grace_minutes_used, 10);
    }

    #[test]
    fn test_arrival_at_grace_boundary_is_not_late() {
        let result = late_minutes(nine_am(), monday_local(9, 15), 15);
        assert!(!result.late);
        assert!(result.grace_period_used);
        assert_eq!(result.grace_minutes_used, 15);
    }

    #[test]
    fn test_arrival_past_grace_counts_from_scheduled_start() {
        // 09:20 with a 15-minute grace: late by 20 minutes, NOT 5.
        // The grace window is folded into late_minutes once lateness triggers.
        let result = late_minutes(nine_am(), monday_local(9, 20), 15);
        assert!(result.late);
        assert_eq!(result.late_minutes, 20);
        assert!(!result.grace_period_used);
        assert_eq!(result.grace_minutes_used, 0);
    }

    #[test]
    fn test_early_arrival() {
        let result = late_minutes(nine_am(), monday_local(8, 45), 15);
        assert!(!result.late);
        assert!(!result.grace_period_used);
    }

    #[test]
    fn test_early_departure() {
        let result = early_minutes(five_pm(), monday_local(16, 30));
        assert!(result.early);
        assert_eq!(result.early_minutes, 30);

        let overtime = overtime_minutes(five_pm(), monday_local(16, 30));
        assert!(!overtime.overtime);
        assert_eq!(overtime.overtime_minutes, 0);
    }

    #[test]
    fn test_overtime_departure() {
        let result = overtime_minutes(five_pm(), monday_local(18, 15));
        assert!(result.overtime);
        assert_eq!(result.overtime_minutes, 75);

        let early = early_minutes(five_pm(), monday_local(18, 15));
        assert!(!early.early);
    }

    #[test]
    fn test_departure_exactly_at_end() {
        assert!(!early_minutes(five_pm(), monday_local(17, 0)).early);
        assert!(!overtime_minutes(five_pm(), monday_local(17, 0)).overtime);
    }

    #[test]
    fn test_actual_work_hours_nine_and_a_half() {
        let hours = actual_work_hours(monday_local(9, 0), monday_local(18, 30));
        assert_eq!(hours.total_minutes, 570);
        assert_eq!(hours.total_hours, 9.5);
        assert_eq!(hours.regular_hours, 8.0);
        assert_eq!(hours.overtime_hours, 1.5);
    }

    #[test]
    fn test_actual_work_hours_short_day() {
        let hours = actual_work_hours(monday_local(9, 0), monday_local(13, 20));
        assert_eq!(hours.total_minutes, 260);
        assert_eq!(hours.total_hours, 4.33);
        assert_eq!(hours.regular_hours, 4.33);
        assert_eq!(hours.overtime_hours, 0.0);
    }

    #[test]
    fn test_is_work_day_uses_fixed_offset_calendar() {
        let weekdays = vec![
            WorkDay::Monday,
            WorkDay::Tuesday,
            WorkDay::Wednesday,
            WorkDay::Thursday,
            WorkDay::Friday,
        ];

        assert!(is_work_day(monday_local(9, 0), &weekdays));

        // Sunday 23:00 UTC is already Monday 01:00 at UTC+2
        let sunday_night_utc = Utc.with_ymd_and_hms(2026, 8, 23, 23, 0, 0).unwrap();
        assert!(is_work_day(sunday_night_utc, &weekdays));

        // Saturday local
        let saturday = Utc.with_ymd_and_hms(2026, 8, 22, 10, 0, 0).unwrap();
        assert!(!is_work_day(saturday, &weekdays));
    }

    #[test]
    fn test_attendance_date_rolls_over_at_offset_midnight() {
        let late_utc = Utc.with_ymd_and_hms(2026, 8, 23, 22, 30, 0).unwrap();
        assert_eq!(
            attendance_date(late_utc),
            NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
        );
    }

    #[test]
    fn test_work_days_in_month() {
        let weekdays = vec![
            WorkDay::Monday,
            WorkDay::Tuesday,
            WorkDay::Wednesday,
            WorkDay::Thursday,
            WorkDay::Friday,
        ];
        // August 2026 has 21 weekdays
        assert_eq!(work_days_in_month(2026, 8, &weekdays), Some(21));

        // February 2026 (non-leap): 4 full weeks = 20 weekdays
        assert_eq!(work_days_in_month(2026, 2, &weekdays), Some(20));

        assert_eq!(work_days_in_month(2026, 8, &[]), Some(0));
        assert_eq!(work_days_in_month(2026, 13, &weekdays), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.333333), 4.33);
        assert_eq!(round2(4.335), 4.34);
        assert_eq!(round2(9.5), 9.5);
    }
}
