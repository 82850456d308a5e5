//! # Payroll Aggregation Engine
//!
//! Consumes a month of attendance records plus pending advances for one
//! employee and produces an itemized payroll with exact net salary.
//!
//! ## Aggregation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  employee + (month, year)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total_work_days  ← calendar days whose weekday ∈ schedule.work_days   │
//! │       │             (zero → AggregationError, this employee only)      │
//! │       ▼                                                                 │
//! │  AttendanceSummary ← present/absent/late/overtime sums from records    │
//! │       │              (leave-covered days exempt from absence math)     │
//! │       ▼                                                                 │
//! │  Suggestions ← absent: dailySalary × absentDays                        │
//! │                late:   ceil(lateMinutes/15) × block rate               │
//! │                advance: Σ pending installments                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Earnings / Deductions ← operator overrides, asymmetric defaults       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  net_salary = earnings.total − deductions.total  (exact, in cents)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Asymmetric Defaults
//! The system proposes attendance penalties but never applies them on its
//! own: `absent_deduction` and `late_deduction` default to 0 and only take
//! effect when an operator opts in. `advance_deduction`, by contrast,
//! defaults to its computed suggestion, because the advance was already an
//! agreed repayment plan. Intentional policy; do not unify.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{AggregationError, CoreError, CoreResult};
use crate::money::Money;
use crate::timeclock;
use crate::types::{
    Advance, AdvanceStatus, AttendanceRecord, AttendanceSummary, Deductions, Earnings, Employee,
    Leave, Payroll, PayrollStatus, PayrollSuggestions, WorkDay,
};

// =============================================================================
// Policy
// =============================================================================

/// Tunable payroll policy knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayrollPolicy {
    /// Late minutes are charged in blocks of this size (started blocks
    /// count in full).
    pub late_block_minutes: i64,

    /// Suggested charge per started late block, in cents.
    pub late_block_rate_cents: i64,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        PayrollPolicy {
            late_block_minutes: 15,
            late_block_rate_cents: crate::DEFAULT_LATE_BLOCK_RATE_CENTS,
        }
    }
}

/// Operator-supplied overrides for the editable payroll fields.
///
/// `None` means "use the default for that field"; the defaults are
/// deliberately not uniform (see module docs).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PayrollOverrides {
    pub bonuses_cents: Option<i64>,
    pub overtime_pay_cents: Option<i64>,
    pub absent_deduction_cents: Option<i64>,
    pub late_deduction_cents: Option<i64>,
    pub advance_deduction_cents: Option<i64>,
    pub other_deductions_cents: Option<i64>,
}

// =============================================================================
// Aggregation
// =============================================================================

/// Builds the attendance summary for a period from the record set.
///
/// The caller supplies the records for the period (the engine filters the
/// store's broad read down to the month); this function only sums what it
/// is given. Leave-covered work days without a record count as leave, not
/// absence.
pub fn summarize_attendance(
    employee: &Employee,
    year: i32,
    month: u32,
    records: &[AttendanceRecord],
    leaves: &[Leave],
    total_work_days: i64,
) -> AttendanceSummary {
    let present_days = records.len() as i64;
    let late_days = records.iter().filter(|r| r.check_in.late).count() as i64;
    let total_late_minutes: i64 = records.iter().map(|r| r.check_in.late_minutes).sum();
    let total_overtime_minutes: i64 = records
        .iter()
        .filter_map(|r| r.check_out.as_ref())
        .map(|c| c.overtime_minutes)
        .sum();
    let total_work_hours = timeclock::round2(
        records
            .iter()
            .filter_map(|r| r.calculations.as_ref())
            .map(|c| c.total_hours)
            .sum(),
    );

    let leave_days = leave_days_in_month(employee, year, month, records, leaves);
    let absent_days = (total_work_days - present_days - leave_days).max(0);

    AttendanceSummary {
        total_work_days,
        present_days,
        absent_days,
        leave_days,
        late_days,
        total_late_minutes,
        total_overtime_minutes,
        total_work_hours,
    }
}

/// Counts configured work days in the month that are covered by a leave
/// entry and have no attendance record.
fn leave_days_in_month(
    employee: &Employee,
    year: i32,
    month: u32,
    records: &[AttendanceRecord],
    leaves: &[Leave],
) -> i64 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };

    let mut day = first;
    let mut count = 0;
    while day.month() == month {
        let is_work_day = employee
            .schedule
            .includes(WorkDay::from_weekday(day.weekday()));
        if is_work_day
            && leaves.iter().any(|l| l.covers(day))
            && !records.iter().any(|r| r.date == day)
        {
            count += 1;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    count
}

/// Computes the system's deduction suggestions. Never auto-applied.
pub fn compute_suggestions(
    employee: &Employee,
    summary: &AttendanceSummary,
    pending_advances: &[Advance],
    policy: &PayrollPolicy,
) -> PayrollSuggestions {
    // Integer cents division: sub-cent remainders of the daily rate are
    // dropped, matching how the figures are presented to the operator.
    let daily_salary = Money::from_cents(employee.basic_salary_cents / summary.total_work_days);

    let late_blocks = if summary.total_late_minutes > 0 {
        (summary.total_late_minutes + policy.late_block_minutes - 1) / policy.late_block_minutes
    } else {
        0
    };

    let advance_total: i64 = pending_advances
        .iter()
        .filter(|a| a.status == AdvanceStatus::Pending)
        .map(|a| a.installment_cents)
        .sum();

    PayrollSuggestions {
        absent_deduction_cents: daily_salary.multiply_count(summary.absent_days).cents(),
        late_deduction_cents: late_blocks * policy.late_block_rate_cents,
        advance_deduction_cents: advance_total,
    }
}

/// Builds a payroll for one employee and period.
///
/// ## Determinism
/// With identical inputs and no overrides, two runs produce identical
/// suggestions and identical net salary.
///
/// ## Errors
/// * `InvalidPeriod` - month outside 1..=12
/// * `Aggregation(NoWorkDaysInPeriod)` - the schedule yields zero work days
///   for the month, which would divide the salary by zero; aborts this
///   employee only
#[allow(clippy::too_many_arguments)]
pub fn build_payroll(
    employee: &Employee,
    year: i32,
    month: u32,
    records: &[AttendanceRecord],
    leaves: &[Leave],
    pending_advances: &[Advance],
    overrides: &PayrollOverrides,
    policy: &PayrollPolicy,
    now: DateTime<Utc>,
) -> CoreResult<Payroll> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::InvalidPeriod { month });
    }

    let total_work_days =
        timeclock::work_days_in_month(year, month, &employee.schedule.work_days)
            .ok_or(CoreError::InvalidPeriod { month })?;
    if total_work_days == 0 {
        return Err(AggregationError::NoWorkDaysInPeriod { month, year }.into());
    }

    let summary = summarize_attendance(employee, year, month, records, leaves, total_work_days);
    let suggestions = compute_suggestions(employee, &summary, pending_advances, policy);

    let mut earnings = Earnings {
        basic_salary_cents: employee.basic_salary_cents,
        allowances_cents: employee.allowances_cents,
        bonuses_cents: overrides.bonuses_cents.unwrap_or(0),
        overtime_pay_cents: overrides.overtime_pay_cents.unwrap_or(0),
        total_cents: 0,
    };

    // Asymmetric defaults: advance follows its suggestion, attendance
    // penalties wait for the operator.
    let mut deductions = Deductions {
        absent_deduction_cents: overrides.absent_deduction_cents.unwrap_or(0),
        late_deduction_cents: overrides.late_deduction_cents.unwrap_or(0),
        advance_deduction_cents: overrides
            .advance_deduction_cents
            .unwrap_or(suggestions.advance_deduction_cents),
        other_deductions_cents: overrides.other_deductions_cents.unwrap_or(0),
        total_cents: 0,
    };

    earnings.total_cents = earnings_total(&earnings);
    deductions.total_cents = deductions_total(&deductions);

    Ok(Payroll {
        id: Uuid::new_v4().to_string(),
        employee_id: employee.id.clone(),
        month,
        year,
        summary,
        suggestions,
        net_salary_cents: earnings.total_cents - deductions.total_cents,
        earnings,
        deductions,
        status: PayrollStatus::Pending,
        created_at: now,
        updated_at: now,
        paid_at: None,
    })
}

/// Applies an operator edit to a pending payroll and recomputes totals and
/// net salary from the full edited field set (not incrementally).
///
/// ## Errors
/// * `PayrollFrozen` - the payroll is already marked paid
pub fn apply_edit(
    payroll: &mut Payroll,
    edits: &PayrollOverrides,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    if !payroll.is_editable() {
        return Err(CoreError::PayrollFrozen {
            payroll_id: payroll.id.clone(),
        });
    }

    if let Some(v) = edits.bonuses_cents {
        payroll.earnings.bonuses_cents = v;
    }
    if let Some(v) = edits.overtime_pay_cents {
        payroll.earnings.overtime_pay_cents = v;
    }
    if let Some(v) = edits.absent_deduction_cents {
        payroll.deductions.absent_deduction_cents = v;
    }
    if let Some(v) = edits.late_deduction_cents {
        payroll.deductions.late_deduction_cents = v;
    }
    if let Some(v) = edits.advance_deduction_cents {
        payroll.deductions.advance_deduction_cents = v;
    }
    if let Some(v) = edits.other_deductions_cents {
        payroll.deductions.other_deductions_cents = v;
    }

    recompute_totals(payroll);
    payroll.updated_at = now;
    Ok(())
}

/// Recomputes both totals and the net from the full field set.
pub fn recompute_totals(payroll: &mut Payroll) {
    payroll.earnings.total_cents = earnings_total(&payroll.earnings);
    payroll.deductions.total_cents = deductions_total(&payroll.deductions);
    payroll.net_salary_cents = payroll.earnings.total_cents - payroll.deductions.total_cents;
}

fn earnings_total(e: &Earnings) -> i64 {
    e.basic_salary_cents + e.allowances_cents + e.bonuses_cents + e.overtime_pay_cents
}

fn deductions_total(d: &Deductions) -> i64 {
    d.absent_deduction_cents
        + d.late_deduction_cents
        + d.advance_deduction_cents
        + d.other_deductions_cents
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::build_check_in;
    use crate::types::{EmployeeStatus, EntryMethod, WorkSchedule};
    use chrono::{NaiveTime, TimeZone};

    fn employee() -> Employee {
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
            // August 2026 has 21 weekdays; 420_000 / 21 = 20_000 exactly
            basic_salary_cents: 420_000,
            allowances_cents: 30_000,
            status: EmployeeStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn local(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, day, hour - 2, minute, 0).unwrap()
    }

    /// A checked-in record for the given August 2026 weekday.
    fn record(emp: &Employee, day: u32, hour: u32, minute: u32) -> AttendanceRecord {
        build_check_in(
            emp,
            local(day, hour, minute),
            local(day, hour, minute),
            &emp.id,
            EntryMethod::SelfService,
            None,
        )
        .unwrap()
    }

    fn pending_advance(installment: i64) -> Advance {
        Advance {
            id: "adv-1".to_string(),
            employee_id: "emp-1".to_string(),
            amount_cents: installment * 4,
            installment_cents: installment,
            reason: None,
            status: AdvanceStatus::Pending,
            created_at: Utc::now(),
            applied_at: None,
        }
    }

    #[test]
    fn test_build_payroll_defaults() {
        let emp = employee();
        // Present two weekdays, one of them 20 minutes late
        let records = vec![record(&emp, 24, 9, 0), record(&emp, 25, 9, 20)];
        let advances = vec![pending_advance(10_000)];
        let policy = PayrollPolicy {
            late_block_minutes: 15,
            late_block_rate_cents: 500,
        };

        let payroll = build_payroll(
            &emp,
            2026,
            8,
            &records,
            &[],
            &advances,
            &PayrollOverrides::default(),
            &policy,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(payroll.summary.total_work_days, 21);
        assert_eq!(payroll.summary.present_days, 2);
        assert_eq!(payroll.summary.absent_days, 19);
        assert_eq!(payroll.summary.late_days, 1);
        assert_eq!(payroll.summary.total_late_minutes, 20);

        // daily salary 20_000; 19 absent days
        assert_eq!(payroll.suggestions.absent_deduction_cents, 380_000);
        // ceil(20/15) = 2 blocks × 500
        assert_eq!(payroll.suggestions.late_deduction_cents, 1_000);
        assert_eq!(payroll.suggestions.advance_deduction_cents, 10_000);

        // Suggestions are NOT auto-applied for absence/lateness...
        assert_eq!(payroll.deductions.absent_deduction_cents, 0);
        assert_eq!(payroll.deductions.late_deduction_cents, 0);
        // ...but the advance installment is.
        assert_eq!(payroll.deductions.advance_deduction_cents, 10_000);

        assert_eq!(payroll.earnings.total_cents, 450_000);
        assert_eq!(payroll.deductions.total_cents, 10_000);
        assert_eq!(payroll.net_salary_cents, 440_000);
        assert_eq!(payroll.status, PayrollStatus::Pending);
    }

    #[test]
    fn test_net_salary_is_exact_under_overrides() {
        let emp = employee();
        let overrides = PayrollOverrides {
            bonuses_cents: Some(12_345),
            overtime_pay_cents: Some(6_789),
            absent_deduction_cents: Some(20_000),
            late_deduction_cents: Some(1_500),
            advance_deduction_cents: Some(0),
            other_deductions_cents: Some(999),
        };

        let payroll = build_payroll(
            &emp,
            2026,
            8,
            &[],
            &[],
            &[],
            &overrides,
            &PayrollPolicy::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            payroll.net_salary_cents,
            payroll.earnings.total_cents - payroll.deductions.total_cents
        );
        assert_eq!(payroll.earnings.total_cents, 420_000 + 30_000 + 12_345 + 6_789);
        assert_eq!(payroll.deductions.total_cents, 20_000 + 1_500 + 999);
    }

    #[test]
    fn test_zero_work_days_aborts_aggregation() {
        let mut emp = employee();
        emp.schedule.work_days.clear();

        let err = build_payroll(
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
        .unwrap_err();

        assert!(matches!(
            err,
            CoreError::Aggregation(AggregationError::NoWorkDaysInPeriod { .. })
        ));
    }

    #[test]
    fn test_invalid_month_rejected() {
        let emp = employee();
        let err = build_payroll(
            &emp,
            2026,
            13,
            &[],
            &[],
            &[],
            &PayrollOverrides::default(),
            &PayrollPolicy::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPeriod { month: 13 }));
    }

    #[test]
    fn test_leave_days_exempt_from_absence() {
        let emp = employee();
        let leave = Leave {
            id: "l1".to_string(),
            employee_id: emp.id.clone(),
            // Mon 2026-08-10 .. Wed 2026-08-12, three work days
            start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 12).unwrap(),
            reason: Some("sick".to_string()),
            created_at: Utc::now(),
        };

        let payroll = build_payroll(
            &emp,
            2026,
            8,
            &[],
            &[leave],
            &[],
            &PayrollOverrides::default(),
            &PayrollPolicy::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(payroll.summary.leave_days, 3);
        assert_eq!(payroll.summary.absent_days, 18);
        // Suggestion excludes leave days: 18 × 20_000
        assert_eq!(payroll.suggestions.absent_deduction_cents, 360_000);
    }

    #[test]
    fn test_determinism_without_overrides() {
        let emp = employee();
        let records = vec![record(&emp, 24, 9, 20)];
        let advances = vec![pending_advance(5_000)];
        let policy = PayrollPolicy::default();
        let now = Utc::now();

        let a = build_payroll(
            &emp, 2026, 8, &records, &[], &advances,
            &PayrollOverrides::default(), &policy, now,
        )
        .unwrap();
        let b = build_payroll(
            &emp, 2026, 8, &records, &[], &advances,
            &PayrollOverrides::default(), &policy, now,
        )
        .unwrap();

        assert_eq!(a.suggestions, b.suggestions);
        assert_eq!(a.earnings, b.earnings);
        assert_eq!(a.deductions, b.deductions);
        assert_eq!(a.net_salary_cents, b.net_salary_cents);
    }

    #[test]
    fn test_apply_edit_recomputes_from_full_set() {
        let emp = employee();
        let mut payroll = build_payroll(
            &emp,
            2026,
            8,
            &[],
            &[],
            &[pending_advance(10_000)],
            &PayrollOverrides::default(),
            &PayrollPolicy::default(),
            Utc::now(),
        )
        .unwrap();

        let edits = PayrollOverrides {
            bonuses_cents: Some(50_000),
            absent_deduction_cents: Some(40_000),
            ..Default::default()
        };
        apply_edit(&mut payroll, &edits, Utc::now()).unwrap();

        assert_eq!(payroll.earnings.bonuses_cents, 50_000);
        assert_eq!(payroll.earnings.total_cents, 420_000 + 30_000 + 50_000);
        // Untouched advance deduction still in the total
        assert_eq!(payroll.deductions.total_cents, 40_000 + 10_000);
        assert_eq!(
            payroll.net_salary_cents,
            payroll.earnings.total_cents - payroll.deductions.total_cents
        );
    }

    #[test]
    fn test_paid_payroll_is_frozen() {
        let emp = employee();
        let mut payroll = build_payroll(
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
        payroll.status = PayrollStatus::Paid;

        let edits = PayrollOverrides {
            bonuses_cents: Some(1),
            ..Default::default()
        };
        let err = apply_edit(&mut payroll, &edits, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::PayrollFrozen { .. }));
        assert_eq!(payroll.earnings.bonuses_cents, 0);
    }
}
