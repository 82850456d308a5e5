//! # Domain Types
//!
//! Core domain types used throughout CrewPay.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────┐      │
//! │  │    Employee     │   │ AttendanceRecord │   │    Payroll      │      │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────  │      │
//! │  │  id (UUID)      │   │  (employee,date) │   │ (employee,      │      │
//! │  │  code (business)│   │  check_in        │   │  month, year)   │      │
//! │  │  schedule       │   │  check_out?      │   │  earnings       │      │
//! │  │  salary (cents) │   │  calculations?   │   │  deductions     │      │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────┘      │
//! │                                                                         │
//! │  Ledger entries: Advance, Deduction, Leave                              │
//! │  External (read-only): Invoice + items/services/summary                 │
//! │  Collaborator shape: AuditEntry                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key: (code) or (employee_id, date) or (employee_id, month,
//!   year) - enforced by UNIQUE constraints at the storage layer

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::timeclock::WorkHours;

// =============================================================================
// Work Days & Schedule
// =============================================================================

/// A calendar weekday explicitly included in an employee's working-days set.
///
/// Stored as lowercase weekday names; the membership test runs against the
/// fixed-offset calendar, never the host locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum WorkDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WorkDay {
    /// Maps a chrono weekday onto the domain enum.
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => WorkDay::Monday,
            Weekday::Tue => WorkDay::Tuesday,
            Weekday::Wed => WorkDay::Wednesday,
            Weekday::Thu => WorkDay::Thursday,
            Weekday::Fri => WorkDay::Friday,
            Weekday::Sat => WorkDay::Saturday,
            Weekday::Sun => WorkDay::Sunday,
        }
    }

    /// Lowercase name, the persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkDay::Monday => "monday",
            WorkDay::Tuesday => "tuesday",
            WorkDay::Wednesday => "wednesday",
            WorkDay::Thursday => "thursday",
            WorkDay::Friday => "friday",
            WorkDay::Saturday => "saturday",
            WorkDay::Sunday => "sunday",
        }
    }

    /// Parses a lowercase weekday name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "monday" => Some(WorkDay::Monday),
            "tuesday" => Some(WorkDay::Tuesday),
            "wednesday" => Some(WorkDay::Wednesday),
            "thursday" => Some(WorkDay::Thursday),
            "friday" => Some(WorkDay::Friday),
            "saturday" => Some(WorkDay::Saturday),
            "sunday" => Some(WorkDay::Sunday),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An employee's configured work schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WorkSchedule {
    /// Scheduled shift start, local time-of-day at the fixed offset.
    #[ts(as = "String")]
    pub start_time: NaiveTime,

    /// Scheduled shift end, local time-of-day at the fixed offset.
    #[ts(as = "String")]
    pub end_time: NaiveTime,

    /// The set of weekdays the employee works.
    pub work_days: Vec<WorkDay>,

    /// Minutes after `start_time` during which arrival is not "late"
    /// but is still recorded as grace-used.
    pub grace_period_minutes: i64,
}

impl WorkSchedule {
    /// Checks whether a weekday is part of the schedule.
    pub fn includes(&self, day: WorkDay) -> bool {
        self.work_days.contains(&day)
    }
}

// =============================================================================
// Employee
// =============================================================================

/// Whether an employee is active (soft delete flips this, never removes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

/// An employee of the shop.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Employee {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code shown on invoices and reports.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Configured work schedule.
    pub schedule: WorkSchedule,

    /// Monthly basic salary in cents.
    pub basic_salary_cents: i64,

    /// Monthly allowances in cents.
    pub allowances_cents: i64,

    /// Active/inactive status. Inactive employees keep their history but
    /// cannot check in and are skipped by payroll batches.
    pub status: EmployeeStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Checks whether the employee can clock in and be paid.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

// =============================================================================
// Attendance
// =============================================================================

/// Persisted per-day attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    OnLeave,
}

/// How the clock event's instant was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntryMethod {
    /// Employee pressed the clock button; the instant is "now".
    SelfService,
    /// An operator entered an explicit (possibly past) instant.
    Operator,
}

/// The per-day progression, derived at read time.
///
/// `Completed` is not a persisted field: it means `check_out` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    NotCheckedIn,
    CheckedIn,
    Completed,
}

/// The check-in half of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckIn {
    #[ts(as = "String")]
    pub time: DateTime<Utc>,
    pub late: bool,
    pub late_minutes: i64,
    pub grace_period_used: bool,
    pub grace_minutes_used: i64,
}

/// The check-out half of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckOut {
    #[ts(as = "String")]
    pub time: DateTime<Utc>,
    pub early: bool,
    pub early_minutes: i64,
    /// Shift-overrun minutes past the scheduled end. Coexists with the
    /// 8-hour-cap overtime in `calculations`.
    pub overtime_minutes: i64,
}

/// One employee's attendance for one calendar day.
///
/// ## Invariants
/// - At most one record per (employee_id, date), enforced by a UNIQUE
///   constraint at the storage layer
/// - `check_out.time` strictly after `check_in.time`
/// - `check_out` absent until `check_in` present (a record only exists once
///   the employee has checked in)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,

    /// Calendar date at the fixed wall clock.
    #[ts(as = "String")]
    pub date: NaiveDate,

    pub check_in: CheckIn,
    pub check_out: Option<CheckOut>,

    /// Actual-hours block, computed at check-out time.
    pub calculations: Option<WorkHours>,

    pub status: AttendanceStatus,

    /// Who recorded the event (employee or operator user id).
    pub recorded_by: String,
    pub entry_method: EntryMethod,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// The day's progression, derived from which halves are present.
    pub fn state(&self) -> AttendanceState {
        if self.check_out.is_some() {
            AttendanceState::Completed
        } else {
            AttendanceState::CheckedIn
        }
    }
}

// =============================================================================
// Ledger Entries: Advance, Deduction, Leave
// =============================================================================

/// Lifecycle of a salary advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AdvanceStatus {
    /// Waiting to be consumed by the next payroll cycle.
    Pending,
    /// Consumed by a payroll run; kept for history, never deleted.
    Applied,
}

/// A salary advance with a per-cycle installment amount.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Advance {
    pub id: String,
    pub employee_id: String,

    /// Total advanced amount in cents.
    pub amount_cents: i64,

    /// Amount deducted per payroll cycle in cents.
    pub installment_cents: i64,

    pub reason: Option<String>,
    pub status: AdvanceStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub applied_at: Option<DateTime<Utc>>,
}

/// Category of an independent deduction ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DeductionKind {
    Penalty,
    Advance,
    Other,
}

/// An independent deduction ledger entry.
///
/// Never netted into a payroll automatically; an operator maps it into the
/// payroll's `other_deductions` explicitly if at all.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Deduction {
    pub id: String,
    pub employee_id: String,
    pub kind: DeductionKind,
    pub amount_cents: i64,
    pub description: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A single- or ranged-day absence exempt from absence-deduction math.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Leave {
    pub id: String,
    pub employee_id: String,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Leave {
    /// Checks whether the leave covers a calendar day (inclusive range).
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// =============================================================================
// Payroll
// =============================================================================

/// Payroll lifecycle: editable while pending, frozen once paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    Pending,
    Paid,
}

/// Attendance statistics snapshot embedded in a payroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AttendanceSummary {
    pub total_work_days: i64,
    pub present_days: i64,
    /// Work days with neither a record nor a covering leave.
    pub absent_days: i64,
    /// Work days covered by a leave entry (exempt from absence math).
    pub leave_days: i64,
    pub late_days: i64,
    pub total_late_minutes: i64,
    pub total_overtime_minutes: i64,
    pub total_work_hours: f64,
}

/// System-computed deduction suggestions.
///
/// The system proposes these; it never applies attendance-based penalties on
/// its own (see [`Deductions`] defaults).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PayrollSuggestions {
    pub absent_deduction_cents: i64,
    pub late_deduction_cents: i64,
    pub advance_deduction_cents: i64,
}

/// Itemized earnings. `bonuses` and `overtime_pay` are manual entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Earnings {
    pub basic_salary_cents: i64,
    pub allowances_cents: i64,
    pub bonuses_cents: i64,
    pub overtime_pay_cents: i64,
    pub total_cents: i64,
}

/// Itemized deductions, each independently overridable.
///
/// Defaulting is deliberately asymmetric: `advance_deduction` defaults to
/// its computed suggestion, while `absent_deduction` and `late_deduction`
/// default to 0 until an operator applies them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Deductions {
    pub absent_deduction_cents: i64,
    pub late_deduction_cents: i64,
    pub advance_deduction_cents: i64,
    pub other_deductions_cents: i64,
    pub total_cents: i64,
}

/// One employee's payroll settlement for one (month, year).
///
/// At most one per (employee_id, month, year), enforced by a UNIQUE
/// constraint at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payroll {
    pub id: String,
    pub employee_id: String,
    pub month: u32,
    pub year: i32,

    pub summary: AttendanceSummary,
    pub suggestions: PayrollSuggestions,
    pub earnings: Earnings,
    pub deductions: Deductions,

    /// Always exactly `earnings.total_cents - deductions.total_cents`.
    pub net_salary_cents: i64,

    pub status: PayrollStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Payroll {
    /// Checks whether the payroll can still be edited.
    #[inline]
    pub fn is_editable(&self) -> bool {
        self.status == PayrollStatus::Pending
    }
}

// =============================================================================
// Invoice (external, read-only)
// =============================================================================

/// Who sold the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SoldBy {
    pub employee_id: String,
    pub employee_code: String,
}

/// A product line on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceItem {
    pub price_cents: i64,
    pub quantity: i64,
}

/// A service line on an invoice, attributed to the performing employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceService {
    pub employee_id: String,
    pub employee_code: String,
    pub amount_cents: i64,
    pub description: Option<String>,
}

/// Per-invoice policy selecting what a discount is allocated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountApplyMode {
    Products,
    Services,
    Both,
}

/// How the discount value was expressed at the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

/// An invoice-level discount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDiscount {
    /// Resolved discount amount in cents (already computed at the till).
    pub amount_cents: i64,
    pub apply_mode: DiscountApplyMode,
    pub kind: DiscountKind,
    /// The raw entered value (percentage points or cents, per `kind`).
    pub value: f64,
}

/// Invoice totals, precomputed by the point of sale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceSummary {
    pub subtotal_cents: i64,
    pub services_total_cents: i64,
    pub products_subtotal_cents: i64,
    pub discount: Option<InvoiceDiscount>,
    pub total_cents: i64,
    /// Product profit before discount allocation, when known.
    pub products_profit_cents: Option<i64>,
    /// Product profit after discount allocation, when known. Preferred.
    pub final_products_profit_cents: Option<i64>,
    /// Items whose purchase price is unknown; makes reported profit a
    /// lower bound rather than an error.
    pub items_without_purchase_price: i64,
    pub profit_items_count: i64,
}

/// A point-of-sale invoice. External data, read-only in this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub sold_by: SoldBy,
    pub items: Vec<InvoiceItem>,
    pub services: Vec<InvoiceService>,
    pub summary: InvoiceSummary,
    pub payment_method: String,
}

impl Invoice {
    /// Sum of this employee's service lines on the invoice.
    pub fn employee_services_total(&self, employee_id: &str) -> i64 {
        self.services
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .map(|s| s.amount_cents)
            .sum()
    }

    /// Whether the employee performed any service on this invoice.
    pub fn has_employee_service(&self, employee_id: &str) -> bool {
        self.services.iter().any(|s| s.employee_id == employee_id)
    }

    /// The best available product-profit figure: the discount-adjusted
    /// final value when present, otherwise the raw one.
    pub fn best_products_profit(&self) -> Option<i64> {
        self.summary
            .final_products_profit_cents
            .or(self.summary.products_profit_cents)
    }
}

// =============================================================================
// Audit Log
// =============================================================================

/// One append-only audit log entry.
///
/// Written after every successful mutation; a failed append is reported and
/// swallowed, never blocking the primary state transition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AuditEntry {
    pub id: String,
    pub category: String,
    pub action: String,
    pub description: String,
    pub target: String,
    pub performed_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
