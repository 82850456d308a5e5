//! # Error Types
//!
//! Domain-specific error types for crewpay-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  crewpay-core errors (this file)                                       │
//! │  ├── CoreError         - Business rule violations                      │
//! │  ├── ValidationError   - Input validation failures                     │
//! │  └── AggregationError  - Payroll aggregation failures (per employee)   │
//! │                                                                         │
//! │  crewpay-db errors (separate crate)                                    │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  Engine errors (crewpay-engine)                                        │
//! │  └── EngineError       - What callers see (serialized)                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → EngineError → Caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (employee ID, date, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages. None of
/// them is retried automatically.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Employee exists but is inactive (soft-deleted).
    ///
    /// ## When This Occurs
    /// - Check-in attempted for a deactivated employee
    /// - Payroll generation for a deactivated employee
    #[error("Employee {0} is inactive")]
    EmployeeInactive(String),

    /// The date is not one of the employee's configured work days.
    ///
    /// ## User Workflow
    /// ```text
    /// Check In (Sunday)
    ///      │
    ///      ▼
    /// schedule.work_days = [monday..friday]
    ///      │
    ///      ▼
    /// NotAWorkDay { employee_id, date: 2026-08-23 }
    ///      │
    ///      ▼
    /// UI shows: "2026-08-23 is not a work day for this employee"
    /// ```
    #[error("{date} is not a work day for employee {employee_id}")]
    NotAWorkDay {
        employee_id: String,
        date: NaiveDate,
    },

    /// A check-in already exists for this (employee, date).
    ///
    /// At most one check-in/check-out pair is allowed per day. A duplicate
    /// check-in is rejected and the first record is left untouched.
    #[error("Employee {employee_id} already checked in on {date}")]
    AlreadyCheckedIn {
        employee_id: String,
        date: NaiveDate,
    },

    /// Check-out attempted without a prior check-in.
    #[error("Employee {employee_id} has not checked in on {date}")]
    NotCheckedIn {
        employee_id: String,
        date: NaiveDate,
    },

    /// The day's record is already completed.
    #[error("Employee {employee_id} already checked out on {date}")]
    AlreadyCheckedOut {
        employee_id: String,
        date: NaiveDate,
    },

    /// Check-out instant is not strictly after the check-in instant.
    /// Equal instants are rejected too.
    #[error("Check-out on {date} must be strictly after check-in")]
    CheckOutNotAfterCheckIn { date: NaiveDate },

    /// Payroll is marked paid and can no longer be edited.
    #[error("Payroll {payroll_id} is paid and frozen")]
    PayrollFrozen { payroll_id: String },

    /// Month outside 1..=12 (or an otherwise impossible period).
    #[error("Invalid payroll period: month {month}")]
    InvalidPeriod { month: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Aggregation error (wraps AggregationError).
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid time).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Aggregation Error
// =============================================================================

/// Payroll aggregation errors.
///
/// An aggregation error aborts the computation for that employee only; in a
/// batch run, sibling employees are unaffected.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Employee could not be loaded for aggregation.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    /// The employee's work-day set produces zero work days in the period,
    /// which would divide the basic salary by zero.
    #[error("No work days in period {month}/{year}")]
    NoWorkDaysInPeriod { month: u32, year: i32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AlreadyCheckedIn {
            employee_id: "emp-1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Employee emp-1 already checked in on 2026-08-24"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        };
        assert_eq!(err.to_string(), "month must be between 1 and 12");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_aggregation_converts_to_core_error() {
        let agg_err = AggregationError::NoWorkDaysInPeriod {
            month: 2,
            year: 2026,
        };
        let core_err: CoreError = agg_err.into();
        assert!(matches!(core_err, CoreError::Aggregation(_)));
    }
}
