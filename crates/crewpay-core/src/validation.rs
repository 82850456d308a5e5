//! # Input Validation
//!
//! Early validation helpers, run before business logic. Each function
//! returns a `ValidationError` naming the offending field so the caller
//! can surface it directly.

use uuid::Uuid;

use crate::error::ValidationError;

/// Convenience alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for employee business codes.
pub const MAX_CODE_LENGTH: usize = 50;

/// Maximum length for employee display names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Validates an employee business code: non-empty, bounded, and limited to
/// alphanumerics, hyphens and underscores.
pub fn validate_employee_code(code: &str) -> ValidationResult<()> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }
    if trimmed.len() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "only letters, digits, '-' and '_' are allowed".to_string(),
        });
    }
    Ok(())
}

/// Validates an employee display name: non-empty and bounded.
pub fn validate_employee_name(name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates a payroll month (1..=12).
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }
    Ok(())
}

/// Validates a payroll year (sanity bounds, not a business rule).
pub fn validate_year(year: i32) -> ValidationResult<()> {
    if !(2000..=2100).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 2000,
            max: 2100,
        });
    }
    Ok(())
}

/// Validates a monetary amount in cents: must not be negative.
pub fn validate_amount_cents(field: &str, amount_cents: i64) -> ValidationResult<()> {
    if amount_cents < 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a grace period (minutes, 0..=240).
pub fn validate_grace_period(minutes: i64) -> ValidationResult<()> {
    if !(0..=240).contains(&minutes) {
        return Err(ValidationError::OutOfRange {
            field: "grace_period_minutes".to_string(),
            min: 0,
            max: 240,
        });
    }
    Ok(())
}

/// Validates that a work-day set is non-empty.
///
/// An empty set would make every day a non-work day and divide the salary
/// by zero at payroll time.
pub fn validate_work_days<T>(work_days: &[T]) -> ValidationResult<()> {
    if work_days.is_empty() {
        return Err(ValidationError::Required {
            field: "work_days".to_string(),
        });
    }
    Ok(())
}

/// Validates a UUID string.
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<()> {
    Uuid::parse_str(value).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
