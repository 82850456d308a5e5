//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a payroll system that would mean:                                   │
//! │    netSalary != earnings.total - deductions.total  → audit findings    │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Salaries, advances, deductions and invoice amounts are all i64       │
//! │    cents, so net salary is exact by construction.                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use crewpay_core::money::Money;
//!
//! // Create from cents (preferred)
//! let salary = Money::from_cents(250_000); // $2,500.00
//!
//! // Arithmetic operations
//! let with_allowance = salary + Money::from_cents(20_000);
//! assert_eq!(with_allowance.cents(), 270_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for corrections and net results
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money flows
/// ```text
/// Employee.basic_salary ──► dailySalary ──► absentDeduction suggestion
/// Advance.installment   ──► advanceDeduction suggestion
/// Invoice.discount      ──► allocate_share ──► per-employee service profit
/// earnings.total − deductions.total ──► netSalary (exact)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use crewpay_core::money::Money;
    ///
    /// let rate = Money::from_cents(1099); // $10.99
    /// assert_eq!(rate.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Allocates a proportional share of this amount: `self × part / whole`.
    ///
    /// This is the primitive behind discount attribution: a per-invoice
    /// discount is split across contributors in proportion to their share of
    /// the relevant base (invoice subtotal or services total).
    ///
    /// ## Implementation
    /// i128 intermediate arithmetic with half-up rounding
    /// (`+ whole/2` before the division), so large invoices cannot overflow
    /// and cents round predictably.
    ///
    /// ## Edge Cases
    /// - `whole <= 0` → zero (nothing to apportion against)
    /// - `part <= 0`  → zero (no contribution, no share)
    ///
    /// ## Example
    /// ```rust
    /// use crewpay_core::money::Money;
    ///
    /// // $100 discount, employee services are $200 of a $1,000 subtotal
    /// let discount = Money::from_cents(100_00);
    /// let share = discount.allocate_share(200_00, 1000_00);
    /// assert_eq!(share.cents(), 20_00);
    /// ```
    pub fn allocate_share(&self, part_cents: i64, whole_cents: i64) -> Money {
        if whole_cents <= 0 || part_cents <= 0 {
            return Money::zero();
        }
        let share = (self.0 as i128 * part_cents as i128 + whole_cents as i128 / 2)
            / whole_cents as i128;
        Money::from_cents(share as i64)
    }

    /// Multiplies money by an integer count (e.g., daily salary × absent days).
    #[inline]
    pub const fn multiply_count(&self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. Use frontend formatting for actual UI
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for day/block counts).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_allocate_share_both_mode_example() {
        // $100 discount on a $1,000 invoice where the employee's services
        // total $200: allocated share is $20
        let discount = Money::from_cents(100_00);
        let share = discount.allocate_share(200_00, 1000_00);
        assert_eq!(share.cents(), 20_00);
    }

    #[test]
    fn test_allocate_share_rounding() {
        // $10.00 split by a 1/3 contribution = $3.33, rounded half-up
        let discount = Money::from_cents(1000);
        let share = discount.allocate_share(100, 300);
        assert_eq!(share.cents(), 333);

        // Half-up: $10.00 × 1/2000 = 0.5 cents → 1 cent
        let share = Money::from_cents(1000).allocate_share(1, 2000);
        assert_eq!(share.cents(), 1);
    }

    #[test]
    fn test_allocate_share_degenerate_bases() {
        let discount = Money::from_cents(1000);
        assert_eq!(discount.allocate_share(100, 0).cents(), 0);
        assert_eq!(discount.allocate_share(100, -5).cents(), 0);
        assert_eq!(discount.allocate_share(0, 100).cents(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    #[test]
    fn test_multiply_count() {
        // daily salary × 3 absent days
        let daily = Money::from_cents(11538);
        assert_eq!(daily.multiply_count(3).cents(), 34614);
    }
}
