//! # crewpay-core: Pure Business Logic for CrewPay
//!
//! This crate is the **heart** of CrewPay. It contains the attendance state
//! machine, the payroll aggregation engine and the earnings attribution
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CrewPay Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 crewpay-engine (Orchestration)                  │   │
//! │  │   AttendanceService ── PayrollService ── EarningsService        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ crewpay-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌─────────┐ ┌───────┐│   │
//! │  │  │timeclock │ │attendance│ │  payroll  │ │earnings │ │ money ││   │
//! │  │  │ lateness │ │  check   │ │ aggregate │ │ profit  │ │ cents ││   │
//! │  │  │ overtime │ │  in/out  │ │  suggest  │ │ shares  │ │  i64  ││   │
//! │  │  └──────────┘ └──────────┘ └───────────┘ └─────────┘ └───────┘│   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   crewpay-db (Database Layer)                   │   │
//! │  │          SQLite repositories, migrations, audit log             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Employee, AttendanceRecord, Payroll, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`timeclock`] - Fixed-offset wall clock, lateness/overtime primitives
//! - [`attendance`] - Check-in/check-out state machine
//! - [`payroll`] - Monthly payroll aggregation and suggestions
//! - [`earnings`] - Per-employee sales and profit attribution
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Callers pass in `now`; nothing here reads a clock
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveTime;
//! use chrono::{TimeZone, Utc};
//! use crewpay_core::timeclock;
//!
//! // 2026-08-24 09:20 local (UTC+2), against a 09:00 start and a
//! // 15-minute grace period
//! let arrival = Utc.with_ymd_and_hms(2026, 8, 24, 7, 20, 0).unwrap();
//! let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
//! let result = timeclock::late_minutes(start, arrival, 15);
//!
//! // Past the grace window, lateness counts from the scheduled start
//! assert!(result.late);
//! assert_eq!(result.late_minutes, 20);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod attendance;
pub mod earnings;
pub mod error;
pub mod money;
pub mod payroll;
pub mod timeclock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use crewpay_core::Money` instead of
// `use crewpay_core::money::Money`

pub use error::{AggregationError, CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default grace period in minutes for new employee schedules.
///
/// ## Business Reason
/// Arrivals within this window after the scheduled start are recorded as
/// grace-used but not late. Overridable per employee.
pub const DEFAULT_GRACE_PERIOD_MINUTES: i64 = 15;

/// Default suggested charge per started 15-minute late block, in cents.
///
/// ## Business Reason
/// Feeds the late-deduction suggestion only; nothing is deducted until an
/// operator applies it.
pub const DEFAULT_LATE_BLOCK_RATE_CENTS: i64 = 500;
