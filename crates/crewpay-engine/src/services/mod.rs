//! # Engine Services
//!
//! One service per domain area, each holding a cloned [`Database`] handle:
//!
//! - [`attendance::AttendanceService`] - check-in/check-out/day status
//! - [`payroll::PayrollService`] - generation, edits, payment, batch runs
//! - [`earnings::EarningsService`] - per-employee sales/profit reports
//!
//! ## The Load → Decide → Persist Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. LOAD     repositories read broadly (per employee, not per period)  │
//! │  2. DECIDE   crewpay-core pure functions make every business decision  │
//! │  3. PERSIST  conditional writes keep concurrent callers honest         │
//! │  4. AUDIT    best-effort append; never fails the operation             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crewpay_core::AuditEntry;
use crewpay_db::Database;

pub mod attendance;
pub mod earnings;
pub mod payroll;

/// Appends an audit entry, swallowing failures.
///
/// The mutation being audited has already committed; a logging problem
/// must not turn a successful operation into an error.
pub(crate) async fn audit(
    db: &Database,
    category: &str,
    action: &str,
    description: String,
    target: &str,
    performed_by: &str,
) {
    let entry = AuditEntry {
        id: Uuid::new_v4().to_string(),
        category: category.to_string(),
        action: action.to_string(),
        description,
        target: target.to_string(),
        performed_by: performed_by.to_string(),
        created_at: Utc::now(),
    };

    if let Err(e) = db.audit_log().append(&entry).await {
        warn!(category, action, error = %e, "Audit append failed; continuing");
    }
}
