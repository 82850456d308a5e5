//! # Repository Module
//!
//! Database repository implementations for CrewPay.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine Service                                                        │
//! │       │                                                                 │
//! │       │  db.attendance().get_for_day(employee_id, date)                │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  AttendanceRepository                                                  │
//! │  ├── insert(&self, record)                                             │
//! │  ├── get_for_day(&self, employee_id, date)                             │
//! │  ├── complete_check_out(&self, record)                                 │
//! │  └── list_for_employee(&self, employee_id)                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories read broadly (per employee, not per period); period      │
//! │  filtering is the engine's job and happens in memory.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`employee::EmployeeRepository`] - Employee CRUD and soft delete
//! - [`attendance::AttendanceRepository`] - Check-in/check-out persistence
//! - [`ledger::AdvanceRepository`] - Advances and their lifecycle
//! - [`ledger::DeductionRepository`] - Independent deduction entries
//! - [`ledger::LeaveRepository`] - Leave ranges
//! - [`payroll::PayrollRepository`] - Payroll settlements
//! - [`invoice::InvoiceRepository`] - Read-only invoice access (plus seeding)
//! - [`audit::AuditLogRepository`] - Append-only audit log

pub mod attendance;
pub mod audit;
pub mod employee;
pub mod invoice;
pub mod ledger;
pub mod payroll;
