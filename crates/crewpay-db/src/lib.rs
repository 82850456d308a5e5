//! # crewpay-db: Database Layer for CrewPay
//!
//! This crate provides database access for the CrewPay system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CrewPay Data Flow                                │
//! │                                                                         │
//! │  Engine Service (check_in, generate_payroll, ...)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     crewpay-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ EmployeeRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ AttendanceRepo│    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ PayrollRepo   │    │ ...          │  │   │
//! │  │   │ Management    │    │ AuditLogRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (crewpay.db, WAL mode)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crewpay_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/crewpay.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let employees = db.employees().list_active().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::attendance::AttendanceRepository;
pub use repository::audit::AuditLogRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::ledger::{AdvanceRepository, DeductionRepository, LeaveRepository};
pub use repository::payroll::PayrollRepository;
