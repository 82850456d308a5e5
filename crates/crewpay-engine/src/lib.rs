//! # CrewPay Engine
//!
//! Orchestration layer wiring `crewpay-core`'s pure business logic to
//! `crewpay-db`'s persistence.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         crewpay-engine                                  │
//! │                                                                         │
//! │  ┌────────────────────┐ ┌────────────────────┐ ┌────────────────────┐  │
//! │  │ AttendanceService  │ │  PayrollService    │ │  EarningsService   │  │
//! │  │ ────────────────── │ │ ────────────────── │ │ ────────────────── │  │
//! │  │ check_in           │ │ generate           │ │ report             │  │
//! │  │ check_out          │ │ generate_batch     │ │ report_for_month   │  │
//! │  │ day_status         │ │ update / mark_paid │ │                    │  │
//! │  └─────────┬──────────┘ └─────────┬──────────┘ └─────────┬──────────┘  │
//! │            │                      │                      │             │
//! │            ▼                      ▼                      ▼             │
//! │       crewpay-core (decisions)      crewpay-db (storage)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every service method returns [`EngineResult`]; the serialized
//! [`EngineError`] shape is what embedding frontends display.
//!
//! ## Example
//! ```no_run
//! use crewpay_db::{Database, DbConfig};
//! use crewpay_engine::services::attendance::{AttendanceService, CheckInRequest};
//! use crewpay_core::EntryMethod;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DbConfig::new("./crewpay.db")).await?;
//! let attendance = AttendanceService::new(db);
//!
//! let record = attendance
//!     .check_in(CheckInRequest {
//!         employee_id: "…".to_string(),
//!         instant: None, // self-service "now"
//!         recorded_by: "…".to_string(),
//!         entry_method: EntryMethod::SelfService,
//!     })
//!     .await?;
//! println!("late: {}", record.check_in.late);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod services;
pub mod telemetry;

pub use error::{EngineError, EngineResult, ErrorCode};
pub use services::attendance::AttendanceService;
pub use services::earnings::EarningsService;
pub use services::payroll::PayrollService;
