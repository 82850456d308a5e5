//! # Earnings Service
//!
//! Per-employee sales and profit reporting over the read-only invoice feed.
//!
//! The invoice store is read broadly and the period/employee filtering
//! happens here in memory; the attribution math itself lives in
//! `crewpay_core::earnings`.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crewpay_core::earnings::{build_earnings_report, EmployeeEarningsReport};
use crewpay_core::timeclock::wall_clock_offset;
use crewpay_core::validation::{validate_month, validate_year};
use crewpay_core::CoreError;
use crewpay_db::Database;

use crate::error::{EngineError, EngineResult};

/// Request for an earnings report over an optional instant range.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EarningsReportRequest {
    pub employee_id: String,

    /// Inclusive lower bound; `None` means unbounded.
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,

    /// Exclusive upper bound; `None` means unbounded.
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
}

/// Sales and profit attribution reports.
#[derive(Clone)]
pub struct EarningsService {
    db: Database,
}

impl EarningsService {
    pub fn new(db: Database) -> Self {
        EarningsService { db }
    }

    /// Builds an earnings report for one employee over an instant range.
    pub async fn report(&self, req: EarningsReportRequest) -> EngineResult<EmployeeEarningsReport> {
        let employee = self
            .db
            .employees()
            .get_by_id(&req.employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Employee", &req.employee_id))?;

        let invoices: Vec<_> = self
            .db
            .invoices()
            .list_all()
            .await?
            .into_iter()
            .filter(|inv| req.from.map_or(true, |from| inv.date >= from))
            .filter(|inv| req.to.map_or(true, |to| inv.date < to))
            .collect();

        debug!(
            employee_id = %employee.id,
            invoices = invoices.len(),
            "Building earnings report"
        );

        Ok(build_earnings_report(&employee.id, &invoices))
    }

    /// Builds an earnings report for one employee and calendar month.
    ///
    /// Month boundaries are taken at the fixed wall clock, so an invoice
    /// sold late on the last local evening of the month stays in it.
    pub async fn report_for_month(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> EngineResult<EmployeeEarningsReport> {
        validate_month(month).map_err(CoreError::from)?;
        validate_year(year).map_err(CoreError::from)?;

        let (from, to) = month_bounds(year, month);
        self.report(EarningsReportRequest {
            employee_id: employee_id.to_string(),
            from: Some(from),
            to: Some(to),
        })
        .await
    }
}

/// The [start, end) instant range of a local calendar month.
///
/// Callers validate `month` into 1..=12 first.
fn month_bounds(year: i32, month: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("month validated to 1..=12");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    };

    let offset = wall_clock_offset();
    let start = offset
        .from_local_datetime(&first.and_hms_opt(0, 0, 0).unwrap())
        .single()
        .expect("fixed offset times are unambiguous")
        .with_timezone(&Utc);
    let end = offset
        .from_local_datetime(&next.and_hms_opt(0, 0, 0).unwrap())
        .single()
        .expect("fixed offset times are unambiguous")
        .with_timezone(&Utc);
    (start, end)
}

// =============================================================================
// Integration Tests
// =============================================================================
