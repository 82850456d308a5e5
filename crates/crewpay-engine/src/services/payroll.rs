//! # Payroll Service
//!
//! Payroll generation, edits, payment and batch runs.
//!
//! ## Generation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  generate(employee, month, year, overrides)                             │
//! │    1. validate period                                                   │
//! │    2. load employee                    ── NOT_FOUND / inactive rejected │
//! │    3. broad reads: attendance, leaves, pending advances                 │
//! │       (month filtering happens HERE, in memory, never in SQL)           │
//! │    4. build_payroll (pure)                                              │
//! │    5. insert                           ── UNIQUE(employee,month,year)   │
//! │    6. mark consumed advances applied   ── conditional, races warn only  │
//! │    7. audit (best-effort)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Batch runs isolate failures: one employee's aggregation error is
//! reported for that employee and never aborts the siblings.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;

use crewpay_core::payroll::{apply_edit, build_payroll, PayrollOverrides, PayrollPolicy};
use crewpay_core::validation::{validate_month, validate_year};
use crewpay_core::{CoreError, Payroll};
use crewpay_db::Database;

use crate::error::{EngineError, EngineResult};
use crate::services::audit;

/// Request to generate one employee's payroll for a period.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayrollRequest {
    pub employee_id: String,
    pub month: u32,
    pub year: i32,

    /// Operator overrides; defaults apply where `None`.
    #[serde(default)]
    pub overrides: PayrollOverrides,

    pub performed_by: String,
}

/// Request to edit a pending payroll.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayrollRequest {
    pub payroll_id: String,
    pub edits: PayrollOverrides,
    pub performed_by: String,
}

/// One employee's failure in a batch run.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub employee_id: String,
    pub employee_code: String,
    pub error: EngineError,
}

/// Outcome of a batch generation run.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub payrolls: Vec<Payroll>,
    pub failures: Vec<BatchFailure>,
}

/// Payroll lifecycle operations.
#[derive(Clone)]
pub struct PayrollService {
    db: Database,
    policy: PayrollPolicy,
}

impl PayrollService {
    pub fn new(db: Database) -> Self {
        PayrollService {
            db,
            policy: PayrollPolicy::default(),
        }
    }

    /// Overrides the default lateness-charging policy.
    pub fn with_policy(db: Database, policy: PayrollPolicy) -> Self {
        PayrollService { db, policy }
    }

    /// Generates a payroll for one employee and period.
    pub async fn generate(&self, req: GeneratePayrollRequest) -> EngineResult<Payroll> {
        validate_month(req.month).map_err(CoreError::from)?;
        validate_year(req.year).map_err(CoreError::from)?;

        let employee = self
            .db
            .employees()
            .get_by_id(&req.employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Employee", &req.employee_id))?;
        if !employee.is_active() {
            return Err(CoreError::EmployeeInactive(employee.id).into());
        }

        if self
            .db
            .payrolls()
            .get_for_period(&req.employee_id, req.month, req.year)
            .await?
            .is_some()
        {
            return Err(EngineError::business(format!(
                "Payroll already exists for {} in {}/{}",
                employee.code, req.month, req.year
            )));
        }

        // Broad reads; the period filter lives here, not in SQL.
        let records: Vec<_> = self
            .db
            .attendance()
            .list_for_employee(&req.employee_id)
            .await?
            .into_iter()
            .filter(|r| r.date.year() == req.year && r.date.month() == req.month)
            .collect();
        let leaves = self.db.leaves().list_for_employee(&req.employee_id).await?;
        let pending_advances = self
            .db
            .advances()
            .list_pending_for_employee(&req.employee_id)
            .await?;

        let now = Utc::now();
        let payroll = build_payroll(
            &employee,
            req.year,
            req.month,
            &records,
            &leaves,
            &pending_advances,
            &req.overrides,
            &self.policy,
            now,
        )?;

        // A concurrent generation for the same period loses to the
        // UNIQUE(employee_id, month, year) constraint here.
        self.db.payrolls().insert(&payroll).await?;

        // Advances are consumed exactly once. A lost conditional write means
        // a concurrent run already applied it; the installment is still in
        // this payroll's deduction, which the operator can zero via update.
        if payroll.deductions.advance_deduction_cents > 0 {
            for advance in &pending_advances {
                if let Err(e) = self.db.advances().mark_applied(&advance.id, now).await {
                    warn!(
                        advance_id = %advance.id,
                        error = %e,
                        "Advance was not pending anymore; skipping"
                    );
                }
            }
        }

        info!(
            employee_id = %employee.id,
            month = req.month,
            year = req.year,
            net_salary_cents = payroll.net_salary_cents,
            "Payroll generated"
        );

        audit(
            &self.db,
            "payroll",
            "generate",
            format!(
                "Payroll for {} {}/{}: net {} cents",
                employee.name, req.month, req.year, payroll.net_salary_cents
            ),
            &payroll.id,
            &req.performed_by,
        )
        .await;

        Ok(payroll)
    }

    /// Generates payrolls for every active employee in the period.
    ///
    /// One employee's failure is recorded and the run continues.
    pub async fn generate_batch(
        &self,
        month: u32,
        year: i32,
        performed_by: &str,
    ) -> EngineResult<BatchResult> {
        validate_month(month).map_err(CoreError::from)?;
        validate_year(year).map_err(CoreError::from)?;

        let employees = self.db.employees().list_active().await?;
        let mut payrolls = Vec::new();
        let mut failures = Vec::new();

        for employee in employees {
            let result = self
                .generate(GeneratePayrollRequest {
                    employee_id: employee.id.clone(),
                    month,
                    year,
                    overrides: PayrollOverrides::default(),
                    performed_by: performed_by.to_string(),
                })
                .await;

            match result {
                Ok(payroll) => payrolls.push(payroll),
                Err(error) => {
                    warn!(
                        employee_id = %employee.id,
                        code = %employee.code,
                        %error,
                        "Batch payroll generation failed for employee"
                    );
                    failures.push(BatchFailure {
                        employee_id: employee.id,
                        employee_code: employee.code,
                        error,
                    });
                }
            }
        }

        info!(
            month,
            year,
            generated = payrolls.len(),
            failed = failures.len(),
            "Batch payroll run complete"
        );

        Ok(BatchResult { payrolls, failures })
    }

    /// Edits a pending payroll, recomputing totals from the full edited set.
    pub async fn update(&self, req: UpdatePayrollRequest) -> EngineResult<Payroll> {
        let mut payroll = self
            .db
            .payrolls()
            .get_by_id(&req.payroll_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Payroll", &req.payroll_id))?;

        apply_edit(&mut payroll, &req.edits, Utc::now())?;

        // Conditional on status = 'pending'; a concurrent mark_paid wins.
        self.db.payrolls().update_editable(&payroll).await?;

        audit(
            &self.db,
            "payroll",
            "update",
            format!(
                "Payroll {} edited: net {} cents",
                payroll.id, payroll.net_salary_cents
            ),
            &payroll.id,
            &req.performed_by,
        )
        .await;

        Ok(payroll)
    }

    /// Marks a pending payroll paid, freezing it.
    pub async fn mark_paid(&self, payroll_id: &str, performed_by: &str) -> EngineResult<Payroll> {
        let payroll = self
            .db
            .payrolls()
            .get_by_id(payroll_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Payroll", payroll_id))?;
        if !payroll.is_editable() {
            return Err(CoreError::PayrollFrozen {
                payroll_id: payroll.id,
            }
            .into());
        }

        self.db.payrolls().mark_paid(payroll_id, Utc::now()).await?;

        let payroll = self
            .db
            .payrolls()
            .get_by_id(payroll_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Payroll", payroll_id))?;

        info!(payroll_id = %payroll.id, "Payroll marked paid");

        audit(
            &self.db,
            "payroll",
            "mark_paid",
            format!("Payroll {} marked paid", payroll.id),
            &payroll.id,
            performed_by,
        )
        .await;

        Ok(payroll)
    }

    /// Fetches one payroll by id.
    pub async fn get(&self, payroll_id: &str) -> EngineResult<Payroll> {
        self.db
            .payrolls()
            .get_by_id(payroll_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Payroll", payroll_id))
    }

    /// Lists all payrolls for a period.
    pub async fn list_for_period(&self, month: u32, year: i32) -> EngineResult<Vec<Payroll>> {
        validate_month(month).map_err(CoreError::from)?;
        Ok(self.db.payrolls().list_for_period(month, year).await?)
    }

    /// Lists one employee's payroll history.
    pub async fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<Payroll>> {
        Ok(self.db.payrolls().list_for_employee(employee_id).await?)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
