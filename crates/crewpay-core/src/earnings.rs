//! # Earnings Attribution
//!
//! Per-employee sales and profit attribution over read-only point-of-sale
//! invoices.
//!
//! ## Attribution Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SALES side (sold_by == employee):                                      │
//! │    counts, totals, min/max, payment-method breakdown,                   │
//! │    products profit (cost-adjusted, discount-final preferred)            │
//! │                                                                         │
//! │  SERVICE side (any service line by employee, on anyone's invoice):      │
//! │    service revenue minus the employee's allocated discount share,       │
//! │    clamped at zero per invoice                                          │
//! │                                                                         │
//! │  totalProfit = productsProfit + servicesProfit                          │
//! │    (cost-adjusted product profit + cost-free service revenue; the mix   │
//! │     is intentional, services carry no recorded cost)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Discount Allocation
//! A discount with apply mode `both` is allocated against the invoice
//! subtotal; mode `services` against the services total; mode `products`
//! never touches service profit. The employee's share is proportional to
//! their service amount within the relevant base (see
//! [`Money::allocate_share`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountApplyMode, Invoice};

// =============================================================================
// Report Types
// =============================================================================

/// Count and total for one payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethodTotal {
    pub count: i64,
    pub total_cents: i64,
}

/// The full per-employee earnings report for a set of invoices.
///
/// The caller filters the invoice set to the desired period before calling;
/// this module only attributes what it is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeEarningsReport {
    pub employee_id: String,

    /// Invoices where this employee is the seller of record.
    pub sales_invoice_count: i64,
    /// Invoices carrying at least one service line by this employee
    /// (regardless of who sold them).
    pub service_invoice_count: i64,

    pub total_sales_cents: i64,
    /// Integer division; the remainder is dropped.
    pub average_invoice_cents: i64,
    pub largest_invoice_cents: i64,
    pub smallest_invoice_cents: i64,

    /// Sold-invoice totals broken down by payment method, in stable
    /// (sorted) key order.
    pub payment_methods: BTreeMap<String, PaymentMethodTotal>,

    /// Cost-adjusted product profit across sold invoices, summing only
    /// invoices that carry a profit figure.
    pub products_profit_cents: i64,
    /// Service revenue net of allocated discount shares, clamped at zero
    /// per invoice.
    pub services_profit_cents: i64,
    pub total_profit_cents: i64,

    /// Percentage of total sales; unrounded, 0.0 when there are no sales.
    pub profit_margin: f64,

    /// Sold items whose purchase price is unknown.
    pub items_without_purchase_price: i64,
    /// True when any sold invoice lacked profit data, making
    /// `products_profit_cents` a lower bound rather than an exact figure.
    pub has_missing_profit_data: bool,
}

// =============================================================================
// Attribution
// =============================================================================

/// Computes this employee's service profit on one invoice: their service
/// revenue minus their allocated share of the invoice discount, clamped at
/// zero.
pub fn service_profit_for_invoice(employee_id: &str, invoice: &Invoice) -> i64 {
    let services_total = invoice.employee_services_total(employee_id);
    if services_total <= 0 {
        return 0;
    }

    let allocated = match invoice.summary.discount {
        Some(discount) => {
            let discount_money = Money::from_cents(discount.amount_cents);
            match discount.apply_mode {
                DiscountApplyMode::Both => discount_money
                    .allocate_share(services_total, invoice.summary.subtotal_cents)
                    .cents(),
                DiscountApplyMode::Services => discount_money
                    .allocate_share(services_total, invoice.summary.services_total_cents)
                    .cents(),
                DiscountApplyMode::Products => 0,
            }
        }
        None => 0,
    };

    (services_total - allocated).max(0)
}

/// Builds the earnings report for one employee over a set of invoices.
pub fn build_earnings_report(employee_id: &str, invoices: &[Invoice]) -> EmployeeEarningsReport {
    let mut report = EmployeeEarningsReport {
        employee_id: employee_id.to_string(),
        sales_invoice_count: 0,
        service_invoice_count: 0,
        total_sales_cents: 0,
        average_invoice_cents: 0,
        largest_invoice_cents: 0,
        smallest_invoice_cents: 0,
        payment_methods: BTreeMap::new(),
        products_profit_cents: 0,
        services_profit_cents: 0,
        total_profit_cents: 0,
        profit_margin: 0.0,
        items_without_purchase_price: 0,
        has_missing_profit_data: false,
    };

    let mut largest: Option<i64> = None;
    let mut smallest: Option<i64> = None;

    for invoice in invoices {
        if invoice.sold_by.employee_id == employee_id {
            report.sales_invoice_count += 1;
            report.total_sales_cents += invoice.summary.total_cents;

            let total = invoice.summary.total_cents;
            largest = Some(largest.map_or(total, |v| v.max(total)));
            smallest = Some(smallest.map_or(total, |v| v.min(total)));

            let entry = report
                .payment_methods
                .entry(invoice.payment_method.clone())
                .or_default();
            entry.count += 1;
            entry.total_cents += total;

            match invoice.best_products_profit() {
                Some(profit) => report.products_profit_cents += profit,
                None => report.has_missing_profit_data = true,
            }
            report.items_without_purchase_price +=
                invoice.summary.items_without_purchase_price;
            if invoice.summary.items_without_purchase_price > 0 {
                report.has_missing_profit_data = true;
            }
        }

        if invoice.has_employee_service(employee_id) {
            report.service_invoice_count += 1;
            report.services_profit_cents += service_profit_for_invoice(employee_id, invoice);
        }
    }

    report.largest_invoice_cents = largest.unwrap_or(0);
    report.smallest_invoice_cents = smallest.unwrap_or(0);
    if report.sales_invoice_count > 0 {
        report.average_invoice_cents = report.total_sales_cents / report.sales_invoice_count;
    }

    report.total_profit_cents = report.products_profit_cents + report.services_profit_cents;
    if report.total_sales_cents > 0 {
        report.profit_margin =
            report.total_profit_cents as f64 / report.total_sales_cents as f64 * 100.0;
    }

    report
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        DiscountKind, InvoiceDiscount, InvoiceService, InvoiceSummary, SoldBy,
    };
    use chrono::Utc;

    fn invoice(
        id: &str,
        seller: &str,
        total_cents: i64,
        payment_method: &str,
        services: Vec<InvoiceService>,
        discount: Option<InvoiceDiscount>,
        products_profit: Option<i64>,
    ) -> Invoice {
        let services_total: i64 = services.iter().map(|s| s.amount_cents).sum();
        Invoice {
            id: id.to_string(),
            date: Utc::now(),
            sold_by: SoldBy {
                employee_id: seller.to_string(),
                employee_code: format!("C-{seller}"),
            },
            items: vec![],
            services,
            summary: InvoiceSummary {
                subtotal_cents: total_cents + discount.map_or(0, |d| d.amount_cents),
                services_total_cents: services_total,
                products_subtotal_cents: total_cents + discount.map_or(0, |d| d.amount_cents)
                    - services_total,
                discount,
                total_cents,
                products_profit_cents: products_profit,
                final_products_profit_cents: None,
                items_without_purchase_price: 0,
                profit_items_count: if products_profit.is_some() { 1 } else { 0 },
            },
            payment_method: payment_method.to_string(),
        }
    }

    fn service(employee_id: &str, amount_cents: i64) -> InvoiceService {
        InvoiceService {
            employee_id: employee_id.to_string(),
            employee_code: format!("C-{employee_id}"),
            amount_cents,
            description: None,
        }
    }

    #[test]
    fn test_sales_side_statistics() {
        let invoices = vec![
            invoice("i1", "emp-1", 100_00, "cash", vec![], None, Some(30_00)),
            invoice("i2", "emp-1", 250_00, "card", vec![], None, Some(80_00)),
            invoice("i3", "emp-2", 999_00, "cash", vec![], None, Some(1_00)),
        ];

        let report = build_earnings_report("emp-1", &invoices);
        assert_eq!(report.sales_invoice_count, 2);
        assert_eq!(report.total_sales_cents, 350_00);
        assert_eq!(report.average_invoice_cents, 175_00);
        assert_eq!(report.largest_invoice_cents, 250_00);
        assert_eq!(report.smallest_invoice_cents, 100_00);
        assert_eq!(report.products_profit_cents, 110_00);
        assert!(!report.has_missing_profit_data);

        assert_eq!(report.payment_methods["cash"].count, 1);
        assert_eq!(report.payment_methods["cash"].total_cents, 100_00);
        assert_eq!(report.payment_methods["card"].total_cents, 250_00);
    }

    #[test]
    fn test_service_attribution_crosses_sellers() {
        // emp-2 performed a service on an invoice sold by emp-1
        let invoices = vec![invoice(
            "i1",
            "emp-1",
            500_00,
            "cash",
            vec![service("emp-2", 120_00)],
            None,
            None,
        )];

        let report = build_earnings_report("emp-2", &invoices);
        assert_eq!(report.sales_invoice_count, 0);
        assert_eq!(report.service_invoice_count, 1);
        assert_eq!(report.services_profit_cents, 120_00);
        assert_eq!(report.total_profit_cents, 120_00);
        // No sales means no margin, not a division by zero
        assert_eq!(report.profit_margin, 0.0);
    }

    #[test]
    fn test_discount_allocation_both_mode() {
        // $100 discount across a $1,000 subtotal; employee services $200
        // → allocated $20, service profit $180
        let discount = InvoiceDiscount {
            amount_cents: 100_00,
            apply_mode: DiscountApplyMode::Both,
            kind: DiscountKind::Fixed,
            value: 100.0,
        };
        let inv = invoice(
            "i1",
            "emp-1",
            900_00,
            "cash",
            vec![service("emp-2", 200_00)],
            Some(discount),
            None,
        );

        assert_eq!(service_profit_for_invoice("emp-2", &inv), 180_00);
    }

    #[test]
    fn test_discount_allocation_services_mode() {
        // $50 discount against a $250 services total; employee's $200 share
        // is 4/5 → $40 allocated
        let discount = InvoiceDiscount {
            amount_cents: 50_00,
            apply_mode: DiscountApplyMode::Services,
            kind: DiscountKind::Fixed,
            value: 50.0,
        };
        let inv = invoice(
            "i1",
            "emp-1",
            950_00,
            "cash",
            vec![service("emp-2", 200_00), service("emp-3", 50_00)],
            Some(discount),
            None,
        );

        assert_eq!(service_profit_for_invoice("emp-2", &inv), 160_00);
        assert_eq!(service_profit_for_invoice("emp-3", &inv), 40_00);
    }

    #[test]
    fn test_products_mode_discount_leaves_services_alone() {
        let discount = InvoiceDiscount {
            amount_cents: 300_00,
            apply_mode: DiscountApplyMode::Products,
            kind: DiscountKind::Percentage,
            value: 30.0,
        };
        let inv = invoice(
            "i1",
            "emp-1",
            700_00,
            "cash",
            vec![service("emp-2", 200_00)],
            Some(discount),
            None,
        );

        assert_eq!(service_profit_for_invoice("emp-2", &inv), 200_00);
    }

    #[test]
    fn test_service_profit_clamped_at_zero() {
        // Discount share exceeding the service amount cannot go negative
        let discount = InvoiceDiscount {
            amount_cents: 400_00,
            apply_mode: DiscountApplyMode::Services,
            kind: DiscountKind::Fixed,
            value: 400.0,
        };
        let inv = invoice(
            "i1",
            "emp-1",
            100_00,
            "cash",
            vec![service("emp-2", 200_00)],
            Some(discount),
            None,
        );

        assert_eq!(service_profit_for_invoice("emp-2", &inv), 0);
    }

    #[test]
    fn test_missing_profit_data_flagged() {
        let mut inv = invoice("i1", "emp-1", 100_00, "cash", vec![], None, None);
        inv.summary.items_without_purchase_price = 2;

        let report = build_earnings_report("emp-1", &[inv]);
        assert!(report.has_missing_profit_data);
        assert_eq!(report.items_without_purchase_price, 2);
        assert_eq!(report.products_profit_cents, 0);
    }

    #[test]
    fn test_mixed_profit_totals() {
        let invoices = vec![
            invoice("i1", "emp-1", 200_00, "cash", vec![], None, Some(60_00)),
            invoice(
                "i2",
                "emp-2",
                300_00,
                "card",
                vec![service("emp-1", 100_00)],
                None,
                Some(90_00),
            ),
        ];

        let report = build_earnings_report("emp-1", &invoices);
        // Product profit from the sold invoice, service revenue from the
        // other seller's invoice
        assert_eq!(report.products_profit_cents, 60_00);
        assert_eq!(report.services_profit_cents, 100_00);
        assert_eq!(report.total_profit_cents, 160_00);
        // 160 / 200 sales
        assert!((report.profit_margin - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_invoice_set() {
        let report = build_earnings_report("emp-1", &[]);
        assert_eq!(report.sales_invoice_count, 0);
        assert_eq!(report.average_invoice_cents, 0);
        assert_eq!(report.largest_invoice_cents, 0);
        assert_eq!(report.profit_margin, 0.0);
        assert!(report.payment_methods.is_empty());
    }
}
