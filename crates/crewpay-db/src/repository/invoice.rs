//! # Invoice Repository
//!
//! Read access to point-of-sale invoices. This system treats the invoice
//! tables as external data: it reads them for earnings attribution and
//! never mutates them (`insert` exists for seeding and tests only).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crewpay_core::{
    DiscountApplyMode, DiscountKind, Invoice, InvoiceDiscount, InvoiceItem, InvoiceService,
    InvoiceSummary, SoldBy,
};

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    date: DateTime<Utc>,
    sold_by_employee_id: String,
    sold_by_employee_code: String,
    payment_method: String,

    subtotal_cents: i64,
    services_total_cents: i64,
    products_subtotal_cents: i64,

    discount_amount_cents: Option<i64>,
    discount_apply_mode: Option<DiscountApplyMode>,
    discount_kind: Option<DiscountKind>,
    discount_value: Option<f64>,

    total_cents: i64,
    products_profit_cents: Option<i64>,
    final_products_profit_cents: Option<i64>,
    items_without_purchase_price: i64,
    profit_items_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceItemRow {
    invoice_id: String,
    price_cents: i64,
    quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceServiceRow {
    invoice_id: String,
    employee_id: String,
    employee_code: String,
    amount_cents: i64,
    description: Option<String>,
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<InvoiceItem>, services: Vec<InvoiceService>) -> Invoice {
        // All three discount columns are written together; a row with only
        // some of them set is treated as undiscounted.
        let discount = match (
            self.discount_amount_cents,
            self.discount_apply_mode,
            self.discount_kind,
        ) {
            (Some(amount_cents), Some(apply_mode), Some(kind)) => Some(InvoiceDiscount {
                amount_cents,
                apply_mode,
                kind,
                value: self.discount_value.unwrap_or(0.0),
            }),
            _ => None,
        };

        Invoice {
            id: self.id,
            date: self.date,
            sold_by: SoldBy {
                employee_id: self.sold_by_employee_id,
                employee_code: self.sold_by_employee_code,
            },
            items,
            services,
            summary: InvoiceSummary {
                subtotal_cents: self.subtotal_cents,
                services_total_cents: self.services_total_cents,
                products_subtotal_cents: self.products_subtotal_cents,
                discount,
                total_cents: self.total_cents,
                products_profit_cents: self.products_profit_cents,
                final_products_profit_cents: self.final_products_profit_cents,
                items_without_purchase_price: self.items_without_purchase_price,
                profit_items_count: self.profit_items_count,
            },
            payment_method: self.payment_method,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, date, sold_by_employee_id, sold_by_employee_code, payment_method,
        subtotal_cents, services_total_cents, products_subtotal_cents,
        discount_amount_cents, discount_apply_mode, discount_kind, discount_value,
        total_cents, products_profit_cents, final_products_profit_cents,
        items_without_purchase_price, profit_items_count
    FROM invoices
"#;

/// Repository for invoice read access.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Loads all invoices with their items and services.
    ///
    /// Deliberately broad: period and employee filtering happen in the
    /// engine. Children are fetched in two queries and grouped in memory
    /// rather than issuing one pair of queries per invoice.
    pub async fn list_all(&self) -> DbResult<Vec<Invoice>> {
        let rows: Vec<InvoiceRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY date"))
                .fetch_all(&self.pool)
                .await?;

        let item_rows: Vec<InvoiceItemRow> =
            sqlx::query_as("SELECT invoice_id, price_cents, quantity FROM invoice_items")
                .fetch_all(&self.pool)
                .await?;

        let service_rows: Vec<InvoiceServiceRow> = sqlx::query_as(
            r#"
            SELECT invoice_id, employee_id, employee_code, amount_cents, description
            FROM invoice_services
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_invoice: HashMap<String, Vec<InvoiceItem>> = HashMap::new();
        for row in item_rows {
            items_by_invoice
                .entry(row.invoice_id)
                .or_default()
                .push(InvoiceItem {
                    price_cents: row.price_cents,
                    quantity: row.quantity,
                });
        }

        let mut services_by_invoice: HashMap<String, Vec<InvoiceService>> = HashMap::new();
        for row in service_rows {
            services_by_invoice
                .entry(row.invoice_id)
                .or_default()
                .push(InvoiceService {
                    employee_id: row.employee_id,
                    employee_code: row.employee_code,
                    amount_cents: row.amount_cents,
                    description: row.description,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_invoice.remove(&row.id).unwrap_or_default();
                let services = services_by_invoice.remove(&row.id).unwrap_or_default();
                row.into_invoice(items, services)
            })
            .collect())
    }

    /// Inserts an invoice with its children. Seeding and tests only.
    pub async fn insert(&self, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, "Inserting invoice");

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, date, sold_by_employee_id, sold_by_employee_code, payment_method,
                subtotal_cents, services_total_cents, products_subtotal_cents,
                discount_amount_cents, discount_apply_mode, discount_kind, discount_value,
                total_cents, products_profit_cents, final_products_profit_cents,
                items_without_purchase_price, profit_items_count
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15,
                ?16, ?17
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(invoice.date)
        .bind(&invoice.sold_by.employee_id)
        .bind(&invoice.sold_by.employee_code)
        .bind(&invoice.payment_method)
        .bind(invoice.summary.subtotal_cents)
        .bind(invoice.summary.services_total_cents)
        .bind(invoice.summary.products_subtotal_cents)
        .bind(invoice.summary.discount.map(|d| d.amount_cents))
        .bind(invoice.summary.discount.map(|d| d.apply_mode))
        .bind(invoice.summary.discount.map(|d| d.kind))
        .bind(invoice.summary.discount.map(|d| d.value))
        .bind(invoice.summary.total_cents)
        .bind(invoice.summary.products_profit_cents)
        .bind(invoice.summary.final_products_profit_cents)
        .bind(invoice.summary.items_without_purchase_price)
        .bind(invoice.summary.profit_items_count)
        .execute(&self.pool)
        .await?;

        for item in &invoice.items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (id, invoice_id, price_cents, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&invoice.id)
            .bind(item.price_cents)
            .bind(item.quantity)
            .execute(&self.pool)
            .await?;
        }

        for service in &invoice.services {
            sqlx::query(
                r#"
                INSERT INTO invoice_services (
                    id, invoice_id, employee_id, employee_code, amount_cents, description
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&invoice.id)
            .bind(&service.employee_id)
            .bind(&service.employee_code)
            .bind(service.amount_cents)
            .bind(&service.description)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn invoice(id: &str, discounted: bool) -> Invoice {
        Invoice {
            id: id.to_string(),
            date: Utc::now(),
            sold_by: SoldBy {
                employee_id: "emp-1".to_string(),
                employee_code: "E-01".to_string(),
            },
            items: vec![InvoiceItem {
                price_cents: 5_000,
                quantity: 2,
            }],
            services: vec![InvoiceService {
                employee_id: "emp-2".to_string(),
                employee_code: "E-02".to_string(),
                amount_cents: 10_000,
                description: Some("haircut".to_string()),
            }],
            summary: InvoiceSummary {
                subtotal_cents: 20_000,
                services_total_cents: 10_000,
                products_subtotal_cents: 10_000,
                discount: discounted.then_some(InvoiceDiscount {
                    amount_cents: 2_000,
                    apply_mode: DiscountApplyMode::Both,
                    kind: DiscountKind::Percentage,
                    value: 10.0,
                }),
                total_cents: if discounted { 18_000 } else { 20_000 },
                products_profit_cents: Some(3_000),
                final_products_profit_cents: None,
                items_without_purchase_price: 0,
                profit_items_count: 1,
            },
            payment_method: "cash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_round_trip_with_children() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.invoices();

        repo.insert(&invoice("inv-1", true)).await.unwrap();
        repo.insert(&invoice("inv-2", false)).await.unwrap();

        let loaded = repo.list_all().await.unwrap();
        assert_eq!(loaded.len(), 2);

        let first = loaded.iter().find(|i| i.id == "inv-1").unwrap();
        assert_eq!(first.items.len(), 1);
        assert_eq!(first.services.len(), 1);
        assert_eq!(first.services[0].employee_id, "emp-2");

        let discount = first.summary.discount.unwrap();
        assert_eq!(discount.amount_cents, 2_000);
        assert_eq!(discount.apply_mode, DiscountApplyMode::Both);

        let second = loaded.iter().find(|i| i.id == "inv-2").unwrap();
        assert!(second.summary.discount.is_none());
    }
}
