//! # Seed Data Generator
//!
//! Populates the database with demo employees, attendance, advances, leaves
//! and invoices for development.
//!
//! ## Usage
//! ```bash
//! # Seed into the default dev database
//! cargo run -p crewpay-db --bin seed
//!
//! # Specify database path and invoice count
//! cargo run -p crewpay-db --bin seed -- --db ./data/crewpay.db --invoices 200
//! ```

use chrono::{Datelike, Duration, NaiveTime, TimeZone, Utc};
use std::env;

use crewpay_core::attendance::{apply_check_out, build_check_in};
use crewpay_core::timeclock::wall_clock_offset;
use crewpay_core::{
    Advance, AdvanceStatus, DiscountApplyMode, DiscountKind, Employee, EmployeeStatus,
    EntryMethod, Invoice, InvoiceDiscount, InvoiceItem, InvoiceService, InvoiceSummary, Leave,
    SoldBy, WorkDay, WorkSchedule,
};
use crewpay_db::{Database, DbConfig};
use uuid::Uuid;

const STAFF: &[(&str, &str, i64)] = &[
    ("E-01", "Sara Haddad", 420_000),
    ("E-02", "Omar Khalil", 380_000),
    ("E-03", "Lina Aoun", 350_000),
    ("E-04", "Karim Nasser", 300_000),
];

const PAYMENT_METHODS: &[&str] = &["cash", "card", "transfer"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut invoice_count: usize = 120;
    let mut db_path = String::from("./crewpay_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--invoices" | "-i" => {
                if i + 1 < args.len() {
                    invoice_count = args[i + 1].parse().unwrap_or(120);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("CrewPay Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -i, --invoices <N>  Number of invoices to generate (default: 120)");
                println!("  -d, --db <PATH>     Database file path (default: ./crewpay_dev.db)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 CrewPay Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Invoices: {}", invoice_count);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if !db.employees().list_all().await?.is_empty() {
        println!("⚠ Database already has employees");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Employees
    let mut employees = Vec::new();
    for (code, name, salary) in STAFF {
        let employee = make_employee(code, name, *salary);
        db.employees().insert(&employee).await?;
        employees.push(employee);
    }
    println!("✓ Seeded {} employees", employees.len());

    // A month of attendance for each employee, ending yesterday
    let mut attendance_days = 0;
    let today = Utc::now().with_timezone(&wall_clock_offset()).date_naive();
    for employee in &employees {
        for back in 1..=30 {
            let day = today - Duration::days(back);
            if !employee
                .schedule
                .includes(WorkDay::from_weekday(day.weekday()))
            {
                continue;
            }

            // Vary arrival: on time, inside grace or late
            let arrival_minute: u32 = match (back + employees.len() as i64) % 4 {
                0 => 0,
                1 => 10,
                2 => 25,
                _ => 5,
            };
            let check_in_local = day.and_time(NaiveTime::from_hms_opt(9, arrival_minute, 0).unwrap());
            let check_in = wall_clock_offset()
                .from_local_datetime(&check_in_local)
                .single()
                .expect("fixed offset times are unambiguous")
                .with_timezone(&Utc);

            let mut record = build_check_in(
                employee,
                check_in,
                check_in,
                &employee.id,
                EntryMethod::SelfService,
                None,
            )?;

            let check_out = check_in + Duration::hours(8) + Duration::minutes((back % 3) * 20);
            apply_check_out(&mut record, employee, check_out, check_out)?;

            db.attendance().insert(&record).await?;
            db.attendance().complete_check_out(&record).await?;
            attendance_days += 1;
        }
    }
    println!("✓ Seeded {} attendance days", attendance_days);

    // A pending advance and a leave for the first employee
    db.advances()
        .insert(&Advance {
            id: Uuid::new_v4().to_string(),
            employee_id: employees[0].id.clone(),
            amount_cents: 60_000,
            installment_cents: 15_000,
            reason: Some("school fees".to_string()),
            status: AdvanceStatus::Pending,
            created_at: Utc::now(),
            applied_at: None,
        })
        .await?;

    db.leaves()
        .insert(&Leave {
            id: Uuid::new_v4().to_string(),
            employee_id: employees[1].id.clone(),
            start_date: today - Duration::days(10),
            end_date: today - Duration::days(8),
            reason: Some("travel".to_string()),
            created_at: Utc::now(),
        })
        .await?;
    println!("✓ Seeded advance and leave");

    // Invoices across the last month
    let start = std::time::Instant::now();
    for n in 0..invoice_count {
        let invoice = make_invoice(n, &employees);
        db.invoices().insert(&invoice).await?;
    }
    println!(
        "✓ Seeded {} invoices in {:?}",
        invoice_count,
        start.elapsed()
    );

    println!();
    println!("✓ Seed complete!");
    Ok(())
}

fn make_employee(code: &str, name: &str, salary_cents: i64) -> Employee {
    let now = Utc::now();
    Employee {
        id: Uuid::new_v4().to_string(),
        code: code.to_string(),
        name: name.to_string(),
        schedule: WorkSchedule {
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            work_days: vec![
                WorkDay::Monday,
                WorkDay::Tuesday,
                WorkDay::Wednesday,
                WorkDay::Thursday,
                WorkDay::Friday,
                WorkDay::Saturday,
            ],
            grace_period_minutes: 15,
        },
        basic_salary_cents: salary_cents,
        allowances_cents: 20_000,
        status: EmployeeStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

fn make_invoice(n: usize, employees: &[Employee]) -> Invoice {
    let seller = &employees[n % employees.len()];
    let service_employee = &employees[(n + 1) % employees.len()];

    let date = Utc::now() - Duration::days((n % 30) as i64) - Duration::hours((n % 9) as i64);

    let products_subtotal = 40_00 + (n as i64 % 10) * 15_00;
    let services_total = if n % 3 == 0 { 50_00 } else { 0 };
    let subtotal = products_subtotal + services_total;

    let discount = (n % 5 == 0).then_some(InvoiceDiscount {
        amount_cents: subtotal / 10,
        apply_mode: if n % 2 == 0 {
            DiscountApplyMode::Both
        } else {
            DiscountApplyMode::Products
        },
        kind: DiscountKind::Percentage,
        value: 10.0,
    });
    let total = subtotal - discount.map_or(0, |d| d.amount_cents);

    // Every seventh invoice has an item with unknown purchase price
    let missing_profit = n % 7 == 0;

    let services = if services_total > 0 {
        vec![InvoiceService {
            employee_id: service_employee.id.clone(),
            employee_code: service_employee.code.clone(),
            amount_cents: services_total,
            description: Some("service".to_string()),
        }]
    } else {
        Vec::new()
    };

    Invoice {
        id: Uuid::new_v4().to_string(),
        date,
        sold_by: SoldBy {
            employee_id: seller.id.clone(),
            employee_code: seller.code.clone(),
        },
        items: vec![InvoiceItem {
            price_cents: products_subtotal,
            quantity: 1,
        }],
        services,
        summary: InvoiceSummary {
            subtotal_cents: subtotal,
            services_total_cents: services_total,
            products_subtotal_cents: products_subtotal,
            discount,
            total_cents: total,
            products_profit_cents: (!missing_profit).then_some(products_subtotal / 4),
            final_products_profit_cents: None,
            items_without_purchase_price: if missing_profit { 1 } else { 0 },
            profit_items_count: if missing_profit { 0 } else { 1 },
        },
        payment_method: PAYMENT_METHODS[n % PAYMENT_METHODS.len()].to_string(),
    }
}
