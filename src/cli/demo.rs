use rusqlite::Connection;

use crate::cli::open_db;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

const PROJECT_NAME: &str = "Maple St Remodel";

struct DemoItem {
    category: &'static str,
    description: &'static str,
    quantity: f64,
    price_per_unit: f64,
    cost_per_unit: f64,
}

const ESTIMATE_ITEMS: &[DemoItem] = &[
    DemoItem { category: "labor_internal", description: "demo and site prep", quantity: 40.0, price_per_unit: 85.0, cost_per_unit: 55.0 },
    DemoItem { category: "materials", description: "drywall and finishing supplies", quantity: 1.0, price_per_unit: 2600.0, cost_per_unit: 2000.0 },
    DemoItem { category: "materials", description: "tile and grout package", quantity: 1.0, price_per_unit: 1950.0, cost_per_unit: 1500.0 },
    DemoItem { category: "equipment", description: "dumpster and lift rental", quantity: 1.0, price_per_unit: 900.0, cost_per_unit: 750.0 },
    DemoItem { category: "permits", description: "building permit", quantity: 1.0, price_per_unit: 650.0, cost_per_unit: 650.0 },
];

struct DemoQuote {
    number: &'static str,
    payee: &'static str,
    status: &'static str,
    items: &'static [DemoItem],
}

const QUOTES: &[DemoQuote] = &[
    DemoQuote {
        number: "Q-101",
        payee: "Smith Plumbing",
        status: "accepted",
        items: &[DemoItem { category: "subcontractors", description: "plumbing rough-in work", quantity: 1.0, price_per_unit: 6200.0, cost_per_unit: 5100.0 }],
    },
    DemoQuote {
        number: "Q-102",
        payee: "Acme Electric",
        status: "accepted",
        items: &[DemoItem { category: "subcontractors", description: "panel upgrade and rough wiring", quantity: 1.0, price_per_unit: 4400.0, cost_per_unit: 3600.0 }],
    },
    DemoQuote {
        number: "Q-103",
        payee: "Bayside Roofing",
        status: "pending",
        items: &[DemoItem { category: "subcontractors", description: "re-roof rear addition", quantity: 1.0, price_per_unit: 8800.0, cost_per_unit: 7300.0 }],
    },
];

struct DemoExpense {
    date: &'static str,
    payee: &'static str,
    description: &'static str,
    amount: f64,
    category: &'static str,
}

const EXPENSES: &[DemoExpense] = &[
    DemoExpense { date: "2026-03-02", payee: "Smith Plumbing LLC", description: "bathroom rough-in", amount: 5000.0, category: "subcontractor" },
    DemoExpense { date: "2026-03-04", payee: "Acme Electric Co", description: "rough wiring draw", amount: 3550.0, category: "subcontractor" },
    DemoExpense { date: "2026-03-06", payee: "Home Depot", description: "drywall sheets and mud", amount: 1940.0, category: "materials" },
    DemoExpense { date: "2026-03-09", payee: "City of Springfield", description: "permit fee", amount: 650.0, category: "permits" },
    DemoExpense { date: "2026-03-11", payee: "United Rentals", description: "scissor lift week 1", amount: 410.0, category: "equipment" },
    DemoExpense { date: "2026-03-12", payee: "Corner Deli", description: "crew lunch", amount: 84.0, category: "other" },
];

fn seed(conn: &Connection) -> Result<i64> {
    conn.execute("INSERT INTO projects (name) VALUES (?1)", [PROJECT_NAME])?;
    let project_id = conn.last_insert_rowid();

    for item in ESTIMATE_ITEMS {
        insert_item(conn, project_id, None, item)?;
    }
    for quote in QUOTES {
        conn.execute(
            "INSERT INTO quotes (project_id, quote_number, payee_name, status) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![project_id, quote.number, quote.payee, quote.status],
        )?;
        let quote_id = conn.last_insert_rowid();
        for item in quote.items {
            insert_item(conn, project_id, Some(quote_id), item)?;
        }
    }
    for expense in EXPENSES {
        conn.execute(
            "INSERT INTO expenses (project_id, expense_date, description, amount, category, payee_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                project_id,
                expense.date,
                expense.description,
                expense.amount,
                expense.category,
                expense.payee,
            ],
        )?;
    }
    Ok(project_id)
}

fn insert_item(conn: &Connection, project_id: i64, quote_id: Option<i64>, item: &DemoItem) -> Result<()> {
    let total = item.quantity * item.price_per_unit;
    let total_cost = item.quantity * item.cost_per_unit;
    conn.execute(
        "INSERT INTO line_items \
         (project_id, quote_id, category, description, quantity, price_per_unit, total, cost_per_unit, total_cost, total_markup) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            project_id,
            quote_id,
            item.category,
            item.description,
            item.quantity,
            item.price_per_unit,
            total,
            item.cost_per_unit,
            total_cost,
            total - total_cost,
        ],
    )?;
    Ok(())
}

pub fn run() -> Result<()> {
    let conn = open_db()?;

    let existing: i64 = conn.query_row(
        "SELECT count(*) FROM projects WHERE name = ?1",
        [PROJECT_NAME],
        |r| r.get(0),
    )?;
    if existing > 0 {
        println!("Demo project '{PROJECT_NAME}' already exists.");
        return Ok(());
    }

    seed(&conn)?;

    let mut settings = load_settings();
    if settings.default_project.is_empty() {
        settings.default_project = PROJECT_NAME.to_string();
        save_settings(&settings)?;
    }

    println!("Loaded demo project '{PROJECT_NAME}' with estimate items, quotes, and expenses.");
    println!("Try: jobcost suggest");
    println!("     jobcost auto");
    println!("     jobcost report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{auto_allocate_preview, load_allocation_state};
    use crate::db::{get_connection, init_db};

    #[test]
    fn test_demo_seed_produces_high_confidence_matches() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();

        let project_id = seed(&conn).unwrap();
        let state = load_allocation_state(&conn, project_id).unwrap();

        // Pending quote Q-103 must not contribute line items.
        assert!(state.line_items.iter().all(|i| i.quote_number.as_deref() != Some("Q-103")));
        assert_eq!(state.unallocated.len(), EXPENSES.len());

        // The two subcontractor draws match their quotes with high confidence.
        let preview = auto_allocate_preview(&state);
        assert!(preview.len() >= 2, "expected at least two auto candidates, got {}", preview.len());
    }
}
