use comfy_table::{Cell, Table};
use rusqlite::OptionalExtension;

use crate::cli::{open_db, resolve_project};
use crate::error::{JobcostError, Result};
use crate::fmt::money;

#[allow(clippy::too_many_arguments)]
pub fn add(
    project: Option<&str>,
    quote: Option<&str>,
    category: &str,
    description: &str,
    quantity: f64,
    price_per_unit: f64,
    cost_per_unit: f64,
) -> Result<()> {
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;

    let quote_id: Option<i64> = match quote {
        Some(number) => Some(
            conn.query_row(
                "SELECT id FROM quotes WHERE project_id = ?1 AND quote_number = ?2",
                rusqlite::params![project_id, number],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| JobcostError::UnknownQuote(number.to_string()))?,
        ),
        None => None,
    };

    let total = quantity * price_per_unit;
    let total_cost = quantity * cost_per_unit;
    conn.execute(
        "INSERT INTO line_items \
         (project_id, quote_id, category, description, quantity, price_per_unit, total, cost_per_unit, total_cost, total_markup) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            project_id,
            quote_id,
            category.to_lowercase(),
            description,
            quantity,
            price_per_unit,
            total,
            cost_per_unit,
            total_cost,
            total - total_cost,
        ],
    )?;
    let id = conn.last_insert_rowid();
    match quote {
        Some(number) => println!("Added line item {id} to quote {number}: {description}"),
        None => println!("Added estimate line item {id}: {description}"),
    }
    Ok(())
}

pub fn list(project: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;
    let state = crate::allocator::load_allocation_state(&conn, project_id)?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Kind", "Category", "Description", "Payee", "Total cost", "Allocated",
    ]);
    for item in &state.line_items {
        table.add_row(vec![
            Cell::new(item.id),
            Cell::new(item.kind.label()),
            Cell::new(&item.category),
            Cell::new(&item.description),
            Cell::new(item.payee_name.as_deref().unwrap_or_default()),
            Cell::new(money(item.total_cost)),
            Cell::new(money(item.allocated_amount)),
        ]);
    }
    println!("Line items (estimate + accepted quotes)\n{table}");
    Ok(())
}
