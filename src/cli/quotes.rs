use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_project};
use crate::error::{JobcostError, Result};
use crate::fmt::money;

const STATUSES: &[&str] = &["pending", "accepted", "declined"];

pub fn add(number: &str, project: Option<&str>, payee: &str, status: &str) -> Result<()> {
    if !STATUSES.contains(&status) {
        return Err(JobcostError::Other(format!(
            "Invalid status '{status}' (expected one of: {})",
            STATUSES.join(", ")
        )));
    }
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;
    conn.execute(
        "INSERT INTO quotes (project_id, quote_number, payee_name, status) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![project_id, number, payee, status],
    )?;
    println!("Added quote {number} from {payee} ({status})");
    Ok(())
}

pub fn list(project: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;
    let mut stmt = conn.prepare(
        "SELECT q.id, q.quote_number, q.payee_name, q.status, \
                COALESCE((SELECT sum(total_cost) FROM line_items WHERE quote_id = q.id), 0) \
         FROM quotes q WHERE q.project_id = ?1 ORDER BY q.quote_number",
    )?;
    let rows: Vec<(i64, String, Option<String>, String, f64)> = stmt
        .query_map([project_id], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Number", "Payee", "Status", "Total cost"]);
    for (id, number, payee, status, cost) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(number),
            Cell::new(payee.unwrap_or_default()),
            Cell::new(status),
            Cell::new(money(cost)),
        ]);
    }
    println!("Quotes\n{table}");
    Ok(())
}
