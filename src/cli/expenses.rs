use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_project};
use crate::error::Result;
use crate::fmt::money;

pub fn list(project: Option<&str>, unallocated_only: bool) -> Result<()> {
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;

    let sql = if unallocated_only {
        "SELECT e.id, e.expense_date, e.payee_name, e.description, e.amount, e.category, e.is_planned \
         FROM expenses e LEFT JOIN expense_correlations c ON c.expense_id = e.id \
         WHERE e.project_id = ?1 AND c.id IS NULL ORDER BY e.expense_date, e.id"
    } else {
        "SELECT e.id, e.expense_date, e.payee_name, e.description, e.amount, e.category, e.is_planned \
         FROM expenses e WHERE e.project_id = ?1 ORDER BY e.expense_date, e.id"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows: Vec<(i64, String, Option<String>, Option<String>, f64, String, bool)> = stmt
        .query_map([project_id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Payee", "Description", "Amount", "Category", "Planned"]);
    for (id, date, payee, desc, amount, category, planned) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(date),
            Cell::new(payee.unwrap_or_default()),
            Cell::new(desc.unwrap_or_default()),
            Cell::new(money(amount)),
            Cell::new(category),
            Cell::new(if planned { "yes" } else { "" }),
        ]);
    }
    let title = if unallocated_only { "Unallocated expenses" } else { "Expenses" };
    println!("{title}\n{table}");
    Ok(())
}
