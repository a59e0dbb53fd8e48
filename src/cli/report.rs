use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{open_db, resolve_project};
use crate::error::Result;
use crate::fmt::money;
use crate::reports::allocation_summary;

pub fn run(project: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;
    let summary = allocation_summary(&conn, project_id)?;

    let mut table = Table::new();
    table.set_header(vec!["Target", "Category", "Budgeted", "Allocated", "Variance", "Expenses"]);
    for target in &summary.targets {
        let variance = target.variance();
        let variance_cell = if variance < 0.0 {
            Cell::new(money(variance).as_str().red().to_string())
        } else {
            Cell::new(money(variance))
        };
        table.add_row(vec![
            Cell::new(&target.label),
            Cell::new(&target.category),
            Cell::new(money(target.budgeted_cost)),
            Cell::new(money(target.allocated_amount)),
            variance_cell,
            Cell::new(target.expense_count),
        ]);
    }
    println!("Allocation summary\n{table}");
    println!(
        "Budgeted {} | Allocated {} | Unallocated: {} expense(s), {}",
        money(summary.total_budgeted),
        money(summary.total_allocated),
        summary.unallocated_count,
        money(summary.unallocated_total),
    );
    Ok(())
}
