use colored::Colorize;
use comfy_table::{Cell, Table};
use dialoguer::Confirm;

use crate::allocator::{auto_allocate_commit, auto_allocate_preview, load_allocation_state};
use crate::cli::{open_db, resolve_project};
use crate::error::Result;
use crate::fmt::{confidence_label, money};

pub fn run(project: Option<&str>, yes: bool) -> Result<()> {
    let mut conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;
    let state = load_allocation_state(&conn, project_id)?;

    let candidates = auto_allocate_preview(&state);
    if candidates.is_empty() {
        println!("{}", "No high-confidence allocations found. Nothing to do.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Expense", "Date", "Amount", "Line item", "Confidence"]);
    let mut total = 0.0;
    for c in &candidates {
        total += c.amount;
        table.add_row(vec![
            Cell::new(c.expense_id),
            Cell::new(&c.expense_date),
            Cell::new(money(c.amount)),
            Cell::new(format!("#{} {}", c.line_item_id, c.line_item_label)),
            Cell::new(confidence_label(c.confidence)),
        ]);
    }
    println!("Proposed auto-allocations\n{table}");
    println!("{} expense(s), {} total.", candidates.len(), money(total));

    // The review step is mandatory; --yes is the explicit opt-out.
    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Allocate these expenses?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("Aborted. Nothing was written.");
            return Ok(());
        }
    }

    let committed = auto_allocate_commit(&mut conn, &candidates)?;
    let message = format!("Auto-allocated {committed} expense(s).");
    println!("{}", message.as_str().green());
    Ok(())
}
