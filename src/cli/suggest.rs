use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::allocator::{line_item_label, load_allocation_state, AUTO_ALLOCATE_THRESHOLD};
use crate::cli::{open_db, resolve_project};
use crate::error::Result;
use crate::fmt::{confidence_label, money};

pub fn run(project: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;
    let state = load_allocation_state(&conn, project_id)?;

    if state.unallocated.is_empty() {
        println!("{}", "All expenses are allocated.".green());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Expense", "Date", "Payee", "Amount", "Suggested line item", "Confidence",
    ]);
    let mut high_confidence = 0usize;
    for expense in &state.unallocated {
        let suggestion = expense
            .suggested_line_item_id
            .and_then(|id| state.line_items.iter().find(|i| i.id == id))
            .map(|item| format!("#{} {}", item.id, line_item_label(item)))
            .unwrap_or_else(|| "\u{2014}".to_string());
        let confidence = expense.confidence_score.unwrap_or(0.0);
        if confidence >= AUTO_ALLOCATE_THRESHOLD && expense.suggested_line_item_id.is_some() {
            high_confidence += 1;
        }
        table.add_row(vec![
            Cell::new(expense.id),
            Cell::new(&expense.expense_date),
            Cell::new(expense.payee_name.as_deref().unwrap_or_default()),
            Cell::new(money(expense.amount)),
            Cell::new(suggestion),
            Cell::new(confidence_label(confidence)),
        ]);
    }
    println!("Unallocated expenses\n{table}");

    if high_confidence > 0 {
        println!(
            "{} expense(s) at or above {:.0} confidence. Run `jobcost auto` to review and allocate them.",
            high_confidence, AUTO_ALLOCATE_THRESHOLD
        );
    }
    Ok(())
}
