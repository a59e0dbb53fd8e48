use crate::allocator::{bulk_assign, unassign};
use crate::error::Result;
use crate::fmt::money;

pub fn run(expenses: &[i64], item: i64) -> Result<()> {
    let mut conn = crate::cli::open_db()?;
    let assigned = bulk_assign(&mut conn, expenses, item)?;

    let mut total = 0.0;
    for &id in expenses {
        let amount: f64 = conn
            .query_row("SELECT amount FROM expenses WHERE id = ?1", [id], |row| row.get(0))
            .unwrap_or(0.0);
        total += amount;
    }
    println!("Assigned {assigned} expense(s) ({}) to line item {item}.", money(total));
    Ok(())
}

pub fn undo(expenses: &[i64]) -> Result<()> {
    let mut conn = crate::cli::open_db()?;
    let removed = unassign(&mut conn, expenses)?;
    println!("Returned {removed} expense(s) to the unallocated pool.");
    Ok(())
}
