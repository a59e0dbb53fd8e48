use crate::cli::open_db;
use crate::error::Result;
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    println!("Database: {}", db_path().display());
    if !settings.default_project.is_empty() {
        println!("Default project: {}", settings.default_project);
    }

    let conn = open_db()?;
    let projects: i64 = conn.query_row("SELECT count(*) FROM projects", [], |r| r.get(0))?;
    let expenses: i64 = conn.query_row("SELECT count(*) FROM expenses", [], |r| r.get(0))?;
    let unallocated: i64 = conn.query_row(
        "SELECT count(*) FROM expenses e LEFT JOIN expense_correlations c ON c.expense_id = e.id \
         WHERE c.id IS NULL",
        [],
        |r| r.get(0),
    )?;
    let correlations: i64 = conn.query_row("SELECT count(*) FROM expense_correlations", [], |r| r.get(0))?;
    let auto: i64 = conn.query_row(
        "SELECT count(*) FROM expense_correlations WHERE auto_correlated = 1",
        [],
        |r| r.get(0),
    )?;

    println!("Projects: {projects}");
    println!("Expenses: {expenses} ({unallocated} unallocated)");
    println!("Correlations: {correlations} ({auto} auto-correlated)");
    Ok(())
}
