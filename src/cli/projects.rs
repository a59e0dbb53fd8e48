use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn add(name: &str, make_default: bool) -> Result<()> {
    let conn = open_db()?;
    conn.execute("INSERT INTO projects (name) VALUES (?1)", [name])?;
    println!("Added project: {name}");

    if make_default {
        let mut settings = load_settings();
        settings.default_project = name.to_string();
        save_settings(&settings)?;
        println!("Set as default project.");
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, \
                (SELECT count(*) FROM expenses e WHERE e.project_id = p.id), \
                (SELECT count(*) FROM line_items li WHERE li.project_id = p.id) \
         FROM projects p ORDER BY p.name",
    )?;
    let rows: Vec<(i64, String, i64, i64)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Expenses", "Line items"]);
    for (id, name, expenses, items) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(expenses),
            Cell::new(items),
        ]);
    }
    println!("Projects\n{table}");
    Ok(())
}
