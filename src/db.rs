use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS payees (
    id INTEGER PRIMARY KEY,
    payee_name TEXT NOT NULL,
    full_name TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS quotes (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL,
    quote_number TEXT NOT NULL,
    payee_name TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (project_id) REFERENCES projects(id)
);

-- Estimate and quote line items share one table (and one id space);
-- quote_id is NULL for estimate items.
CREATE TABLE IF NOT EXISTS line_items (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL,
    quote_id INTEGER,
    category TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    quantity REAL NOT NULL DEFAULT 1,
    price_per_unit REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL DEFAULT 0,
    cost_per_unit REAL NOT NULL DEFAULT 0,
    total_cost REAL NOT NULL DEFAULT 0,
    total_markup REAL NOT NULL DEFAULT 0,
    FOREIGN KEY (project_id) REFERENCES projects(id),
    FOREIGN KEY (quote_id) REFERENCES quotes(id)
);

CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL,
    expense_date TEXT NOT NULL,
    description TEXT,
    amount REAL NOT NULL,
    category TEXT NOT NULL DEFAULT 'other',
    payee_id INTEGER,
    payee_name TEXT,
    is_planned INTEGER DEFAULT 0,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (project_id) REFERENCES projects(id),
    FOREIGN KEY (payee_id) REFERENCES payees(id),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE TABLE IF NOT EXISTS expense_correlations (
    id INTEGER PRIMARY KEY,
    expense_id INTEGER NOT NULL UNIQUE,
    estimate_line_item_id INTEGER,
    quote_id INTEGER,
    correlation_type TEXT NOT NULL,
    auto_correlated INTEGER NOT NULL DEFAULT 0,
    confidence_score REAL,
    notes TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (expense_id) REFERENCES expenses(id),
    FOREIGN KEY (estimate_line_item_id) REFERENCES line_items(id),
    FOREIGN KEY (quote_id) REFERENCES quotes(id),
    CHECK (
        (estimate_line_item_id IS NOT NULL AND quote_id IS NULL)
        OR (estimate_line_item_id IS NULL AND quote_id IS NOT NULL)
    )
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    project_id INTEGER NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    checksum TEXT,
    FOREIGN KEY (project_id) REFERENCES projects(id)
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn project_id_by_name(conn: &Connection, name: &str) -> Result<i64> {
    use crate::error::JobcostError;
    conn.query_row("SELECT id FROM projects WHERE name = ?1", [name], |row| {
        row.get(0)
    })
    .map_err(|_| JobcostError::UnknownProject(name.to_string()))
}
