use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::confidence::mapped_line_categories;
use crate::error::Result;
use crate::matcher::fuzzy_match_payee;
use crate::models::PartialPayee;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -inner.trim().parse::<f64>().unwrap_or(0.0);
    }
    s.parse().unwrap_or(0.0)
}

/// Accepts M/D/YYYY or ISO YYYY-MM-DD; returns ISO.
pub fn parse_expense_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let m: u32 = parts[0].parse().ok()?;
    let d: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(y, m, d).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Unknown categories fall back to 'other' so the confidence model's
/// category map stays the single source of truth.
pub fn normalize_category(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    if key.is_empty() || mapped_line_categories(&key).is_empty() {
        "other".to_string()
    } else {
        key
    }
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn is_duplicate_row(conn: &Connection, project_id: i64, row: &ParsedExpense) -> bool {
    let Ok(mut stmt) = conn.prepare_cached(
        "SELECT 1 FROM expenses WHERE project_id = ?1 AND expense_date = ?2 AND amount = ?3 \
         AND COALESCE(description, '') = ?4",
    ) else {
        return false;
    };
    stmt.exists(rusqlite::params![
        project_id,
        row.date,
        row.amount,
        row.description
    ])
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ParsedExpense {
    pub date: String,
    pub payee: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
}

pub fn parse_expense_csv(file_path: &Path) -> Result<Vec<ParsedExpense>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut rows = Vec::new();
    let mut found_header = false;
    let (mut idx_date, mut idx_payee, mut idx_desc, mut idx_amount, mut idx_cat) = (0, 1, 2, 3, 4);

    for result in rdr.records() {
        let Ok(record) = result else { continue };
        if !found_header {
            if record.iter().any(|f| f.trim().eq_ignore_ascii_case("Date"))
                && record.iter().any(|f| f.trim().eq_ignore_ascii_case("Amount"))
            {
                for (i, field) in record.iter().enumerate() {
                    let f = field.trim();
                    if f.eq_ignore_ascii_case("Date") { idx_date = i; }
                    if f.eq_ignore_ascii_case("Payee") { idx_payee = i; }
                    if f.eq_ignore_ascii_case("Description") { idx_desc = i; }
                    if f.eq_ignore_ascii_case("Amount") { idx_amount = i; }
                    if f.eq_ignore_ascii_case("Category") { idx_cat = i; }
                }
                found_header = true;
            }
            continue;
        }
        let min_cols = [idx_date, idx_payee, idx_desc, idx_amount]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1;
        if record.len() < min_cols || record[idx_date].trim().is_empty() {
            continue;
        }
        let Some(date) = parse_expense_date(&record[idx_date]) else {
            continue;
        };
        let amount = parse_amount(&record[idx_amount]);
        if amount == 0.0 {
            continue;
        }
        let category = record
            .get(idx_cat)
            .map(normalize_category)
            .unwrap_or_else(|| "other".to_string());
        rows.push(ParsedExpense {
            date,
            payee: record[idx_payee].trim().to_string(),
            description: record[idx_desc].trim().to_string(),
            amount,
            category,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Payee resolution
// ---------------------------------------------------------------------------

fn load_payees(conn: &Connection) -> Result<Vec<PartialPayee>> {
    let mut stmt = conn.prepare("SELECT id, payee_name, full_name FROM payees")?;
    let payees = stmt
        .query_map([], |row| {
            Ok(PartialPayee {
                id: row.get(0)?,
                payee_name: row.get(1)?,
                full_name: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(payees)
}

/// Fuzzy-link a raw payee string to an existing payee, creating one when no
/// candidate clears the auto-accept bar. Returns (payee_id, created).
fn resolve_payee(conn: &Connection, raw_name: &str, payees: &mut Vec<PartialPayee>) -> Result<(Option<i64>, bool)> {
    let name = raw_name.trim();
    if name.is_empty() {
        return Ok((None, false));
    }
    if let Some(best) = fuzzy_match_payee(name, payees).best_match {
        return Ok((Some(best.payee.id), false));
    }
    conn.execute("INSERT INTO payees (payee_name) VALUES (?1)", [name])?;
    let id = conn.last_insert_rowid();
    payees.push(PartialPayee {
        id,
        payee_name: name.to_string(),
        full_name: None,
    });
    Ok((Some(id), true))
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub duplicate_file: bool,
    pub new_payees: usize,
}

pub fn import_file(conn: &Connection, file_path: &Path, project_id: i64) -> Result<ImportResult> {
    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt =
            conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND project_id = ?2")?;
        if stmt.exists(rusqlite::params![checksum, project_id])? {
            return Ok(ImportResult {
                imported: 0,
                skipped: 0,
                duplicate_file: true,
                new_payees: 0,
            });
        }
    }

    let parsed_rows = parse_expense_csv(file_path)?;
    let mut payees = load_payees(conn)?;

    let mut imported = 0usize;
    let mut skipped = 0usize;
    let mut new_payees = 0usize;
    for row in &parsed_rows {
        if is_duplicate_row(conn, project_id, row) {
            skipped += 1;
            continue;
        }
        let (payee_id, created) = resolve_payee(conn, &row.payee, &mut payees)?;
        if created {
            new_payees += 1;
        }
        conn.execute(
            "INSERT INTO expenses (project_id, expense_date, description, amount, category, payee_id, payee_name) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                project_id,
                row.date,
                row.description,
                row.amount,
                row.category,
                payee_id,
                row.payee,
            ],
        )?;
        imported += 1;
    }

    let dates: Vec<&str> = parsed_rows.iter().map(|r| r.date.as_str()).collect();
    let min_date = dates.iter().min().copied();
    let max_date = dates.iter().max().copied();
    conn.execute(
        "INSERT INTO imports (filename, project_id, record_count, date_range_start, date_range_end, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            project_id,
            parsed_rows.len() as i64,
            min_date,
            max_date,
            checksum,
        ],
    )?;

    Ok(ImportResult {
        imported,
        skipped,
        duplicate_file: false,
        new_payees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_project(conn: &Connection) -> i64 {
        conn.execute("INSERT INTO projects (name) VALUES ('Maple St Remodel')", []).unwrap();
        conn.last_insert_rowid()
    }

    fn write_csv(dir: &Path, name: &str, rows: &[(&str, &str, &str, &str, &str)]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut content = String::from("Date,Payee,Description,Amount,Category\n");
        for (date, payee, desc, amt, cat) in rows {
            content.push_str(&format!("{date},{payee},{desc},{amt},{cat}\n"));
        }
        std::fs::write(&path, &content).unwrap();
        path
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("$500.00"), 500.0);
        assert_eq!(parse_amount("(250.00)"), -250.0);
        assert_eq!(parse_amount("not_a_number"), 0.0);
    }

    #[test]
    fn test_parse_expense_date() {
        assert_eq!(parse_expense_date("03/15/2026"), Some("2026-03-15".to_string()));
        assert_eq!(parse_expense_date("2026-03-15"), Some("2026-03-15".to_string()));
        assert_eq!(parse_expense_date("02/30/2026"), None);
        assert_eq!(parse_expense_date("soon"), None);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("Materials"), "materials");
        assert_eq!(normalize_category("SUBCONTRACTOR"), "subcontractor");
        assert_eq!(normalize_category("snacks"), "other");
        assert_eq!(normalize_category(""), "other");
    }

    #[test]
    fn test_import_inserts_expenses() {
        let (dir, conn) = test_db();
        let project = add_project(&conn);
        let csv = write_csv(dir.path(), "expenses.csv", &[
            ("03/01/2026", "Smith Plumbing", "rough-in deposit", "2500.00", "subcontractor"),
            ("03/05/2026", "Home Depot", "lumber", "430.12", "materials"),
        ]);
        let result = import_file(&conn, &csv, project).unwrap();
        assert_eq!(result.imported, 2);
        assert!(!result.duplicate_file);
        let count: i64 = conn.query_row("SELECT count(*) FROM expenses", [], |r| r.get(0)).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_import_detects_duplicate_file() {
        let (dir, conn) = test_db();
        let project = add_project(&conn);
        let csv = write_csv(dir.path(), "expenses.csv", &[
            ("03/01/2026", "Smith Plumbing", "rough-in deposit", "2500.00", "subcontractor"),
        ]);
        assert_eq!(import_file(&conn, &csv, project).unwrap().imported, 1);
        let again = import_file(&conn, &csv, project).unwrap();
        assert!(again.duplicate_file);
        assert_eq!(again.imported, 0);
    }

    #[test]
    fn test_import_detects_duplicate_rows() {
        let (dir, conn) = test_db();
        let project = add_project(&conn);
        let first = write_csv(dir.path(), "a.csv", &[
            ("03/01/2026", "Smith Plumbing", "rough-in deposit", "2500.00", "subcontractor"),
            ("03/05/2026", "Home Depot", "lumber", "430.12", "materials"),
        ]);
        import_file(&conn, &first, project).unwrap();
        let second = write_csv(dir.path(), "b.csv", &[
            ("03/05/2026", "Home Depot", "lumber", "430.12", "materials"),
            ("03/09/2026", "Home Depot", "fasteners", "62.40", "materials"),
        ]);
        let result = import_file(&conn, &second, project).unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_import_links_payees_fuzzily() {
        let (dir, conn) = test_db();
        let project = add_project(&conn);
        conn.execute(
            "INSERT INTO payees (payee_name, full_name) VALUES ('Smith Plumbing', 'Smith Plumbing LLC')",
            [],
        ).unwrap();
        let csv = write_csv(dir.path(), "expenses.csv", &[
            ("03/01/2026", "Smith Plumbing LLC", "deposit", "2500.00", "subcontractor"),
            ("03/02/2026", "Totally New Vendor", "misc", "100.00", "other"),
        ]);
        let result = import_file(&conn, &csv, project).unwrap();
        assert_eq!(result.new_payees, 1);

        let linked: i64 = conn.query_row(
            "SELECT payee_id FROM expenses WHERE payee_name = 'Smith Plumbing LLC'",
            [], |r| r.get(0),
        ).unwrap();
        assert_eq!(linked, 1);

        let payee_count: i64 = conn.query_row("SELECT count(*) FROM payees", [], |r| r.get(0)).unwrap();
        assert_eq!(payee_count, 2);
    }

    #[test]
    fn test_import_skips_rows_without_amount() {
        let (dir, conn) = test_db();
        let project = add_project(&conn);
        let csv = write_csv(dir.path(), "expenses.csv", &[
            ("03/01/2026", "Smith Plumbing", "deposit", "0", "subcontractor"),
            ("03/02/2026", "Home Depot", "lumber", "50.00", "materials"),
        ]);
        let result = import_file(&conn, &csv, project).unwrap();
        assert_eq!(result.imported, 1);
    }
}
