use std::path::Path;

use colored::Colorize;

use crate::cli::{open_db, resolve_project};
use crate::error::Result;
use crate::importer::import_file;

pub fn run(file: &str, project: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let project_id = resolve_project(&conn, project)?;

    let result = import_file(&conn, Path::new(file), project_id)?;
    if result.duplicate_file {
        println!("{}", "This file was already imported (checksum match). Nothing to do.".yellow());
        return Ok(());
    }
    println!(
        "Imported {} expenses ({} duplicate rows skipped, {} new payees).",
        result.imported, result.skipped, result.new_payees
    );
    println!("Run `jobcost suggest` to see allocation suggestions.");
    Ok(())
}
