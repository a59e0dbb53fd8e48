pub mod assign;
pub mod auto;
pub mod demo;
pub mod expenses;
pub mod import;
pub mod init;
pub mod items;
pub mod projects;
pub mod quotes;
pub mod report;
pub mod status;
pub mod suggest;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, project_id_by_name};
use crate::error::{JobcostError, Result};
use crate::settings::{db_path, load_settings};

pub(crate) fn open_db() -> Result<Connection> {
    let path = db_path();
    if !path.exists() {
        return Err(JobcostError::Other(
            "No database found. Run `jobcost init` first.".to_string(),
        ));
    }
    get_connection(&path)
}

/// Resolve the project from `--project` or the configured default.
pub(crate) fn resolve_project(conn: &Connection, project: Option<&str>) -> Result<i64> {
    if let Some(name) = project {
        return project_id_by_name(conn, name);
    }
    let default = load_settings().default_project;
    if default.is_empty() {
        return Err(JobcostError::Other(
            "No project given. Pass --project or set default_project in settings.".to_string(),
        ));
    }
    project_id_by_name(conn, &default)
}

#[derive(Parser)]
#[command(name = "jobcost", about = "Expense-to-line-item allocation CLI for construction projects.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up jobcost: choose a data directory and initialize the database.
    Init {
        /// Path for jobcost data (default: ~/Documents/jobcost)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage projects.
    Projects {
        #[command(subcommand)]
        command: ProjectsCommands,
    },
    /// Manage subcontractor quotes.
    Quotes {
        #[command(subcommand)]
        command: QuotesCommands,
    },
    /// Manage estimate and quote line items.
    Items {
        #[command(subcommand)]
        command: ItemsCommands,
    },
    /// Import an expense CSV into a project.
    Import {
        /// Path to CSV file (Date,Payee,Description,Amount,Category)
        file: String,
        /// Project name
        #[arg(long)]
        project: Option<String>,
    },
    /// List project expenses.
    Expenses {
        #[arg(long)]
        project: Option<String>,
        /// Only show expenses with no allocation
        #[arg(long)]
        unallocated: bool,
    },
    /// Show suggested allocations for unallocated expenses.
    Suggest {
        #[arg(long)]
        project: Option<String>,
    },
    /// Assign expenses to a line item.
    Assign {
        /// Expense IDs (shown in `jobcost suggest`)
        #[arg(required = true)]
        expenses: Vec<i64>,
        /// Target line item ID
        #[arg(long)]
        item: i64,
    },
    /// Return expenses to the unallocated pool.
    Unassign {
        /// Expense IDs
        #[arg(required = true)]
        expenses: Vec<i64>,
    },
    /// Auto-allocate high-confidence expenses after review.
    Auto {
        #[arg(long)]
        project: Option<String>,
        /// Skip the interactive confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Allocation summary per estimate line item and accepted quote.
    Report {
        #[arg(long)]
        project: Option<String>,
    },
    /// Load sample data (project, line items, quote, expenses) to explore jobcost.
    Demo,
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum ProjectsCommands {
    /// Add a new project.
    Add {
        /// Project name, e.g. 'Maple St Remodel'
        name: String,
        /// Make it the default project for other commands
        #[arg(long)]
        default: bool,
    },
    /// List all projects.
    List,
}

#[derive(Subcommand)]
pub enum QuotesCommands {
    /// Add a quote to a project.
    Add {
        /// Quote number, e.g. 'Q-101'
        number: String,
        #[arg(long)]
        project: Option<String>,
        /// Subcontractor payee name
        #[arg(long)]
        payee: String,
        /// Quote status: pending, accepted, declined
        #[arg(long, default_value = "pending")]
        status: String,
    },
    /// List quotes for a project.
    List {
        #[arg(long)]
        project: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ItemsCommands {
    /// Add a line item to the project estimate, or to a quote via --quote.
    Add {
        #[arg(long)]
        project: Option<String>,
        /// Attach to a quote (by quote number) instead of the estimate
        #[arg(long)]
        quote: Option<String>,
        /// Line item category: labor_internal, subcontractors, materials,
        /// equipment, permits, management, other
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "1")]
        quantity: f64,
        /// Unit price charged to the client
        #[arg(long = "unit-price", default_value = "0")]
        price_per_unit: f64,
        /// Unit cost to the business
        #[arg(long = "unit-cost", default_value = "0")]
        cost_per_unit: f64,
    },
    /// List line items (estimate + accepted quotes) for a project.
    List {
        #[arg(long)]
        project: Option<String>,
    },
}
