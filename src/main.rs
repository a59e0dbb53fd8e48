mod allocator;
mod cli;
mod confidence;
mod db;
mod error;
mod fmt;
mod importer;
mod matcher;
mod models;
mod reports;
mod settings;
mod similarity;

use clap::Parser;

use cli::{Cli, Commands, ItemsCommands, ProjectsCommands, QuotesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Projects { command } => match command {
            ProjectsCommands::Add { name, default } => cli::projects::add(&name, default),
            ProjectsCommands::List => cli::projects::list(),
        },
        Commands::Quotes { command } => match command {
            QuotesCommands::Add {
                number,
                project,
                payee,
                status,
            } => cli::quotes::add(&number, project.as_deref(), &payee, &status),
            QuotesCommands::List { project } => cli::quotes::list(project.as_deref()),
        },
        Commands::Items { command } => match command {
            ItemsCommands::Add {
                project,
                quote,
                category,
                description,
                quantity,
                price_per_unit,
                cost_per_unit,
            } => cli::items::add(
                project.as_deref(),
                quote.as_deref(),
                &category,
                &description,
                quantity,
                price_per_unit,
                cost_per_unit,
            ),
            ItemsCommands::List { project } => cli::items::list(project.as_deref()),
        },
        Commands::Import { file, project } => cli::import::run(&file, project.as_deref()),
        Commands::Expenses {
            project,
            unallocated,
        } => cli::expenses::list(project.as_deref(), unallocated),
        Commands::Suggest { project } => cli::suggest::run(project.as_deref()),
        Commands::Assign { expenses, item } => cli::assign::run(&expenses, item),
        Commands::Unassign { expenses } => cli::assign::undo(&expenses),
        Commands::Auto { project, yes } => cli::auto::run(project.as_deref(), yes),
        Commands::Report { project } => cli::report::run(project.as_deref()),
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
