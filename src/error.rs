use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobcostError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown project: {0}")]
    UnknownProject(String),

    #[error("Unknown quote: {0}")]
    UnknownQuote(String),

    #[error("Unknown line item: {0}")]
    UnknownLineItem(i64),

    #[error("Expense {0} is already allocated")]
    AlreadyAllocated(i64),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, JobcostError>;
