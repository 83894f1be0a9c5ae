use thiserror::Error;

/// Errors raised while editing, summarising or exporting a schedule.
#[derive(Error, Debug)]
pub enum LoanError {
    /// An edited payment cell could not be read as a number
    #[error("Validation error: {0}")]
    Validation(String),

    /// A calculation has no defined value for its inputs
    #[error("Undefined result: {0}")]
    UndefinedResult(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LoanError>;
