use thiserror::Error;

#[derive(Error, Debug)]
pub enum PocketbookError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("Statement file too large: {0} bytes (limit {1})")]
    FileTooLarge(u64, u64),

    #[error("Statement is not valid UTF-8")]
    BadEncoding,

    #[error("Malformed statement row: {0}")]
    MalformedRow(String),

    #[error("Unparseable date '{0}' (expected format {1})")]
    BadDate(String, String),

    #[error("Unparseable amount: {0}")]
    BadAmount(String),

    #[error("Subcategory '{0}' does not belong to category '{1}'")]
    SubcategoryMismatch(String, String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PocketbookError>;
