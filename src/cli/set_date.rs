use chrono::NaiveDate;

use crate::cli::open_db;
use crate::error::{PocketbookError, Result};
use crate::store;

pub fn run(date: &str) -> Result<()> {
    let parsed: NaiveDate = date
        .parse()
        .map_err(|_| PocketbookError::BadDate(date.to_string(), "%Y-%m-%d".to_string()))?;
    let conn = open_db()?;
    store::set_reporting_date(&conn, parsed)?;
    println!("Reporting date set to {parsed}");
    Ok(())
}
