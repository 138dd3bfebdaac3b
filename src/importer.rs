use std::path::Path;
use std::str::FromStr;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::{PocketbookError, Result};
use crate::models::{to_cents, Account};
use crate::settings::StatementLayout;
use crate::store;

/// Refuse oversized uploads cleanly instead of reading them into memory.
pub const MAX_STATEMENT_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// Payee text not yet matched to a known payee.
    New,
    /// Payee resolved to an alias; classification fields are filled.
    Matched,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Matched => "Matched",
        }
    }
}

/// One candidate transaction from a statement. Dates and amounts stay raw
/// text until commit; classification fields are empty until resolution.
#[derive(Debug, Clone)]
pub struct StatementRow {
    pub account_name: String,
    pub date_raw: String,
    pub payee: String,
    pub status: RowStatus,
    pub category: String,
    pub subcategory: String,
    pub amount_raw: String,
}

pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    let amount = if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        -Decimal::from_str(inner.trim()).map_err(|_| PocketbookError::BadAmount(raw.to_string()))?
    } else {
        Decimal::from_str(s).map_err(|_| PocketbookError::BadAmount(raw.to_string()))?
    };
    let amount = amount.round_dp(2);
    // must be representable as integer cents for storage
    to_cents(amount).map_err(|_| PocketbookError::BadAmount(raw.to_string()))?;
    Ok(amount)
}

/// Decode the statement, discard the first line as a header, and split the
/// remaining lines into rows using the configured delimiter and column
/// positions. Each row is tagged with the owning account's name.
pub fn parse_statement(
    file_path: &Path,
    account: &Account,
    layout: &StatementLayout,
) -> Result<Vec<StatementRow>> {
    if !layout.delimiter.is_ascii() {
        return Err(PocketbookError::Settings(format!(
            "statement delimiter must be an ASCII character, got '{}'",
            layout.delimiter
        )));
    }
    let size = std::fs::metadata(file_path)?.len();
    if size > MAX_STATEMENT_BYTES {
        return Err(PocketbookError::FileTooLarge(size, MAX_STATEMENT_BYTES));
    }
    let bytes = std::fs::read(file_path)?;
    let text = String::from_utf8(bytes).map_err(|_| PocketbookError::BadEncoding)?;

    let needed = layout
        .date_column
        .max(layout.payee_column)
        .max(layout.amount_column)
        + 1;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        if i == 0 {
            // header
            continue;
        }
        let record = result?;
        if record.len() < needed {
            return Err(PocketbookError::MalformedRow(format!(
                "line {}: expected at least {} fields, got {}",
                i + 1,
                needed,
                record.len()
            )));
        }
        rows.push(StatementRow {
            account_name: account.name.clone(),
            date_raw: record[layout.date_column].trim().to_string(),
            payee: record[layout.payee_column].trim().to_string(),
            status: RowStatus::New,
            category: String::new(),
            subcategory: String::new(),
            amount_raw: record[layout.amount_column].trim().to_string(),
        });
    }
    Ok(rows)
}

/// Resolve each row's raw payee text to its alias. Matched rows get the
/// alias name and its category/subcategory; unmatched raw names come back
/// deduplicated in first-seen order for the caller to classify.
pub fn resolve_aliases(conn: &Connection, rows: &mut [StatementRow]) -> Result<Vec<String>> {
    let mut new_payees: Vec<String> = Vec::new();
    for row in rows.iter_mut() {
        if row.status == RowStatus::Matched {
            continue;
        }
        match store::payee_by_name(conn, &row.payee)? {
            Some(payee) => {
                let alias = store::alias_by_id(conn, payee.alias_id)?;
                row.payee = alias.name;
                row.category = match alias.category_id {
                    Some(id) => store::category_by_id(conn, id)?.name,
                    None => String::new(),
                };
                row.subcategory = match alias.subcategory_id {
                    Some(id) => store::subcategory_by_id(conn, id)?.name,
                    None => String::new(),
                };
                row.status = RowStatus::Matched;
            }
            None => {
                if !new_payees.iter().any(|p| p == &row.payee) {
                    new_payees.push(row.payee.clone());
                }
            }
        }
    }
    Ok(new_payees)
}
