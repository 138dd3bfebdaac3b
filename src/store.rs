//! Query interface over the SQLite ledger. Every function returns
//! materialized rows; callers never hold open cursors.

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::error::{PocketbookError, Result};
use crate::models::{
    from_cents, to_cents, Account, AccountType, Alias, Category, CategoryType, DoubleEntry, Payee,
    Subcategory, Transaction,
};

// ---------------------------------------------------------------------------
// Row mappers
// ---------------------------------------------------------------------------

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        account_type: row.get(2)?,
        initial_balance: from_cents(row.get(3)?),
    })
}

fn category_from_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        category_type: row.get(2)?,
    })
}

fn subcategory_from_row(row: &Row) -> rusqlite::Result<Subcategory> {
    Ok(Subcategory {
        id: row.get(0)?,
        name: row.get(1)?,
        category_id: row.get(2)?,
    })
}

fn alias_from_row(row: &Row) -> rusqlite::Result<Alias> {
    Ok(Alias {
        id: row.get(0)?,
        name: row.get(1)?,
        category_id: row.get(2)?,
        subcategory_id: row.get(3)?,
    })
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

const ACCOUNT_COLS: &str = "id, name, account_type, initial_balance_cents";

pub fn insert_account(
    conn: &Connection,
    name: &str,
    account_type: AccountType,
    initial_balance: Decimal,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO accounts (name, account_type, initial_balance_cents) VALUES (?1, ?2, ?3)",
        params![name, account_type, to_cents(initial_balance)?],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn all_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!("SELECT {ACCOUNT_COLS} FROM accounts ORDER BY id"))?;
    let rows = stmt
        .query_map([], account_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn account_by_name(conn: &Connection, name: &str) -> Result<Account> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE name = ?1"),
        [name],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("account", name.to_string()))
}

pub fn account_by_id(conn: &Connection, id: i64) -> Result<Account> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLS} FROM accounts WHERE id = ?1"),
        [id],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("account", format!("#{id}")))
}

// ---------------------------------------------------------------------------
// Categories and subcategories
// ---------------------------------------------------------------------------

pub fn insert_category(conn: &Connection, name: &str, category_type: CategoryType) -> Result<i64> {
    conn.execute(
        "INSERT INTO categories (name, category_type) VALUES (?1, ?2)",
        params![name, category_type],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn all_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, category_type FROM categories ORDER BY id")?;
    let rows = stmt
        .query_map([], category_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn category_by_name(conn: &Connection, name: &str) -> Result<Category> {
    conn.query_row(
        "SELECT id, name, category_type FROM categories WHERE name = ?1",
        [name],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("category", name.to_string()))
}

pub fn category_by_id(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        "SELECT id, name, category_type FROM categories WHERE id = ?1",
        [id],
        category_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("category", format!("#{id}")))
}

pub fn insert_subcategory(conn: &Connection, name: &str, category_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO subcategories (name, category_id) VALUES (?1, ?2)",
        params![name, category_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn all_subcategories(conn: &Connection) -> Result<Vec<Subcategory>> {
    let mut stmt = conn.prepare("SELECT id, name, category_id FROM subcategories ORDER BY id")?;
    let rows = stmt
        .query_map([], subcategory_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn subcategory_by_name(conn: &Connection, name: &str) -> Result<Subcategory> {
    conn.query_row(
        "SELECT id, name, category_id FROM subcategories WHERE name = ?1",
        [name],
        subcategory_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("subcategory", name.to_string()))
}

pub fn subcategory_by_id(conn: &Connection, id: i64) -> Result<Subcategory> {
    conn.query_row(
        "SELECT id, name, category_id FROM subcategories WHERE id = ?1",
        [id],
        subcategory_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("subcategory", format!("#{id}")))
}

// ---------------------------------------------------------------------------
// Aliases and payees
// ---------------------------------------------------------------------------

pub fn insert_alias(
    conn: &Connection,
    name: &str,
    category_id: Option<i64>,
    subcategory_id: Option<i64>,
) -> Result<i64> {
    if let (Some(cat_id), Some(sub_id)) = (category_id, subcategory_id) {
        let subcategory = subcategory_by_id(conn, sub_id)?;
        if subcategory.category_id != cat_id {
            let category = category_by_id(conn, cat_id)?;
            return Err(PocketbookError::SubcategoryMismatch(
                subcategory.name,
                category.name,
            ));
        }
    }
    conn.execute(
        "INSERT INTO aliases (name, category_id, subcategory_id) VALUES (?1, ?2, ?3)",
        params![name, category_id, subcategory_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn all_aliases(conn: &Connection) -> Result<Vec<Alias>> {
    let mut stmt =
        conn.prepare("SELECT id, name, category_id, subcategory_id FROM aliases ORDER BY id")?;
    let rows = stmt
        .query_map([], alias_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn alias_by_name(conn: &Connection, name: &str) -> Result<Alias> {
    conn.query_row(
        "SELECT id, name, category_id, subcategory_id FROM aliases WHERE name = ?1",
        [name],
        alias_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("alias", name.to_string()))
}

pub fn alias_by_id(conn: &Connection, id: i64) -> Result<Alias> {
    conn.query_row(
        "SELECT id, name, category_id, subcategory_id FROM aliases WHERE id = ?1",
        [id],
        alias_from_row,
    )
    .optional()?
    .ok_or_else(|| PocketbookError::NotFound("alias", format!("#{id}")))
}

pub fn insert_payee(conn: &Connection, name: &str, alias_id: i64) -> Result<i64> {
    conn.execute(
        "INSERT INTO payees (name, alias_id) VALUES (?1, ?2)",
        params![name, alias_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn all_payees(conn: &Connection) -> Result<Vec<Payee>> {
    let mut stmt = conn.prepare("SELECT id, name, alias_id FROM payees ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Payee {
                id: row.get(0)?,
                name: row.get(1)?,
                alias_id: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// A miss here is the expected "new payee" branch, not an error.
pub fn payee_by_name(conn: &Connection, name: &str) -> Result<Option<Payee>> {
    let payee = conn
        .query_row(
            "SELECT id, name, alias_id FROM payees WHERE name = ?1",
            [name],
            |row| {
                Ok(Payee {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    alias_id: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(payee)
}

// ---------------------------------------------------------------------------
// Double entries
// ---------------------------------------------------------------------------

pub fn insert_double_entry(
    conn: &Connection,
    alias_id: i64,
    account_a: i64,
    account_b: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO double_entries (alias_id, account_a, account_b) VALUES (?1, ?2, ?3)",
        params![alias_id, account_a, account_b],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn all_double_entries(conn: &Connection) -> Result<Vec<DoubleEntry>> {
    let mut stmt =
        conn.prepare("SELECT id, alias_id, account_a, account_b FROM double_entries ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(DoubleEntry {
                id: row.get(0)?,
                alias_id: row.get(1)?,
                account_a: row.get(2)?,
                account_b: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Most aliases carry no mirroring rule; `None` is the normal case.
pub fn double_entry_for_alias(conn: &Connection, alias_id: i64) -> Result<Option<DoubleEntry>> {
    let entry = conn
        .query_row(
            "SELECT id, alias_id, account_a, account_b FROM double_entries WHERE alias_id = ?1",
            [alias_id],
            |row| {
                Ok(DoubleEntry {
                    id: row.get(0)?,
                    alias_id: row.get(1)?,
                    account_a: row.get(2)?,
                    account_b: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(entry)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub fn insert_transaction(
    conn: &Connection,
    date: NaiveDate,
    alias_id: i64,
    amount: Decimal,
    account_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (date, alias_id, amount_cents, account_id) VALUES (?1, ?2, ?3, ?4)",
        params![date, alias_id, to_cents(amount)?, account_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn transaction_exists(
    conn: &Connection,
    date: NaiveDate,
    alias_id: i64,
    amount: Decimal,
    account_id: i64,
) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transactions WHERE date = ?1 AND alias_id = ?2 AND amount_cents = ?3 AND account_id = ?4",
    )?;
    Ok(stmt.exists(params![date, alias_id, to_cents(amount)?, account_id])?)
}

/// Server-side aggregate over `date <= as_of`; zero when nothing matches.
pub fn sum_amount_through(conn: &Connection, account_id: i64, as_of: NaiveDate) -> Result<Decimal> {
    let cents: i64 = conn.query_row(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM transactions WHERE account_id = ?1 AND date <= ?2",
        params![account_id, as_of],
        |row| row.get(0),
    )?;
    Ok(from_cents(cents))
}

pub fn latest_transaction_date(conn: &Connection) -> Result<Option<NaiveDate>> {
    let date: Option<NaiveDate> =
        conn.query_row("SELECT MAX(date) FROM transactions", [], |row| row.get(0))?;
    Ok(date)
}

pub fn transactions_for_account(
    conn: &Connection,
    account_id: i64,
    as_of: NaiveDate,
) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, alias_id, amount_cents, account_id FROM transactions \
         WHERE account_id = ?1 AND date <= ?2 ORDER BY date, id",
    )?;
    let rows = stmt
        .query_map(params![account_id, as_of], |row| {
            Ok(Transaction {
                id: row.get(0)?,
                date: row.get(1)?,
                alias_id: row.get(2)?,
                amount: from_cents(row.get(3)?),
                account_id: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Month-scoped report queries
// ---------------------------------------------------------------------------

/// One transaction with the context the sign-normalization rule needs.
#[derive(Debug, Clone)]
pub struct ReportTxn {
    pub date: NaiveDate,
    pub alias_name: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub category_type: Option<CategoryType>,
    pub amount: Decimal,
}

fn report_txn_from_row(row: &Row) -> rusqlite::Result<ReportTxn> {
    Ok(ReportTxn {
        date: row.get(0)?,
        alias_name: row.get(1)?,
        account_name: row.get(2)?,
        account_type: row.get(3)?,
        category_type: row.get(4)?,
        amount: from_cents(row.get(5)?),
    })
}

fn month_param(reference: NaiveDate) -> String {
    format!("{:02}", reference.month())
}

/// Calendar-month filter, any year. The original system filtered reports by
/// month number alone and that behavior is kept; see DESIGN.md.
pub fn month_txns_for_category(
    conn: &Connection,
    category_id: i64,
    reference: NaiveDate,
) -> Result<Vec<ReportTxn>> {
    let mut stmt = conn.prepare(
        "SELECT t.date, al.name, a.name, a.account_type, c.category_type, t.amount_cents \
         FROM transactions t \
         JOIN aliases al ON t.alias_id = al.id \
         JOIN accounts a ON t.account_id = a.id \
         JOIN categories c ON al.category_id = c.id \
         WHERE al.category_id = ?1 AND substr(t.date, 6, 2) = ?2 \
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt
        .query_map(params![category_id, month_param(reference)], report_txn_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn month_txns_for_subcategory(
    conn: &Connection,
    subcategory_id: i64,
    reference: NaiveDate,
) -> Result<Vec<ReportTxn>> {
    let mut stmt = conn.prepare(
        "SELECT t.date, al.name, a.name, a.account_type, c.category_type, t.amount_cents \
         FROM transactions t \
         JOIN aliases al ON t.alias_id = al.id \
         JOIN accounts a ON t.account_id = a.id \
         JOIN subcategories s ON al.subcategory_id = s.id \
         JOIN categories c ON s.category_id = c.id \
         WHERE al.subcategory_id = ?1 AND substr(t.date, 6, 2) = ?2 \
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt
        .query_map(params![subcategory_id, month_param(reference)], report_txn_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn month_txns_for_alias(
    conn: &Connection,
    alias_id: i64,
    reference: NaiveDate,
) -> Result<Vec<ReportTxn>> {
    let mut stmt = conn.prepare(
        "SELECT t.date, al.name, a.name, a.account_type, c.category_type, t.amount_cents \
         FROM transactions t \
         JOIN aliases al ON t.alias_id = al.id \
         JOIN accounts a ON t.account_id = a.id \
         LEFT JOIN categories c ON al.category_id = c.id \
         WHERE t.alias_id = ?1 AND substr(t.date, 6, 2) = ?2 \
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt
        .query_map(params![alias_id, month_param(reference)], report_txn_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Parameters (reporting as-of date)
// ---------------------------------------------------------------------------

/// Get-or-create: a pinned date wins; otherwise the latest transaction date
/// is pinned and returned; an empty ledger falls back to today unpinned.
pub fn reporting_date(conn: &Connection) -> Result<NaiveDate> {
    let pinned: Option<NaiveDate> = conn
        .query_row("SELECT as_of_date FROM parameters WHERE id = 1", [], |row| row.get(0))
        .optional()?;
    if let Some(date) = pinned {
        return Ok(date);
    }
    if let Some(latest) = latest_transaction_date(conn)? {
        set_reporting_date(conn, latest)?;
        return Ok(latest);
    }
    Ok(chrono::Local::now().date_naive())
}

/// Single atomic replace-or-create of the singleton row.
pub fn set_reporting_date(conn: &Connection, date: NaiveDate) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO parameters (id, as_of_date) VALUES (1, ?1)",
        params![date],
    )?;
    Ok(())
}
