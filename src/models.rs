use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{PocketbookError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Asset,
    Liability,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            _ => None,
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| Self::parse(s).ok_or(FromSqlError::InvalidType))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()
            .and_then(|s| Self::parse(s).ok_or(FromSqlError::InvalidType))
    }
}

/// Balance is never stored on the account; it is derived from
/// `initial_balance` plus transactions up to a cutoff date.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_type: AccountType,
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: CategoryType,
}

#[derive(Debug, Clone)]
pub struct Subcategory {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

/// Canonical payee label; the unit all reporting keys off.
#[derive(Debug, Clone)]
pub struct Alias {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
}

/// Raw statement text mapped to its canonical alias.
#[derive(Debug, Clone)]
pub struct Payee {
    pub id: i64,
    pub name: String,
    pub alias_id: i64,
}

/// Mirroring rule: transactions under `alias_id` post to `account_b`
/// in addition to the account they were imported into.
#[derive(Debug, Clone)]
pub struct DoubleEntry {
    pub id: i64,
    pub alias_id: i64,
    pub account_a: i64,
    pub account_b: i64,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub alias_id: i64,
    pub amount: Decimal,
    pub account_id: i64,
}

/// Amounts are fixed-point with 2 decimal places, stored as integer cents
/// so SQLite aggregates stay exact. Amounts whose cents do not fit an i64
/// are rejected rather than stored wrong.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    amount
        .round_dp(2)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| PocketbookError::BadAmount(amount.to_string()))
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
