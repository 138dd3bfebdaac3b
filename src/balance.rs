use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Account, AccountType};
use crate::store;

/// Initial balance plus every transaction dated on or before `as_of`.
/// An account with no qualifying transactions reports its initial balance.
pub fn account_balance(conn: &Connection, account: &Account, as_of: NaiveDate) -> Result<Decimal> {
    Ok(account.initial_balance + store::sum_amount_through(conn, account.id, as_of)?)
}

pub struct PortfolioSummary {
    pub accounts: Vec<(Account, Decimal)>,
    pub assets: Decimal,
    pub liabilities: Decimal,
}

impl PortfolioSummary {
    pub fn capital(&self) -> Decimal {
        self.assets - self.liabilities
    }
}

/// Balance of every account at `as_of`, partitioned into asset and
/// liability totals.
pub fn portfolio_summary(conn: &Connection, as_of: NaiveDate) -> Result<PortfolioSummary> {
    let mut accounts = Vec::new();
    let mut assets = Decimal::ZERO;
    let mut liabilities = Decimal::ZERO;
    for account in store::all_accounts(conn)? {
        let balance = account_balance(conn, &account, as_of)?;
        match account.account_type {
            AccountType::Asset => assets += balance,
            AccountType::Liability => liabilities += balance,
        }
        accounts.push((account, balance));
    }
    Ok(PortfolioSummary {
        accounts,
        assets,
        liabilities,
    })
}

/// Capital change since the end of the previous month. A period-over-period
/// figure, not an income-statement profit.
pub fn profit_delta(conn: &Connection, as_of: NaiveDate) -> Result<Decimal> {
    let current = portfolio_summary(conn, as_of)?;
    let month_start = as_of.with_day(1).unwrap_or(as_of);
    let prev_end = month_start.pred_opt().unwrap_or(month_start);
    let previous = portfolio_summary(conn, prev_end)?;
    Ok(current.capital() - previous.capital())
}
