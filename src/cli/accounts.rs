use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::cli::open_db;
use crate::error::{PocketbookError, Result};
use crate::fmt::money;
use crate::models::AccountType;
use crate::store;

pub fn add(name: &str, account_type: &str, initial_balance: &str) -> Result<()> {
    let account_type = AccountType::parse(account_type)
        .ok_or_else(|| PocketbookError::Other(format!("Unknown account type: {account_type} (expected asset or liability)")))?;
    let initial_balance: Decimal = initial_balance
        .parse()
        .map_err(|_| PocketbookError::BadAmount(initial_balance.to_string()))?;
    let conn = open_db()?;
    store::insert_account(&conn, name, account_type, initial_balance)?;
    println!("Added account: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let accounts = store::all_accounts(&conn)?;
    let as_of = store::reporting_date(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Initial Balance", "Balance"]);
    for account in accounts {
        let balance = crate::balance::account_balance(&conn, &account, as_of)?;
        table.add_row(vec![
            Cell::new(account.id),
            Cell::new(&account.name),
            Cell::new(account.account_type.as_str()),
            Cell::new(money(account.initial_balance)),
            Cell::new(money(balance)),
        ]);
    }
    println!("Accounts as of {as_of}\n{table}");
    Ok(())
}
