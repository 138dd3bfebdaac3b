use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::balance;
use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::money;
use crate::reports;
use crate::store::{self, ReportTxn};

pub fn summary() -> Result<()> {
    let conn = open_db()?;
    let as_of = store::reporting_date(&conn)?;
    let portfolio = balance::portfolio_summary(&conn, as_of)?;
    let profit_delta = balance::profit_delta(&conn, as_of)?;
    let report = reports::expense_report(&conn, as_of)?;

    println!("Balances as of {as_of}\n");

    let mut table = Table::new();
    table.set_header(vec!["Account", "Type", "Balance"]);
    for (account, bal) in &portfolio.accounts {
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(account.account_type.as_str()),
            Cell::new(money(*bal)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Assets".bold()),
        Cell::new(""),
        Cell::new(money(portfolio.assets)),
    ]);
    table.add_row(vec![
        Cell::new("Liabilities".bold()),
        Cell::new(""),
        Cell::new(money(portfolio.liabilities)),
    ]);
    table.add_row(vec![
        Cell::new("Capital".bold()),
        Cell::new(""),
        Cell::new(money(portfolio.capital())),
    ]);
    println!("{table}");
    println!("Change since end of last month: {}", money(profit_delta));

    let mut cat_table = Table::new();
    cat_table.set_header(vec!["Category", "Total"]);
    for (category, total) in &report.categories {
        cat_table.add_row(vec![Cell::new(&category.name), Cell::new(money(*total))]);
    }
    println!("\nCategory totals for the month\n{cat_table}");

    if !report.subcategories.is_empty() {
        let mut sub_table = Table::new();
        sub_table.set_header(vec!["Subcategory", "Total"]);
        for (subcategory, total) in &report.subcategories {
            sub_table.add_row(vec![Cell::new(&subcategory.name), Cell::new(money(*total))]);
        }
        println!("\nSubcategory totals\n{sub_table}");
    }

    println!("\nIncome: {}", money(report.income).green());
    println!("Expenses: {}", money(report.expenses).red());
    let profit = report.profit();
    let profit_str = if profit >= Decimal::ZERO {
        money(profit).green()
    } else {
        money(profit).red()
    };
    println!("Profit: {profit_str}");
    Ok(())
}

fn print_txns(title: &str, txns: &[ReportTxn], total_label: &str, total: Decimal) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Payee", "Account", "Amount"]);
    for txn in txns {
        table.add_row(vec![
            Cell::new(txn.date),
            Cell::new(&txn.alias_name),
            Cell::new(&txn.account_name),
            Cell::new(money(txn.amount)),
        ]);
    }
    println!("{title}\n{table}");
    println!("{}: {}", total_label, money(total));
}

pub fn account(name: &str) -> Result<()> {
    let conn = open_db()?;
    let as_of = store::reporting_date(&conn)?;
    let account = store::account_by_name(&conn, name)?;
    let txns = store::transactions_for_account(&conn, account.id, as_of)?;
    let balance = balance::account_balance(&conn, &account, as_of)?;

    let mut table = Table::new();
    table.set_header(vec!["Date", "Payee", "Amount"]);
    for txn in &txns {
        let alias = store::alias_by_id(&conn, txn.alias_id)?;
        table.add_row(vec![
            Cell::new(txn.date),
            Cell::new(&alias.name),
            Cell::new(money(txn.amount)),
        ]);
    }
    println!("{} through {as_of}\n{table}", account.name);
    println!("Balance: {}", money(balance));
    Ok(())
}

pub fn category(name: &str) -> Result<()> {
    let conn = open_db()?;
    let as_of = store::reporting_date(&conn)?;
    let category = store::category_by_name(&conn, name)?;
    let txns = store::month_txns_for_category(&conn, category.id, as_of)?;
    let total = reports::category_total(&conn, &category, as_of)?;
    let title = format!("{} in {}", category.name, as_of.format("%B"));
    print_txns(&title, &txns, "Total", total);
    Ok(())
}

pub fn subcategory(name: &str) -> Result<()> {
    let conn = open_db()?;
    let as_of = store::reporting_date(&conn)?;
    let subcategory = store::subcategory_by_name(&conn, name)?;
    let txns = store::month_txns_for_subcategory(&conn, subcategory.id, as_of)?;
    let total = reports::subcategory_total(&conn, &subcategory, as_of)?;
    print_txns(&subcategory.name, &txns, "Total", total);
    Ok(())
}

pub fn alias(name: &str) -> Result<()> {
    let conn = open_db()?;
    let as_of = store::reporting_date(&conn)?;
    let alias = store::alias_by_name(&conn, name)?;
    let txns = store::month_txns_for_alias(&conn, alias.id, as_of)?;
    let total = reports::alias_total(&conn, &alias, as_of)?;
    print_txns(&alias.name, &txns, "Total", total);
    Ok(())
}
