use chrono::NaiveDate;
use colored::Colorize;
use rust_decimal::Decimal;

use crate::cli::open_db;
use crate::error::{PocketbookError, Result};
use crate::models::{AccountType, CategoryType};
use crate::store;

fn d(s: &str) -> Result<NaiveDate> {
    s.parse()
        .map_err(|_| PocketbookError::BadDate(s.to_string(), "%Y-%m-%d".to_string()))
}

fn amt(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Seeds a small ledger so every report has something to show.
pub fn run() -> Result<()> {
    let conn = open_db()?;

    let checking = store::insert_account(&conn, "Natwest", AccountType::Asset, amt(50_000))?;
    let card = store::insert_account(&conn, "Mastercard", AccountType::Liability, amt(3_010))?;

    let food = store::insert_category(&conn, "Food", CategoryType::Expense)?;
    let leisure = store::insert_category(&conn, "Leisure", CategoryType::Expense)?;
    let salary = store::insert_category(&conn, "Salary", CategoryType::Income)?;
    let meals = store::insert_subcategory(&conn, "Meals out", food)?;

    let groceries = store::insert_alias(&conn, "Groceries", Some(food), None)?;
    let restaurants = store::insert_alias(&conn, "Restaurants", Some(food), Some(meals))?;
    let cinema = store::insert_alias(&conn, "Cinema", Some(leisure), None)?;
    let payday = store::insert_alias(&conn, "Payday", Some(salary), None)?;
    let card_payment = store::insert_alias(&conn, "Card payment", None, None)?;

    store::insert_payee(&conn, "TESCO STORES 3417", groceries)?;
    store::insert_payee(&conn, "CHIPOTLE 0734", restaurants)?;
    store::insert_payee(&conn, "CURZON CINEMA LTD", cinema)?;
    store::insert_payee(&conn, "ACME CORP PAYROLL", payday)?;
    store::insert_payee(&conn, "MASTERCARD PAYMENT", card_payment)?;

    store::insert_double_entry(&conn, card_payment, checking, card)?;

    let txns: &[(&str, i64, i64, i64)] = &[
        ("2024-03-01", payday, 180_000, checking),
        ("2024-03-04", groceries, -4_217, checking),
        ("2024-03-09", restaurants, -2_350, checking),
        ("2024-03-12", cinema, -1_500, card),
        ("2024-03-15", groceries, -3_860, checking),
    ];
    for &(date, alias_id, cents, account_id) in txns {
        store::insert_transaction(&conn, d(date)?, alias_id, amt(cents), account_id)?;
    }

    // Mirror the card settlement the way an import commit would.
    let settled = d("2024-03-20")?;
    store::insert_transaction(&conn, settled, card_payment, amt(-3_010), checking)?;
    store::insert_transaction(&conn, settled, card_payment, amt(-3_010), card)?;

    store::set_reporting_date(&conn, d("2024-03-31")?)?;

    println!("{}", "Sample data loaded.".green());
    println!("Try `pocketbook report summary` or `pocketbook report category Food`.");
    Ok(())
}
