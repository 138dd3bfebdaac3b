use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{AccountType, Alias, Category, CategoryType, Subcategory};
use crate::store::{self, ReportTxn};

/// Expenses paid from an asset account are stored as negative outflows but
/// report as positive magnitudes; liability accounts are already
/// sign-consistent. Transactions with no category never flip.
fn normalized_sum(txns: &[ReportTxn]) -> Decimal {
    txns.iter()
        .map(|t| match (t.category_type, t.account_type) {
            (Some(CategoryType::Expense), AccountType::Asset) => -t.amount,
            _ => t.amount,
        })
        .sum()
}

/// Total for a category in the reference date's calendar month.
pub fn category_total(conn: &Connection, category: &Category, reference: NaiveDate) -> Result<Decimal> {
    let txns = store::month_txns_for_category(conn, category.id, reference)?;
    Ok(normalized_sum(&txns))
}

pub fn subcategory_total(
    conn: &Connection,
    subcategory: &Subcategory,
    reference: NaiveDate,
) -> Result<Decimal> {
    let txns = store::month_txns_for_subcategory(conn, subcategory.id, reference)?;
    Ok(normalized_sum(&txns))
}

pub fn alias_total(conn: &Connection, alias: &Alias, reference: NaiveDate) -> Result<Decimal> {
    let txns = store::month_txns_for_alias(conn, alias.id, reference)?;
    Ok(normalized_sum(&txns))
}

pub struct ExpenseReport {
    /// Categories with a non-zero total, in creation order.
    pub categories: Vec<(Category, Decimal)>,
    pub subcategories: Vec<(Subcategory, Decimal)>,
    pub income: Decimal,
    pub expenses: Decimal,
}

impl ExpenseReport {
    pub fn profit(&self) -> Decimal {
        self.income - self.expenses
    }
}

/// Category and subcategory totals for the reference month. Categories with
/// an exactly-zero total are dropped from the listing; their contribution to
/// the income/expense accumulators is zero either way.
pub fn expense_report(conn: &Connection, reference: NaiveDate) -> Result<ExpenseReport> {
    let mut categories = Vec::new();
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for category in store::all_categories(conn)? {
        let total = category_total(conn, &category, reference)?;
        match category.category_type {
            CategoryType::Income => income += total,
            CategoryType::Expense => expenses += total,
        }
        if total != Decimal::ZERO {
            categories.push((category, total));
        }
    }

    let mut subcategories = Vec::new();
    for subcategory in store::all_subcategories(conn)? {
        let total = subcategory_total(conn, &subcategory, reference)?;
        subcategories.push((subcategory, total));
    }

    Ok(ExpenseReport {
        categories,
        subcategories,
        income,
        expenses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::store::{
        insert_account, insert_alias, insert_category, insert_subcategory, insert_transaction,
    };

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_expense_on_asset_account_negates() {
        let (_dir, conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("500")).unwrap();
        let food_id = insert_category(&conn, "Food", CategoryType::Expense).unwrap();
        let alias = insert_alias(&conn, "Chipotle", Some(food_id), None).unwrap();
        insert_transaction(&conn, date(2021, 11, 3), alias, dec("-13.00"), checking).unwrap();
        let food = store::category_by_name(&conn, "Food").unwrap();
        let total = category_total(&conn, &food, date(2021, 11, 30)).unwrap();
        assert_eq!(total, dec("13.00"));
    }

    #[test]
    fn test_expense_on_liability_account_keeps_sign() {
        let (_dir, conn) = test_db();
        let card = insert_account(&conn, "Mastercard", AccountType::Liability, dec("30.10")).unwrap();
        let other_id = insert_category(&conn, "Other", CategoryType::Expense).unwrap();
        let alias = insert_alias(&conn, "CURZON CINEMA", Some(other_id), None).unwrap();
        insert_transaction(&conn, date(2021, 11, 3), alias, dec("10.50"), card).unwrap();
        let other = store::category_by_name(&conn, "Other").unwrap();
        let total = category_total(&conn, &other, date(2021, 11, 30)).unwrap();
        assert_eq!(total, dec("10.50"));
    }

    #[test]
    fn test_income_category_never_flips() {
        let (_dir, conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("0")).unwrap();
        let salary_id = insert_category(&conn, "Salary", CategoryType::Income).unwrap();
        let alias = insert_alias(&conn, "EMPLOYER LTD", Some(salary_id), None).unwrap();
        insert_transaction(&conn, date(2021, 11, 25), alias, dec("2000.00"), checking).unwrap();
        let salary = store::category_by_name(&conn, "Salary").unwrap();
        assert_eq!(category_total(&conn, &salary, date(2021, 11, 30)).unwrap(), dec("2000.00"));
    }

    #[test]
    fn test_subcategory_total_uses_owning_category_type() {
        let (_dir, conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("0")).unwrap();
        let food = insert_category(&conn, "Food", CategoryType::Expense).unwrap();
        let groceries = insert_subcategory(&conn, "Groceries", food).unwrap();
        let alias = insert_alias(&conn, "Morrison Store", Some(food), Some(groceries)).unwrap();
        insert_transaction(&conn, date(2021, 11, 10), alias, dec("-42.17"), checking).unwrap();
        let sub = store::subcategory_by_name(&conn, "Groceries").unwrap();
        assert_eq!(subcategory_total(&conn, &sub, date(2021, 11, 30)).unwrap(), dec("42.17"));
    }

    #[test]
    fn test_alias_without_category_does_not_flip() {
        let (_dir, conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("0")).unwrap();
        let alias_id = insert_alias(&conn, "CARD PAYMENT", None, None).unwrap();
        insert_transaction(&conn, date(2021, 11, 8), alias_id, dec("-50.00"), checking).unwrap();
        let alias = store::alias_by_name(&conn, "CARD PAYMENT").unwrap();
        assert_eq!(alias_total(&conn, &alias, date(2021, 11, 30)).unwrap(), dec("-50.00"));
    }

    #[test]
    fn test_alias_total_normalizes_when_categorized() {
        let (_dir, conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("0")).unwrap();
        let food = insert_category(&conn, "Food", CategoryType::Expense).unwrap();
        let alias_id = insert_alias(&conn, "Chipotle", Some(food), None).unwrap();
        insert_transaction(&conn, date(2021, 11, 3), alias_id, dec("-13.00"), checking).unwrap();
        let alias = store::alias_by_name(&conn, "Chipotle").unwrap();
        assert_eq!(alias_total(&conn, &alias, date(2021, 11, 30)).unwrap(), dec("13.00"));
    }

    #[test]
    fn test_expense_report_drops_zero_total_categories() {
        let (_dir, conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("0")).unwrap();
        let food = insert_category(&conn, "Food", CategoryType::Expense).unwrap();
        insert_category(&conn, "Travel", CategoryType::Expense).unwrap();
        let alias = insert_alias(&conn, "Chipotle", Some(food), None).unwrap();
        insert_transaction(&conn, date(2021, 11, 3), alias, dec("-13.00"), checking).unwrap();
        let report = expense_report(&conn, date(2021, 11, 30)).unwrap();
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].0.name, "Food");
    }

    #[test]
    fn test_expense_report_accumulators() {
        let (_dir, conn) = test_db();
        let card = insert_account(&conn, "Mastercard", AccountType::Liability, dec("30.10")).unwrap();
        insert_account(&conn, "Natwest", AccountType::Asset, dec("500")).unwrap();
        let other = insert_category(&conn, "Other", CategoryType::Expense).unwrap();
        let food = insert_category(&conn, "Food", CategoryType::Expense).unwrap();
        let meals = insert_subcategory(&conn, "Meals", food).unwrap();
        let curzon = insert_alias(&conn, "CURZON CINEMA", Some(other), None).unwrap();
        let chipotle = insert_alias(&conn, "CHIPOTLE", Some(food), Some(meals)).unwrap();
        insert_transaction(&conn, date(2021, 11, 3), curzon, dec("10.50"), card).unwrap();
        insert_transaction(&conn, date(2021, 10, 27), chipotle, dec("7.00"), card).unwrap();

        let report = expense_report(&conn, date(2021, 11, 3)).unwrap();
        assert_eq!(report.income, Decimal::ZERO);
        assert_eq!(report.expenses, dec("10.50"));
        assert_eq!(report.profit(), dec("-10.50"));
    }

    // Accounts Checking(Asset, 500) and Card(Liability, 30.50), Food expense
    // via Chipotle: full path from stored transaction to report totals.
    #[test]
    fn test_end_to_end_scenario() {
        let (_dir, conn) = test_db();
        let checking = insert_account(&conn, "Checking", AccountType::Asset, dec("500")).unwrap();
        insert_account(&conn, "Card", AccountType::Liability, dec("30.50")).unwrap();
        let food_id = insert_category(&conn, "Food", CategoryType::Expense).unwrap();
        let alias = insert_alias(&conn, "Chipotle", Some(food_id), None).unwrap();
        insert_transaction(&conn, date(2021, 11, 3), alias, dec("-13.00"), checking).unwrap();

        let account = store::account_by_name(&conn, "Checking").unwrap();
        let balance =
            crate::balance::account_balance(&conn, &account, date(2021, 11, 30)).unwrap();
        assert_eq!(balance, dec("487.00"));

        let food = store::category_by_name(&conn, "Food").unwrap();
        assert_eq!(category_total(&conn, &food, date(2021, 11, 15)).unwrap(), dec("13.00"));

        let summary = crate::balance::portfolio_summary(&conn, date(2021, 11, 30)).unwrap();
        assert_eq!(summary.assets, dec("487.00"));
        assert_eq!(summary.liabilities, dec("30.50"));
        assert_eq!(summary.capital(), dec("456.50"));
    }
}
