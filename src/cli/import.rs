use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{PocketbookError, Result};
use crate::importer::{parse_statement, resolve_aliases};
use crate::reconciler;
use crate::settings::load_settings;
use crate::store;

pub fn run(file: &str, account: &str, commit: bool, dedup: bool) -> Result<()> {
    let settings = load_settings();
    let mut conn = open_db()?;
    let account = store::account_by_name(&conn, account)?;

    let mut rows = parse_statement(&PathBuf::from(file), &account, &settings.statement)?;
    let new_payees = resolve_aliases(&conn, &mut rows)?;

    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Payee",
        "Status",
        "Category",
        "Subcategory",
        "Amount",
        "Account",
    ]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.date_raw),
            Cell::new(&row.payee),
            Cell::new(row.status.as_str()),
            Cell::new(&row.category),
            Cell::new(&row.subcategory),
            Cell::new(&row.amount_raw),
            Cell::new(&row.account_name),
        ]);
    }
    println!("Statement rows\n{table}");

    if !new_payees.is_empty() {
        println!("\n{}", "Unrecognized payees:".yellow().bold());
        for payee in &new_payees {
            println!("  {payee}");
        }
        println!("\nClassify them with `pocketbook payees add <text> --alias <name>` and re-run the import.");
        if commit {
            return Err(PocketbookError::Other(
                "Cannot commit while unrecognized payees remain".to_string(),
            ));
        }
        return Ok(());
    }

    if commit {
        let result = reconciler::commit(&mut conn, &rows, &settings.statement.date_format, dedup)?;
        println!(
            "{} committed, {} mirrored, {} skipped (duplicates)",
            result.committed, result.mirrored, result.skipped
        );
    } else {
        println!("\nDry run; re-run with --commit to save these transactions.");
    }
    Ok(())
}
