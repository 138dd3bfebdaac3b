use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{PocketbookError, Result};
use crate::store;

pub fn add(alias: &str, account_a: &str, account_b: &str) -> Result<()> {
    let conn = open_db()?;
    let alias = store::alias_by_name(&conn, alias)?;
    let a = store::account_by_name(&conn, account_a)?;
    let b = store::account_by_name(&conn, account_b)?;
    if a.id == b.id {
        return Err(PocketbookError::Other(
            "A double entry needs two distinct accounts".to_string(),
        ));
    }
    store::insert_double_entry(&conn, alias.id, a.id, b.id)?;
    println!("Transactions under '{}' will mirror into '{}'", alias.name, b.name);
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Alias", "Account A", "Account B"]);
    for entry in store::all_double_entries(&conn)? {
        let alias = store::alias_by_id(&conn, entry.alias_id)?;
        let a = store::account_by_id(&conn, entry.account_a)?;
        let b = store::account_by_id(&conn, entry.account_b)?;
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(&alias.name),
            Cell::new(&a.name),
            Cell::new(&b.name),
        ]);
    }
    println!("Double entries\n{table}");
    Ok(())
}
