use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::store;

pub fn add(name: &str, alias: &str) -> Result<()> {
    let conn = open_db()?;
    let alias = store::alias_by_name(&conn, alias)?;
    store::insert_payee(&conn, name, alias.id)?;
    println!("Mapped payee '{name}' to alias '{}'", alias.name);
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Statement Text", "Alias"]);
    for payee in store::all_payees(&conn)? {
        let alias = store::alias_by_id(&conn, payee.alias_id)?;
        table.add_row(vec![
            Cell::new(payee.id),
            Cell::new(&payee.name),
            Cell::new(&alias.name),
        ]);
    }
    println!("Payees\n{table}");
    Ok(())
}
