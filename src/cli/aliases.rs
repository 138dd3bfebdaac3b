use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::store;

pub fn add(name: &str, category: Option<&str>, subcategory: Option<&str>) -> Result<()> {
    let conn = open_db()?;
    let category_id = match category {
        Some(c) => Some(store::category_by_name(&conn, c)?.id),
        None => None,
    };
    let subcategory_id = match subcategory {
        Some(s) => Some(store::subcategory_by_name(&conn, s)?.id),
        None => None,
    };
    store::insert_alias(&conn, name, category_id, subcategory_id)?;
    println!("Added alias: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Category", "Subcategory"]);
    for alias in store::all_aliases(&conn)? {
        let category = match alias.category_id {
            Some(id) => store::category_by_id(&conn, id)?.name,
            None => String::new(),
        };
        let subcategory = match alias.subcategory_id {
            Some(id) => store::subcategory_by_id(&conn, id)?.name,
            None => String::new(),
        };
        table.add_row(vec![
            Cell::new(alias.id),
            Cell::new(&alias.name),
            Cell::new(category),
            Cell::new(subcategory),
        ]);
    }
    println!("Aliases\n{table}");
    Ok(())
}
