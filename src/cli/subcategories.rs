use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::store;

pub fn add(name: &str, category: &str) -> Result<()> {
    let conn = open_db()?;
    let category = store::category_by_name(&conn, category)?;
    store::insert_subcategory(&conn, name, category.id)?;
    println!("Added subcategory: {name} (under {})", category.name);
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Category"]);
    for subcategory in store::all_subcategories(&conn)? {
        let category = store::category_by_id(&conn, subcategory.category_id)?;
        table.add_row(vec![
            Cell::new(subcategory.id),
            Cell::new(&subcategory.name),
            Cell::new(&category.name),
        ]);
    }
    println!("Subcategories\n{table}");
    Ok(())
}
