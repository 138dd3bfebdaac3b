use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::{PocketbookError, Result};
use crate::models::CategoryType;
use crate::store;

pub fn add(name: &str, category_type: &str) -> Result<()> {
    let category_type = CategoryType::parse(category_type).ok_or_else(|| {
        PocketbookError::Other(format!(
            "Unknown category type: {category_type} (expected income or expense)"
        ))
    })?;
    let conn = open_db()?;
    store::insert_category(&conn, name, category_type)?;
    println!("Added category: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type"]);
    for category in store::all_categories(&conn)? {
        table.add_row(vec![
            Cell::new(category.id),
            Cell::new(&category.name),
            Cell::new(category.category_type.as_str()),
        ]);
    }
    println!("Categories\n{table}");
    Ok(())
}
