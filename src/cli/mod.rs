pub mod accounts;
pub mod aliases;
pub mod categories;
pub mod demo;
pub mod double_entries;
pub mod import;
pub mod init;
pub mod payees;
pub mod report;
pub mod set_date;
pub mod subcategories;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::get_data_dir;

pub(crate) fn open_db() -> Result<Connection> {
    let conn = get_connection(&get_data_dir().join("pocketbook.db"))?;
    init_db(&conn)?;
    Ok(conn)
}

#[derive(Parser)]
#[command(
    name = "pocketbook",
    about = "Personal finance tracker: import statements, classify payees, report balances."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up pocketbook: choose a data directory and initialize the database.
    Init {
        /// Path for pocketbook data (default: ~/Documents/pocketbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage subcategories.
    Subcategories {
        #[command(subcommand)]
        command: SubcategoriesCommands,
    },
    /// Manage aliases (canonical payee labels carrying classification).
    Aliases {
        #[command(subcommand)]
        command: AliasesCommands,
    },
    /// Manage payee-to-alias mappings.
    Payees {
        #[command(subcommand)]
        command: PayeesCommands,
    },
    /// Manage double-entry mirroring rules.
    DoubleEntries {
        #[command(subcommand)]
        command: DoubleEntriesCommands,
    },
    /// Parse a bank statement, resolve payees, and optionally commit.
    Import {
        /// Path to the statement file
        file: String,
        /// Account name the statement belongs to
        #[arg(long)]
        account: String,
        /// Persist the resolved rows as transactions
        #[arg(long)]
        commit: bool,
        /// Skip rows whose (date, alias, amount, account) already exist
        #[arg(long)]
        dedup: bool,
    },
    /// Pin the reporting as-of date (YYYY-MM-DD).
    SetDate {
        date: String,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Load sample data to explore pocketbook.
    Demo,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Account name, e.g. 'Natwest'
        name: String,
        /// Account type: asset, liability
        #[arg(long = "type")]
        account_type: String,
        /// Opening balance
        #[arg(long = "initial-balance", default_value = "0")]
        initial_balance: String,
    },
    /// List all accounts.
    List,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// Add a category.
    Add {
        name: String,
        /// Category type: income, expense
        #[arg(long = "type")]
        category_type: String,
    },
    /// List all categories.
    List,
}

#[derive(Subcommand)]
pub enum SubcategoriesCommands {
    /// Add a subcategory under a category.
    Add {
        name: String,
        /// Owning category name
        #[arg(long)]
        category: String,
    },
    /// List all subcategories.
    List,
}

#[derive(Subcommand)]
pub enum AliasesCommands {
    /// Add an alias, optionally classified under a category/subcategory.
    Add {
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
    },
    /// List all aliases.
    List,
}

#[derive(Subcommand)]
pub enum PayeesCommands {
    /// Map a raw statement payee name to an alias.
    Add {
        /// Raw payee text as it appears on statements
        name: String,
        /// Alias to resolve to
        #[arg(long)]
        alias: String,
    },
    /// List all payee mappings.
    List,
}

#[derive(Subcommand)]
pub enum DoubleEntriesCommands {
    /// Add a mirroring rule: transactions under the alias also post to account B.
    Add {
        #[arg(long)]
        alias: String,
        /// Account the statement rows are imported into
        #[arg(long = "account-a")]
        account_a: String,
        /// Account that receives the mirrored transaction
        #[arg(long = "account-b")]
        account_b: String,
    },
    /// List all mirroring rules.
    List,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Balances, capital and category totals at the as-of date.
    Summary,
    /// Transactions for one account through the as-of date.
    Account { name: String },
    /// Transactions for one category in the as-of month.
    Category { name: String },
    /// Transactions for one subcategory in the as-of month.
    Subcategory { name: String },
    /// Transactions for one alias in the as-of month.
    Alias { name: String },
}
