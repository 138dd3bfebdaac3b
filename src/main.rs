mod balance;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod reconciler;
mod reports;
mod settings;
mod store;

use clap::Parser;
use colored::Colorize;

use crate::cli::{
    AccountsCommands, AliasesCommands, CategoriesCommands, Cli, Commands, DoubleEntriesCommands,
    PayeesCommands, ReportCommands, SubcategoriesCommands,
};
use crate::error::Result;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli) {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add {
                name,
                account_type,
                initial_balance,
            } => cli::accounts::add(&name, &account_type, &initial_balance),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Categories { command } => match command {
            CategoriesCommands::Add {
                name,
                category_type,
            } => cli::categories::add(&name, &category_type),
            CategoriesCommands::List => cli::categories::list(),
        },
        Commands::Subcategories { command } => match command {
            SubcategoriesCommands::Add { name, category } => {
                cli::subcategories::add(&name, &category)
            }
            SubcategoriesCommands::List => cli::subcategories::list(),
        },
        Commands::Aliases { command } => match command {
            AliasesCommands::Add {
                name,
                category,
                subcategory,
            } => cli::aliases::add(&name, category.as_deref(), subcategory.as_deref()),
            AliasesCommands::List => cli::aliases::list(),
        },
        Commands::Payees { command } => match command {
            PayeesCommands::Add { name, alias } => cli::payees::add(&name, &alias),
            PayeesCommands::List => cli::payees::list(),
        },
        Commands::DoubleEntries { command } => match command {
            DoubleEntriesCommands::Add {
                alias,
                account_a,
                account_b,
            } => cli::double_entries::add(&alias, &account_a, &account_b),
            DoubleEntriesCommands::List => cli::double_entries::list(),
        },
        Commands::Import {
            file,
            account,
            commit,
            dedup,
        } => cli::import::run(&file, &account, commit, dedup),
        Commands::SetDate { date } => cli::set_date::run(&date),
        Commands::Report { command } => match command {
            ReportCommands::Summary => cli::report::summary(),
            ReportCommands::Account { name } => cli::report::account(&name),
            ReportCommands::Category { name } => cli::report::category(&name),
            ReportCommands::Subcategory { name } => cli::report::subcategory(&name),
            ReportCommands::Alias { name } => cli::report::alias(&name),
        },
        Commands::Demo => cli::demo::run(),
    }
}
