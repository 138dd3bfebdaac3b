use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PocketbookError, Result};

/// Column layout of the targeted bank export. Statements differ between
/// banks, so the positions and the date format are configuration rather
/// than constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLayout {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub date_column: usize,
    #[serde(default = "default_payee_column")]
    pub payee_column: usize,
    #[serde(default = "default_amount_column")]
    pub amount_column: usize,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_delimiter() -> char {
    '\t'
}

fn default_payee_column() -> usize {
    1
}

fn default_amount_column() -> usize {
    2
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

impl Default for StatementLayout {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            date_column: 0,
            payee_column: default_payee_column(),
            amount_column: default_amount_column(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default)]
    pub statement: StatementLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            statement: StatementLayout::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pocketbook")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("pocketbook")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PocketbookError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// The `POCKETBOOK_DATA_DIR` override keeps integration tests away from the
/// real config.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("POCKETBOOK_DATA_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    PathBuf::from(&load_settings().data_dir)
}
