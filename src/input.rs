use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, Result};
use crate::types::{BoardRow, StockRow};

pub const BOARDS_FILE: &str = "boards.csv";
pub const STOCK_FILE: &str = "stock.csv";
pub const CONFIG_FILE: &str = "config.json";

/// Everything read from an input directory.
#[derive(Debug, Clone)]
pub struct InputSet {
    pub stock: Vec<StockRow>,
    pub boards: Vec<BoardRow>,
    /// `config.json` when present.
    pub config: Option<LayoutConfig>,
}

/// Loads `boards.csv`, `stock.csv` and the optional `config.json` from `dir`.
pub fn load_dir(dir: &Path) -> Result<InputSet> {
    let stock = read_rows(&required(dir, STOCK_FILE)?)?;
    let boards = read_rows(&required(dir, BOARDS_FILE)?)?;

    let config_path = dir.join(CONFIG_FILE);
    let config = if config_path.is_file() {
        Some(LayoutConfig::from_json_file(&config_path)?)
    } else {
        None
    };

    tracing::info!(
        dir = %dir.display(),
        stock = stock.len(),
        boards = boards.len(),
        has_config = config.is_some(),
        "loaded input"
    );
    Ok(InputSet {
        stock,
        boards,
        config,
    })
}

fn required(dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(LayoutError::MissingConfig { path });
    }
    Ok(path)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    read_rows_from(std::fs::File::open(path)?)
}

/// Reads header-keyed rows; unknown columns are ignored.
pub fn read_rows_from<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
