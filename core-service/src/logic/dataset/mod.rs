//! Dataset Module - Tavern sales and dashboard datasets
//!
//! CSV loaders for the tavern training data and the two analytics exports
//! (cross-validation with t-SNE coordinates, global price impact), plus the
//! hero source the predictor looks heroes up in.

pub mod analytics;
pub mod heroes;
pub mod tavern;


use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;

pub use analytics::{quintiles, CrossValidationRow, PriceImpact};
pub use heroes::{HeroSource, SnapshotSource};
pub use tavern::{DatasetSummary, TavernSale};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("hero {0} not found")]
    UnknownHero(u64),

    #[error("dataset `{0}` is empty")]
    Empty(String),
}

/// Read every record of a headered CSV file
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let file = File::open(path)?;
    read_csv_from(file)
}

pub fn read_csv_from<T: DeserializeOwned, R: std::io::Read>(reader: R) -> Result<Vec<T>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let records = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
    Ok(records)
}

/// `"123,45"` and `"123.45"` both parse
pub(crate) fn decimal_comma<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let text = String::deserialize(deserializer)?;
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| serde::de::Error::custom(format!("invalid decimal `{}`", text)))
}
