// src/pipeline/export.rs

use crate::error::Result;
use crate::models::RoomRecord;
use crate::storage::RecordStorage;

/// Rebuild the tabular export from the persisted records without scraping.
pub async fn run_export(storage: &dyn RecordStorage) -> Result<usize> {
    let records = storage.load_records().await?;
    storage.write_export(&records).await?;
    Ok(records.len())
}

/// Overview of a persisted record collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreInfo {
    pub records: usize,
    /// Longest price history of any record
    pub max_history: usize,
    pub latest_date: Option<chrono::NaiveDate>,
}

impl StoreInfo {
    pub fn from_records(records: &[RoomRecord]) -> Self {
        Self {
            records: records.len(),
            max_history: records.iter().map(|r| r.history.len()).max().unwrap_or(0),
            latest_date: records
                .iter()
                .filter_map(|r| r.latest().map(|o| o.date))
                .max(),
        }
    }
}
