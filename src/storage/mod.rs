//! Storage abstractions for room record persistence.
//!
//! The whole record collection is loaded at the start of a run and rewritten
//! at the end. Alongside the canonical JSON store a flattened CSV export is
//! regenerated from the same collection.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml     # Scraper configuration
//! ├── urbium.json     # Canonical room records with price history
//! └── urbium.csv      # One row per room, one column per history field
//! ```

pub mod export;
pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RoomRecord;

// Re-export for convenience
pub use export::write_csv;
pub use local::LocalStorage;

/// Trait for room record storage backends.
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Load every persisted record. A missing store is an empty collection.
    async fn load_records(&self) -> Result<Vec<RoomRecord>>;

    /// Replace the persisted collection with `records`.
    async fn save_records(&self, records: &[RoomRecord]) -> Result<()>;

    /// Write the flattened tabular export of `records`.
    async fn write_export(&self, records: &[RoomRecord]) -> Result<()>;

    /// Human-readable location of the record store, for logging.
    fn location(&self) -> String;
}
