//! Pipeline entry points for scraper operations.
//!
//! - `run_scraper`: Scrape every configured city and merge into the store
//! - `run_export`: Rebuild the CSV export from the store
//! - `run_validate`: Check the configuration

pub mod export;
pub mod merge;
pub mod scrape;
pub mod validate;

pub use export::{StoreInfo, run_export};
pub use merge::{MergeStats, merge, merge_with_stats};
pub use scrape::{ScrapeOutcome, run_scraper};
pub use validate::run_validate;
