//! Service layer for the scraper.
//!
//! This module contains the business logic for:
//! - Page retrieval (`PageFetcher`, `HttpFetcher`)
//! - Price text normalization (`normalize_price`)
//! - City listing enumeration (`CityEnumerator`)
//! - Property room enumeration (`PropertyEnumerator`)
//! - Room price fetching behind a concurrency cap (`RoomPriceFetcher`)

mod cities;
pub(crate) mod fetcher;
mod price;
mod properties;
mod rooms;

pub use cities::CityEnumerator;
pub use fetcher::{HttpFetcher, PageFetcher};
pub use price::normalize_price;
pub use properties::{PropertyEnumerator, PropertyRooms};
pub use rooms::{ConcurrencyGate, RoomPriceFetcher};
