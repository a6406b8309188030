// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod property;
mod room;

// Re-export all public types
pub use config::{Config, CrawlerConfig, PathsConfig, SelectorConfig, SiteConfig};
pub use property::{PropertyRef, SiteTemplate};
pub use room::{
    CITY_KEY, PROPERTY_KEY, Price, PriceObservation, ROOM_LINK_KEY, ROOM_NAME_KEY, RoomKey,
    RoomRecord, RoomSample, UNAVAILABLE, date_key, format_date, price_key,
};
