//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::parse_selector;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Listing site and the cities to scrape
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors for the listing, property, and room pages
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Output file names, relative to the storage directory
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_attempts == 0 {
            return Err(AppError::validation("crawler.max_attempts must be > 0"));
        }
        Url::parse(&self.site.base_url)
            .map_err(|e| AppError::validation(format!("site.base_url is invalid: {e}")))?;
        if self.site.cities.is_empty() {
            return Err(AppError::validation("No cities defined"));
        }
        if self.site.direct_price_marker.trim().is_empty() {
            return Err(AppError::validation("site.direct_price_marker is empty"));
        }
        for selector in self.selectors.all() {
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum number of room pages fetched at the same time
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Attempts per room page before the price is marked unavailable
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: usize,

    /// Pause between attempts in milliseconds (0 retries immediately)
    #[serde(default)]
    pub retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_attempts: defaults::max_attempts(),
            retry_delay_ms: 0,
        }
    }
}

/// Listing site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// City listing pages live at `{base_url}{city}`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// City identifiers to scrape
    #[serde(default = "defaults::cities")]
    pub cities: Vec<String>,

    /// Property addresses containing this marker list their rooms inline
    #[serde(default = "defaults::direct_price_marker")]
    pub direct_price_marker: String,

    /// Inline rooms are kept only when their tenancy text contains this
    #[serde(default = "defaults::tenancy_filter")]
    pub tenancy_filter: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            cities: defaults::cities(),
            direct_price_marker: defaults::direct_price_marker(),
            tenancy_filter: defaults::tenancy_filter(),
        }
    }
}

impl SiteConfig {
    /// Listing page address for a city.
    pub fn city_url(&self, city: &str) -> String {
        format!("{}{}", self.base_url, city)
    }
}

/// CSS selectors used to pick data out of each page type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Property link on a city listing page
    #[serde(default = "defaults::property_card")]
    pub property_card: String,

    /// Room card on a property page
    #[serde(default = "defaults::room_card")]
    pub room_card: String,

    /// Link inside a room card
    #[serde(default = "defaults::room_card_link")]
    pub room_card_link: String,

    /// Price element on a room page
    #[serde(default = "defaults::room_price")]
    pub room_price: String,

    /// Room container on an inline-priced property page
    #[serde(default = "defaults::direct_room_container")]
    pub direct_room_container: String,

    /// Room name inside an inline room container
    #[serde(default = "defaults::direct_room_name")]
    pub direct_room_name: String,

    /// Weekly price inside an inline room container
    #[serde(default = "defaults::direct_room_price")]
    pub direct_room_price: String,

    /// Tenancy length inside an inline room container
    #[serde(default = "defaults::direct_tenancy")]
    pub direct_tenancy: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            property_card: defaults::property_card(),
            room_card: defaults::room_card(),
            room_card_link: defaults::room_card_link(),
            room_price: defaults::room_price(),
            direct_room_container: defaults::direct_room_container(),
            direct_room_name: defaults::direct_room_name(),
            direct_room_price: defaults::direct_room_price(),
            direct_tenancy: defaults::direct_tenancy(),
        }
    }
}

impl SelectorConfig {
    fn all(&self) -> [&str; 8] {
        [
            &self.property_card,
            &self.room_card,
            &self.room_card_link,
            &self.room_price,
            &self.direct_room_container,
            &self.direct_room_name,
            &self.direct_room_price,
            &self.direct_tenancy,
        ]
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Canonical JSON record store
    #[serde(default = "defaults::records_file")]
    pub records_file: String,

    /// Flattened CSV export
    #[serde(default = "defaults::export_file")]
    pub export_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            records_file: defaults::records_file(),
            export_file: defaults::export_file(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; roomwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        8
    }
    pub fn max_attempts() -> usize {
        5
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://wearehomesforstudents.com/student-accommodation/".into()
    }
    pub fn cities() -> Vec<String> {
        vec!["nottingham".into()]
    }
    pub fn direct_price_marker() -> String {
        "evostudent".into()
    }
    pub fn tenancy_filter() -> String {
        "51".into()
    }

    // Selector defaults
    pub fn property_card() -> String {
        "a.PropertyCard__link".into()
    }
    pub fn room_card() -> String {
        ".RoomCard".into()
    }
    pub fn room_card_link() -> String {
        "a".into()
    }
    pub fn room_price() -> String {
        ".RoomHero__price".into()
    }
    pub fn direct_room_container() -> String {
        ".et_pb_column".into()
    }
    pub fn direct_room_name() -> String {
        ".room-name h2".into()
    }
    pub fn direct_room_price() -> String {
        ".price-per-week".into()
    }
    pub fn direct_tenancy() -> String {
        ".tenancy-length".into()
    }

    // Path defaults
    pub fn records_file() -> String {
        "urbium.json".into()
    }
    pub fn export_file() -> String {
        "urbium.csv".into()
    }
}
