// src/models/room.rs

//! Room samples and their persisted price history.
//!
//! A [`RoomRecord`] is stored as a flat JSON object:
//!
//! ```text
//! {
//!   "City": "nottingham",
//!   "Property URL": "https://.../the-place/",
//!   "Room Link": "https://.../the-place/gold-studio",
//!   "Room Name": "gold-studio",
//!   "Room Price1": 199.5,
//!   "Date1": "2026-10-17",
//!   "Room Price2": "N/A",
//!   "Date2": "2026-10-18"
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

pub const CITY_KEY: &str = "City";
pub const PROPERTY_KEY: &str = "Property URL";
pub const ROOM_LINK_KEY: &str = "Room Link";
pub const ROOM_NAME_KEY: &str = "Room Name";
pub const PRICE_PREFIX: &str = "Room Price";
pub const DATE_PREFIX: &str = "Date";

/// Marker written in place of a price that could not be retrieved.
pub const UNAVAILABLE: &str = "N/A";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A scraped price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Amount(f64),
    Unavailable,
}

impl Price {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Amount(value) => Some(*value),
            Price::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Price::Amount(_))
    }

    fn to_value(self) -> Value {
        match self {
            Price::Amount(value) => serde_json::Number::from_f64(value)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(UNAVAILABLE.to_string())),
            Price::Unavailable => Value::String(UNAVAILABLE.to_string()),
        }
    }

    fn from_value(value: &Value) -> Self {
        value
            .as_f64()
            .map(Price::Amount)
            .unwrap_or(Price::Unavailable)
    }
}

impl From<Option<f64>> for Price {
    fn from(value: Option<f64>) -> Self {
        value.map(Price::Amount).unwrap_or(Price::Unavailable)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(value) => write!(f, "{value}"),
            Price::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// One room price observed during a scrape run.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSample {
    pub city: String,
    pub property_url: String,
    /// Absent for rooms listed inline on their property page
    pub room_link: Option<String>,
    pub room_name: String,
    pub price: Price,
    pub date: NaiveDate,
}

impl RoomSample {
    pub fn key(&self) -> RoomKey<'_> {
        RoomKey::new(self.room_link.as_deref(), &self.room_name, &self.property_url)
    }
}

/// Identity of a room across scrape runs.
///
/// Rooms with their own page are identified by that address. Inline rooms
/// have none, so they fall back to name plus property; two inline rooms
/// sharing a name within one property therefore share a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKey<'a> {
    Link(&'a str),
    Named { name: &'a str, property: &'a str },
}

impl<'a> RoomKey<'a> {
    pub fn new(room_link: Option<&'a str>, name: &'a str, property: &'a str) -> Self {
        match room_link {
            Some(link) => RoomKey::Link(link),
            None => RoomKey::Named { name, property },
        }
    }
}

/// A single (price, date) history entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceObservation {
    pub price: Price,
    pub date: NaiveDate,
}

/// Persisted price history for one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Map<String, Value>", try_from = "Map<String, Value>")]
pub struct RoomRecord {
    pub city: String,
    pub property_url: String,
    pub room_link: Option<String>,
    pub room_name: String,
    /// Entry `i` is written as `Room Price{i+1}` / `Date{i+1}`
    pub history: Vec<PriceObservation>,
}

impl RoomRecord {
    pub fn key(&self) -> RoomKey<'_> {
        RoomKey::new(self.room_link.as_deref(), &self.room_name, &self.property_url)
    }

    /// Append an observation at the next free index.
    pub fn push(&mut self, price: Price, date: NaiveDate) {
        self.history.push(PriceObservation { price, date });
    }

    pub fn latest(&self) -> Option<&PriceObservation> {
        self.history.last()
    }
}

impl From<&RoomSample> for RoomRecord {
    fn from(sample: &RoomSample) -> Self {
        Self {
            city: sample.city.clone(),
            property_url: sample.property_url.clone(),
            room_link: sample.room_link.clone(),
            room_name: sample.room_name.clone(),
            history: vec![PriceObservation {
                price: sample.price,
                date: sample.date,
            }],
        }
    }
}

/// Column name for the `n`-th price (1-based).
pub fn price_key(n: usize) -> String {
    format!("{PRICE_PREFIX}{n}")
}

/// Column name for the `n`-th date (1-based).
pub fn date_key(n: usize) -> String {
    format!("{DATE_PREFIX}{n}")
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl From<RoomRecord> for Map<String, Value> {
    fn from(record: RoomRecord) -> Self {
        let mut map = Map::new();
        map.insert(CITY_KEY.into(), Value::String(record.city));
        map.insert(PROPERTY_KEY.into(), Value::String(record.property_url));
        map.insert(
            ROOM_LINK_KEY.into(),
            record.room_link.map(Value::String).unwrap_or(Value::Null),
        );
        map.insert(ROOM_NAME_KEY.into(), Value::String(record.room_name));

        for (i, observation) in record.history.into_iter().enumerate() {
            map.insert(price_key(i + 1), observation.price.to_value());
            map.insert(date_key(i + 1), Value::String(format_date(observation.date)));
        }
        map
    }
}

impl TryFrom<Map<String, Value>> for RoomRecord {
    type Error = AppError;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        let text = |key: &str| -> Result<String> {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| AppError::record(format!("missing or non-string '{key}'")))
        };

        let city = text(CITY_KEY)?;
        let property_url = text(PROPERTY_KEY)?;
        let room_name = text(ROOM_NAME_KEY)?;
        let room_link = match map.get(ROOM_LINK_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(link)) => Some(link.clone()),
            Some(other) => {
                return Err(AppError::record(format!(
                    "'{ROOM_LINK_KEY}' must be a string or null, got {other}"
                )));
            }
        };

        let mut prices: BTreeMap<usize, Price> = BTreeMap::new();
        let mut dates: BTreeMap<usize, NaiveDate> = BTreeMap::new();

        for (key, value) in &map {
            if let Some(n) = history_index(key, PRICE_PREFIX) {
                prices.insert(n, Price::from_value(value));
            } else if let Some(n) = history_index(key, DATE_PREFIX) {
                let raw = value
                    .as_str()
                    .ok_or_else(|| AppError::record(format!("'{key}' must be a date string")))?;
                let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
                    .map_err(|e| AppError::record(format!("'{key}' = '{raw}': {e}")))?;
                dates.insert(n, date);
            }
        }

        if prices.len() != dates.len() || prices.keys().ne(dates.keys()) {
            return Err(AppError::record(format!(
                "price and date entries do not pair up for '{room_name}'"
            )));
        }

        let history = prices
            .into_iter()
            .zip(dates.into_values())
            .map(|((_, price), date)| PriceObservation { price, date })
            .collect();

        Ok(Self {
            city,
            property_url,
            room_link,
            room_name,
            history,
        })
    }
}

/// History index encoded in a key. The unnumbered form counts as entry 1.
fn history_index(key: &str, prefix: &str) -> Option<usize> {
    let suffix = key.strip_prefix(prefix)?;
    if suffix.is_empty() {
        return Some(1);
    }
    suffix.parse::<usize>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn sample_record() -> RoomRecord {
        RoomRecord {
            city: "nottingham".into(),
            property_url: "https://example.com/p/the-place/".into(),
            room_link: Some("https://example.com/p/the-place/gold".into()),
            room_name: "gold".into(),
            history: vec![
                PriceObservation {
                    price: Price::Amount(199.5),
                    date: date("2026-10-17"),
                },
                PriceObservation {
                    price: Price::Unavailable,
                    date: date("2026-10-18"),
                },
            ],
        }
    }

    #[test]
    fn test_serialize_numbered_keys_in_order() {
        let value = serde_json::to_value(sample_record()).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert_eq!(
            keys,
            vec![
                "City",
                "Property URL",
                "Room Link",
                "Room Name",
                "Room Price1",
                "Date1",
                "Room Price2",
                "Date2"
            ]
        );
        assert_eq!(value["Room Price1"], json!(199.5));
        assert_eq!(value["Room Price2"], json!("N/A"));
        assert_eq!(value["Date2"], json!("2026-10-18"));
    }

    #[test]
    fn test_deserialize_written_record() {
        let record = sample_record();
        let text = serde_json::to_string(&record).unwrap();
        let loaded: RoomRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_deserialize_legacy_unnumbered_first_entry() {
        let loaded: RoomRecord = serde_json::from_value(json!({
            "City": "nottingham",
            "Property URL": "https://evostudent.co.uk/x/",
            "Room Link": null,
            "Room Name": "Classic Ensuite",
            "Room Price": 150.0,
            "Date": "2026-10-01",
            "Room Price2": null,
            "Date2": "2026-10-02",
            "Room Price3": 155,
            "Date3": "2026-10-03"
        }))
        .unwrap();

        assert_eq!(loaded.room_link, None);
        assert_eq!(loaded.history.len(), 3);
        assert_eq!(loaded.history[0].price, Price::Amount(150.0));
        assert_eq!(loaded.history[1].price, Price::Unavailable);
        assert_eq!(loaded.history[2].date, date("2026-10-03"));
    }

    #[test]
    fn test_deserialize_rejects_unpaired_entries() {
        let result: std::result::Result<RoomRecord, _> = serde_json::from_value(json!({
            "City": "nottingham",
            "Property URL": "https://example.com/p/",
            "Room Link": "https://example.com/p/a",
            "Room Name": "a",
            "Room Price1": 100,
            "Date1": "2026-10-01",
            "Room Price2": 110
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_history_index() {
        assert_eq!(history_index("Room Price", PRICE_PREFIX), Some(1));
        assert_eq!(history_index("Room Price12", PRICE_PREFIX), Some(12));
        assert_eq!(history_index("Date0", DATE_PREFIX), None);
        assert_eq!(history_index("Room Name", PRICE_PREFIX), None);
    }

    #[test]
    fn test_key_falls_back_to_name_and_property() {
        let mut record = sample_record();
        assert_eq!(
            record.key(),
            RoomKey::Link("https://example.com/p/the-place/gold")
        );

        record.room_link = None;
        assert_eq!(
            record.key(),
            RoomKey::Named {
                name: "gold",
                property: "https://example.com/p/the-place/"
            }
        );
    }
}
