// src/storage/export.rs

//! Flattened CSV export of room records.

use std::io::Write;

use crate::error::Result;
use crate::models::{
    CITY_KEY, PROPERTY_KEY, ROOM_LINK_KEY, ROOM_NAME_KEY, RoomRecord, date_key, format_date,
    price_key,
};

/// Header row wide enough for the longest price history in `records`.
pub fn header(records: &[RoomRecord]) -> Vec<String> {
    let depth = records.iter().map(|r| r.history.len()).max().unwrap_or(0);

    let mut columns: Vec<String> = [CITY_KEY, PROPERTY_KEY, ROOM_LINK_KEY, ROOM_NAME_KEY]
        .iter()
        .map(|c| c.to_string())
        .collect();
    for n in 1..=depth {
        columns.push(price_key(n));
        columns.push(date_key(n));
    }
    columns
}

/// One CSV row per record; cells past a record's history stay empty.
fn row(record: &RoomRecord, width: usize) -> Vec<String> {
    let mut cells = vec![
        record.city.clone(),
        record.property_url.clone(),
        record.room_link.clone().unwrap_or_default(),
        record.room_name.clone(),
    ];
    for observation in &record.history {
        cells.push(observation.price.to_string());
        cells.push(format_date(observation.date));
    }
    cells.resize(width, String::new());
    cells
}

/// Write `records` as CSV to `writer`.
pub fn write_csv<W: Write>(writer: W, records: &[RoomRecord]) -> Result<()> {
    let columns = header(records);
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&columns)?;
    for record in records {
        wtr.write_record(row(record, columns.len()))?;
    }
    wtr.flush()?;
    Ok(())
}
