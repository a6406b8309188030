// src/pipeline/scrape.rs

//! Scrape cycle: cities → properties → room prices → merge → persist.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures::future::join_all;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{Config, Price, PropertyRef, RoomSample};
use crate::pipeline::merge::{MergeStats, merge_with_stats};
use crate::services::{
    CityEnumerator, PageFetcher, PropertyEnumerator, PropertyRooms, RoomPriceFetcher,
};
use crate::storage::RecordStorage;
use crate::utils::{console, last_path_segment};

const TOTAL_STEPS: usize = 5;

/// Summary of a scrape run.
#[derive(Debug, Clone, Default)]
pub struct ScrapeOutcome {
    pub cities: usize,
    pub properties: usize,
    /// Samples collected this run, inline and fetched
    pub samples: usize,
    /// Room pages whose price could not be retrieved
    pub unavailable: usize,
    pub records_before: usize,
    pub records_after: usize,
    pub merge: MergeStats,
    pub elapsed: Duration,
}

/// A room page still to be priced, with the property it belongs to.
struct RoomJob<'a> {
    property: &'a PropertyRef,
    link: String,
}

/// Run one full scrape cycle and persist the merged records.
///
/// Failures while enumerating a city or property are logged and that branch
/// contributes nothing; the cycle still persists whatever was collected.
/// Storage errors abort the run.
pub async fn run_scraper(
    config: &Config,
    storage: &dyn RecordStorage,
    fetcher: Arc<dyn PageFetcher>,
    run_date: NaiveDate,
) -> Result<ScrapeOutcome> {
    let start = Instant::now();
    console::header(&format!("Scraping room prices for {run_date}"));

    let existing = storage.load_records().await?;
    let mut outcome = ScrapeOutcome {
        records_before: existing.len(),
        ..ScrapeOutcome::default()
    };

    let cities = CityEnumerator::new(
        Arc::clone(&fetcher),
        &config.site,
        &config.selectors.property_card,
    )?;
    let properties_enum = PropertyEnumerator::new(
        Arc::clone(&fetcher),
        &config.selectors,
        config.site.tenancy_filter.clone(),
    )?;
    let rooms = RoomPriceFetcher::new(fetcher, &config.crawler, &config.selectors.room_price)?;

    console::step(1, TOTAL_STEPS, "Enumerate cities");
    let properties = enumerate_cities(&cities, &config.site.cities).await;
    outcome.cities = config.site.cities.len();
    outcome.properties = properties.len();

    console::step(2, TOTAL_STEPS, "Enumerate properties");
    let concurrency = config.crawler.max_concurrent.max(1);
    let (jobs, mut samples) =
        enumerate_properties(&properties_enum, &properties, run_date, concurrency).await;
    log::info!(
        "Queued {} room pages, {} rooms priced inline",
        jobs.len(),
        samples.len()
    );

    console::step(3, TOTAL_STEPS, "Fetch room prices");
    let fetched = fetch_rooms(&rooms, jobs, run_date).await;
    outcome.unavailable = fetched.iter().filter(|s| !s.price.is_available()).count();
    samples.extend(fetched);
    outcome.samples = samples.len();

    console::step(4, TOTAL_STEPS, "Merge price history");
    let (records, merge_stats) = merge_with_stats(existing, &samples);
    outcome.merge = merge_stats;
    outcome.records_after = records.len();

    console::step(5, TOTAL_STEPS, "Persist records");
    storage.save_records(&records).await?;
    storage.write_export(&records).await?;

    outcome.elapsed = start.elapsed();
    console::summary(
        "Scrape Results",
        &[
            ("Cities", outcome.cities.to_string()),
            ("Properties", outcome.properties.to_string()),
            ("Rooms scraped", outcome.samples.to_string()),
            ("Unavailable prices", outcome.unavailable.to_string()),
            ("New records", outcome.merge.created.to_string()),
            ("Records updated", outcome.merge.appended.to_string()),
            ("Record store", storage.location()),
        ],
    );
    log::info!(
        "Scraped {} rooms in {:.2} seconds and updated JSON file.",
        outcome.samples,
        outcome.elapsed.as_secs_f64()
    );

    Ok(outcome)
}

/// Enumerate every city concurrently, in configured order.
async fn enumerate_cities(cities: &CityEnumerator, ids: &[String]) -> Vec<PropertyRef> {
    let results = join_all(ids.iter().map(|city| cities.enumerate(city))).await;

    ids.iter()
        .zip(results)
        .flat_map(|(city, result)| match result {
            Ok(properties) => properties,
            Err(e) => {
                log::error!("Failed to enumerate city {}: {}", city, e);
                Vec::new()
            }
        })
        .collect()
}

/// Split properties into room pages to fetch and rooms already priced.
async fn enumerate_properties<'a>(
    enumerator: &PropertyEnumerator,
    properties: &'a [PropertyRef],
    run_date: NaiveDate,
    concurrency: usize,
) -> (Vec<RoomJob<'a>>, Vec<RoomSample>) {
    let mut jobs = Vec::new();
    let mut samples = Vec::new();

    let mut results = stream::iter(properties)
        .map(|property| async move { (property, enumerator.enumerate(property, run_date).await) })
        .buffered(concurrency);

    while let Some((property, result)) = results.next().await {
        match result {
            Ok(PropertyRooms::Links(links)) => {
                jobs.extend(links.into_iter().map(|link| RoomJob { property, link }));
            }
            Ok(PropertyRooms::Priced(priced)) => samples.extend(priced),
            Err(e) => log::error!("Error scraping property rooms for {}: {}", property.url, e),
        }
    }

    (jobs, samples)
}

/// Fetch every queued room page; the fetcher's gate bounds concurrency.
async fn fetch_rooms(
    rooms: &RoomPriceFetcher,
    jobs: Vec<RoomJob<'_>>,
    run_date: NaiveDate,
) -> Vec<RoomSample> {
    let prices: Vec<Price> = join_all(jobs.iter().map(|job| rooms.fetch(&job.link))).await;

    jobs.into_iter()
        .zip(prices)
        .map(|(job, price)| RoomSample {
            city: job.property.city.clone(),
            property_url: job.property.url.clone(),
            room_name: last_path_segment(&job.link).unwrap_or_else(|| job.link.clone()),
            room_link: Some(job.link),
            price,
            date: run_date,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::models::{PriceObservation, RoomRecord};
    use crate::services::fetcher::testing::StaticFetcher;
    use crate::storage::LocalStorage;

    const LISTING_URL: &str = "https://wearehomesforstudents.com/student-accommodation/nottingham";
    const PROPERTY_URL: &str =
        "https://wearehomesforstudents.com/student-accommodation/nottingham/the-place/";
    const EVO_URL: &str = "https://www.evostudent.co.uk/nottingham/";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn room_page(price: &str) -> String {
        format!(r#"<html><body><h1>Room</h1><p class="RoomHero__price">{price}</p></body></html>"#)
    }

    fn site(with_evo: bool) -> Arc<StaticFetcher> {
        let mut listing =
            String::from(r#"<a class="PropertyCard__link" href="/student-accommodation/nottingham/the-place/">The Place</a>"#);
        if with_evo {
            listing.push_str(&format!(r#"<a class="PropertyCard__link" href="{EVO_URL}">Evo</a>"#));
        }

        let fetcher = StaticFetcher::new()
            .with_page(LISTING_URL, listing)
            .with_page(
                PROPERTY_URL,
                r#"<div class="RoomCard"><a href="gold-studio">Gold</a></div>
                   <div class="RoomCard"><a href="silver-studio">Silver</a></div>"#,
            )
            .with_page(
                EVO_URL,
                r#"<div class="et_pb_column">
                       <div class="room-name"><h2>Classic Ensuite</h2></div>
                       <span class="price-per-week">£165 pw</span>
                       <span class="tenancy-length">51 weeks</span>
                   </div>"#,
            );
        Arc::new(fetcher)
    }

    fn set_prices(fetcher: &StaticFetcher, gold: &str, silver: &str) {
        fetcher.set_page(&format!("{PROPERTY_URL}gold-studio"), room_page(gold));
        fetcher.set_page(&format!("{PROPERTY_URL}silver-studio"), room_page(silver));
    }

    fn find<'a>(records: &'a [RoomRecord], name: &str) -> &'a RoomRecord {
        records.iter().find(|r| r.room_name == name).unwrap()
    }

    #[tokio::test]
    async fn test_two_day_cycle_appends_history() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let storage = LocalStorage::new(tmp.path(), &config.paths);
        let fetcher = site(false);

        set_prices(&fetcher, "£150 pw", "£175 pw");
        let first = run_scraper(&config, &storage, fetcher.clone(), day(17))
            .await
            .unwrap();
        assert_eq!(first.samples, 2);
        assert_eq!(first.merge.created, 2);

        let records = storage.load_records().await.unwrap();
        assert_eq!(records.len(), 2);
        let gold = find(&records, "gold-studio");
        assert_eq!(gold.city, "nottingham");
        assert_eq!(gold.property_url, PROPERTY_URL);
        assert_eq!(
            gold.room_link.as_deref(),
            Some(format!("{PROPERTY_URL}gold-studio").as_str())
        );
        assert_eq!(
            gold.history,
            vec![PriceObservation {
                price: Price::Amount(150.0),
                date: day(17)
            }]
        );
        assert_eq!(
            find(&records, "silver-studio").history[0].price,
            Price::Amount(175.0)
        );

        set_prices(&fetcher, "£160 pw", "£175 pw");
        let second = run_scraper(&config, &storage, fetcher.clone(), day(18))
            .await
            .unwrap();
        assert_eq!(second.records_before, 2);
        assert_eq!(second.records_after, 2);
        assert_eq!(second.merge.appended, 2);

        let records = storage.load_records().await.unwrap();
        let gold = find(&records, "gold-studio");
        assert_eq!(
            gold.history,
            vec![
                PriceObservation {
                    price: Price::Amount(150.0),
                    date: day(17)
                },
                PriceObservation {
                    price: Price::Amount(160.0),
                    date: day(18)
                },
            ]
        );
        let silver = find(&records, "silver-studio");
        assert_eq!(silver.history.len(), 2);
        assert_eq!(silver.history[1].price, Price::Amount(175.0));

        let csv = std::fs::read_to_string(tmp.path().join("urbium.csv")).unwrap();
        assert!(csv.lines().next().unwrap().ends_with("Room Price2,Date2"));
    }

    #[tokio::test]
    async fn test_inline_and_unavailable_rooms() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.crawler.max_attempts = 2;
        let storage = LocalStorage::new(tmp.path(), &config.paths);
        let fetcher = site(true);
        // Only gold has a page; silver fails every attempt.
        fetcher.set_page(&format!("{PROPERTY_URL}gold-studio"), room_page("£150"));

        let outcome = run_scraper(&config, &storage, fetcher.clone(), day(17))
            .await
            .unwrap();

        assert_eq!(outcome.properties, 2);
        assert_eq!(outcome.samples, 3);
        assert_eq!(outcome.unavailable, 1);

        let records = storage.load_records().await.unwrap();
        // Inline rooms are merged ahead of fetched ones.
        assert_eq!(records[0].room_name, "Classic Ensuite");
        assert_eq!(records[0].room_link, None);
        assert_eq!(records[0].history[0].price, Price::Amount(165.0));
        assert_eq!(
            find(&records, "silver-studio").history[0].price,
            Price::Unavailable
        );
    }

    #[tokio::test]
    async fn test_failed_city_still_persists() {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let storage = LocalStorage::new(tmp.path(), &config.paths);

        let outcome = run_scraper(&config, &storage, Arc::new(StaticFetcher::new()), day(17))
            .await
            .unwrap();

        assert_eq!(outcome.properties, 0);
        assert_eq!(outcome.samples, 0);
        assert!(tmp.path().join("urbium.json").exists());
        assert!(tmp.path().join("urbium.csv").exists());
    }
}
