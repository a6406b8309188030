// src/services/properties.rs

//! Property enumeration.
//!
//! A property page either links to one page per room, or lists each room's
//! name and price inline. [`PropertyEnumerator::enumerate`] dispatches on the
//! [`SiteTemplate`] attached to the property when it was discovered.

use std::sync::Arc;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{Price, PropertyRef, RoomSample, SelectorConfig, SiteTemplate};
use crate::services::{PageFetcher, normalize_price};
use crate::utils::{parse_selector, resolve_url};

/// Rooms found on a property page.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyRooms {
    /// Room page addresses still to be fetched for their price
    Links(Vec<String>),
    /// Rooms already priced from the property page itself
    Priced(Vec<RoomSample>),
}

impl PropertyRooms {
    pub fn len(&self) -> usize {
        match self {
            PropertyRooms::Links(links) => links.len(),
            PropertyRooms::Priced(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compiled selectors for both property layouts.
struct PropertySelectors {
    room_card: Selector,
    room_card_link: Selector,
    container: Selector,
    name: Selector,
    price: Selector,
    tenancy: Selector,
}

/// Service for listing the rooms of a property.
pub struct PropertyEnumerator {
    fetcher: Arc<dyn PageFetcher>,
    selectors: PropertySelectors,
    tenancy_filter: String,
}

impl PropertyEnumerator {
    /// Create a new property enumerator.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        selectors: &SelectorConfig,
        tenancy_filter: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            selectors: PropertySelectors {
                room_card: parse_selector(&selectors.room_card)?,
                room_card_link: parse_selector(&selectors.room_card_link)?,
                container: parse_selector(&selectors.direct_room_container)?,
                name: parse_selector(&selectors.direct_room_name)?,
                price: parse_selector(&selectors.direct_room_price)?,
                tenancy: parse_selector(&selectors.direct_tenancy)?,
            },
            tenancy_filter: tenancy_filter.into(),
        })
    }

    /// Fetch a property page and extract its rooms.
    ///
    /// Inline-priced rooms are stamped with `run_date`.
    pub async fn enumerate(
        &self,
        property: &PropertyRef,
        run_date: NaiveDate,
    ) -> Result<PropertyRooms> {
        log::debug!("Fetching property page: {}", property.url);
        let html = self.fetcher.fetch(&property.url).await?;

        let rooms = match property.template {
            SiteTemplate::RoomLinks => {
                PropertyRooms::Links(self.extract_room_links(property, &html)?)
            }
            SiteTemplate::DirectPrice => {
                PropertyRooms::Priced(self.extract_priced_rooms(property, &html, run_date))
            }
        };

        if rooms.is_empty() {
            log::warn!("No rooms found for property {}", property.url);
        }
        Ok(rooms)
    }

    /// Room page links that belong to this property.
    ///
    /// Links that resolve outside the property's own address are dropped.
    fn extract_room_links(&self, property: &PropertyRef, html: &str) -> Result<Vec<String>> {
        let base = Url::parse(&property.url)?;
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        for card in document.select(&self.selectors.room_card) {
            let Some(href) = card
                .select(&self.selectors.room_card_link)
                .next()
                .and_then(|a| a.value().attr("href"))
            else {
                log::debug!("Room card without a link on {}", property.url);
                continue;
            };

            let room_link = resolve_url(&base, href);
            if room_link.contains(&property.url) {
                links.push(room_link);
            } else {
                log::warn!("Skipped mismatched room link: {}", room_link);
            }
        }
        Ok(links)
    }

    fn extract_priced_rooms(
        &self,
        property: &PropertyRef,
        html: &str,
        run_date: NaiveDate,
    ) -> Vec<RoomSample> {
        let document = Html::parse_document(html);

        document
            .select(&self.selectors.container)
            .filter_map(|container| {
                let room = self.parse_priced_room(&container, property, run_date);
                if room.is_none() {
                    log::debug!(
                        "Skipping room container on {}: does not meet criteria",
                        property.url
                    );
                }
                room
            })
            .inspect(|room| {
                log::info!("Success - Room: {}, Price per week: {}", room.room_name, room.price)
            })
            .collect()
    }

    /// A container counts as a room only with the required tenancy length,
    /// a name, and a numeric price.
    fn parse_priced_room(
        &self,
        container: &ElementRef,
        property: &PropertyRef,
        run_date: NaiveDate,
    ) -> Option<RoomSample> {
        let tenancy = first_text(container, &self.selectors.tenancy)?;
        if !tenancy.contains(&self.tenancy_filter) {
            return None;
        }

        let room_name = first_text(container, &self.selectors.name).filter(|n| !n.is_empty())?;
        let price =
            first_text(container, &self.selectors.price).and_then(|t| normalize_price(&t))?;

        Some(RoomSample {
            city: property.city.clone(),
            property_url: property.url.clone(),
            room_link: None,
            room_name,
            price: Price::Amount(price),
            date: run_date,
        })
    }
}

/// Trimmed text of the first element matching `selector` under `parent`.
fn first_text(parent: &ElementRef, selector: &Selector) -> Option<String> {
    parent
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;
    use crate::services::fetcher::testing::StaticFetcher;

    const PROPERTY_URL: &str = "https://example.com/student-accommodation/nottingham/the-place";
    const EVO_URL: &str = "https://www.evostudent.co.uk/nottingham/";

    fn run_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn enumerator(fetcher: StaticFetcher) -> PropertyEnumerator {
        let config = Config::default();
        PropertyEnumerator::new(
            Arc::new(fetcher),
            &config.selectors,
            config.site.tenancy_filter.clone(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_room_links_keep_only_own_property() {
        let fetcher = StaticFetcher::new().with_page(
            PROPERTY_URL,
            r#"<html><body>
                <div class="RoomCard"><a href="the-place/gold-studio">Gold</a></div>
                <div class="RoomCard"><a href="/student-accommodation/nottingham/the-place/silver">Silver</a></div>
                <div class="RoomCard"><a href="/student-accommodation/nottingham/elsewhere/bronze">Bronze</a></div>
                <div class="RoomCard"><span>No link</span></div>
            </body></html>"#,
        );
        let property = PropertyRef::new("nottingham", PROPERTY_URL, SiteTemplate::RoomLinks);

        let rooms = enumerator(fetcher)
            .enumerate(&property, run_date())
            .await
            .unwrap();

        assert_eq!(
            rooms,
            PropertyRooms::Links(vec![
                format!("{PROPERTY_URL}/gold-studio"),
                format!("{PROPERTY_URL}/silver"),
            ])
        );
    }

    #[tokio::test]
    async fn test_room_links_relative_to_trailing_slash() {
        let url = format!("{PROPERTY_URL}/");
        let fetcher = StaticFetcher::new().with_page(
            &url,
            r#"<div class="RoomCard"><a href="gold-studio">Gold</a></div>"#,
        );
        let property = PropertyRef::new("nottingham", url.clone(), SiteTemplate::RoomLinks);

        let rooms = enumerator(fetcher)
            .enumerate(&property, run_date())
            .await
            .unwrap();

        assert_eq!(rooms, PropertyRooms::Links(vec![format!("{url}gold-studio")]));
    }

    #[tokio::test]
    async fn test_direct_price_requires_tenancy_marker() {
        let fetcher = StaticFetcher::new().with_page(
            EVO_URL,
            r#"<html><body>
                <div class="et_pb_column">
                    <div class="room-name"><h2> Classic Ensuite </h2></div>
                    <span class="price-per-week">£165.00 pw</span>
                    <span class="tenancy-length">51 weeks</span>
                </div>
                <div class="et_pb_column">
                    <div class="room-name"><h2>Premium Studio</h2></div>
                    <span class="price-per-week">£210 pw</span>
                    <span class="tenancy-length">44 weeks</span>
                </div>
                <div class="et_pb_column">
                    <div class="room-name"><h2>Deluxe Studio</h2></div>
                    <span class="price-per-week">£230 pw</span>
                </div>
                <div class="et_pb_column">
                    <div class="room-name"><h2>Twodio</h2></div>
                    <span class="price-per-week">Sold out</span>
                    <span class="tenancy-length">51 weeks</span>
                </div>
            </body></html>"#,
        );
        let property = PropertyRef::new("nottingham", EVO_URL, SiteTemplate::DirectPrice);

        let rooms = enumerator(fetcher)
            .enumerate(&property, run_date())
            .await
            .unwrap();

        assert_eq!(
            rooms,
            PropertyRooms::Priced(vec![RoomSample {
                city: "nottingham".into(),
                property_url: EVO_URL.into(),
                room_link: None,
                room_name: "Classic Ensuite".into(),
                price: Price::Amount(165.0),
                date: run_date(),
            }])
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_is_error() {
        let property = PropertyRef::new("nottingham", PROPERTY_URL, SiteTemplate::RoomLinks);
        let result = enumerator(StaticFetcher::new())
            .enumerate(&property, run_date())
            .await;
        assert!(result.is_err());
    }
}
