// src/services/cities.rs

//! City enumeration.
//!
//! Reads a city's listing page and returns the properties advertised on it.

use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{PropertyRef, SiteConfig, SiteTemplate};
use crate::services::PageFetcher;
use crate::utils::{parse_selector, resolve_url};

/// Service for listing the properties of a city.
pub struct CityEnumerator {
    fetcher: Arc<dyn PageFetcher>,
    site: SiteConfig,
    base_url: Url,
    property_card: Selector,
}

impl CityEnumerator {
    /// Create a new city enumerator.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        site: &SiteConfig,
        property_card: &str,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(&site.base_url)?,
            site: site.clone(),
            property_card: parse_selector(property_card)?,
        })
    }

    /// List the properties advertised for `city`.
    ///
    /// An empty listing is logged and returned as an empty list.
    pub async fn enumerate(&self, city: &str) -> Result<Vec<PropertyRef>> {
        let city_url = self.site.city_url(city);
        log::debug!("Fetching city listing: {}", city_url);

        let html = self.fetcher.fetch(&city_url).await?;
        let properties = self.extract_properties(city, &html);

        if properties.is_empty() {
            log::warn!("No property links found for city {}", city);
        } else {
            log::info!("Found {} properties for {}", properties.len(), city);
        }
        Ok(properties)
    }

    fn extract_properties(&self, city: &str, html: &str) -> Vec<PropertyRef> {
        let document = Html::parse_document(html);

        document
            .select(&self.property_card)
            .filter_map(|card| card.value().attr("href"))
            .map(|href| {
                let url = resolve_url(&self.base_url, href);
                let template = SiteTemplate::detect(&url, &self.site.direct_price_marker);
                PropertyRef::new(city, url, template)
            })
            .collect()
    }
}
