// src/services/rooms.rs

//! Room price fetching.
//!
//! Each room page fetch holds one permit of a shared [`ConcurrencyGate`] for
//! its whole retry loop. Failed attempts are logged and retried; when every
//! attempt fails the room is reported as [`Price::Unavailable`].

use std::sync::Arc;
use std::time::Duration;

use scraper::{Html, Selector};
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, Price};
use crate::services::{PageFetcher, normalize_price};
use crate::utils::parse_selector;

/// Caps the number of room fetches in flight.
#[derive(Debug)]
pub struct ConcurrencyGate {
    permits: Semaphore,
    capacity: usize,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Semaphore::new(capacity),
            capacity,
        }
    }

    /// Wait for a free slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|e| AppError::fetch("concurrency gate", e))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Service for fetching the current price of a room page.
pub struct RoomPriceFetcher {
    fetcher: Arc<dyn PageFetcher>,
    gate: Arc<ConcurrencyGate>,
    price_selector: Selector,
    max_attempts: usize,
    retry_delay: Duration,
}

impl RoomPriceFetcher {
    /// Create a room fetcher with its own gate sized from the config.
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        config: &CrawlerConfig,
        price_selector: &str,
    ) -> Result<Self> {
        let gate = Arc::new(ConcurrencyGate::new(config.max_concurrent));
        Self::with_gate(fetcher, gate, config, price_selector)
    }

    /// Create a room fetcher that shares an existing gate.
    pub fn with_gate(
        fetcher: Arc<dyn PageFetcher>,
        gate: Arc<ConcurrencyGate>,
        config: &CrawlerConfig,
        price_selector: &str,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            gate,
            price_selector: parse_selector(price_selector)?,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Fetch the price of one room, retrying up to the attempt cap.
    ///
    /// Never fails: exhausting every attempt yields [`Price::Unavailable`].
    pub async fn fetch(&self, room_link: &str) -> Price {
        let _permit = match self.gate.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                log::error!("Failed to retrieve price from {}: {}", room_link, e);
                return Price::Unavailable;
            }
        };

        for attempt in 1..=self.max_attempts {
            log::debug!(
                "Attempting to scrape: {} (Attempt {}/{})",
                room_link,
                attempt,
                self.max_attempts
            );

            match self.try_fetch(room_link).await {
                Ok(price) => {
                    log::info!("Success - Link: {}, Price: {}", room_link, price);
                    return Price::Amount(price);
                }
                Err(e) => {
                    log::warn!("Failed to retrieve price from {}: {}", room_link, e);
                }
            }

            if attempt < self.max_attempts && !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        log::warn!(
            "Failed to retrieve price from {} after {} attempts.",
            room_link,
            self.max_attempts
        );
        Price::Unavailable
    }

    async fn try_fetch(&self, room_link: &str) -> Result<f64> {
        let html = self.fetcher.fetch(room_link).await?;
        self.extract_price(room_link, &html)
    }

    fn extract_price(&self, room_link: &str, html: &str) -> Result<f64> {
        let document = Html::parse_document(html);
        let text: String = document
            .select(&self.price_selector)
            .next()
            .ok_or_else(|| AppError::fetch(room_link, "price element not found"))?
            .text()
            .collect();

        normalize_price(&text).ok_or_else(|| {
            AppError::fetch(room_link, format!("no price in '{}'", text.trim()))
        })
    }
}
