// src/models/property.rs

//! Property references produced by city enumeration.

use serde::{Deserialize, Serialize};

/// Page layout a property uses to publish its rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteTemplate {
    /// Room cards link to separate room pages that carry the price
    RoomLinks,
    /// Room names and prices sit directly on the property page
    DirectPrice,
}

impl SiteTemplate {
    /// Pick the template for a property address.
    pub fn detect(property_url: &str, direct_price_marker: &str) -> Self {
        if property_url.contains(direct_price_marker) {
            Self::DirectPrice
        } else {
            Self::RoomLinks
        }
    }
}

/// A property advertised on a city listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    /// City identifier the property was listed under
    pub city: String,

    /// Absolute address of the property page
    pub url: String,

    /// Layout of the property page
    pub template: SiteTemplate,
}

impl PropertyRef {
    pub fn new(city: impl Into<String>, url: impl Into<String>, template: SiteTemplate) -> Self {
        Self {
            city: city.into(),
            url: url.into(),
            template,
        }
    }
}
