//! Business lead data structures

use serde::{Deserialize, Serialize};

use super::PlaceDetails;

/// A local business collected from Google Maps.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessLead {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub google_maps_url: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub place_id: Option<String>,
}

impl BusinessLead {
    /// Create a lead with only a name and address
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            phone: None,
            website: None,
            google_maps_url: None,
            rating: None,
            user_ratings_total: None,
            place_id: None,
        }
    }

    /// Build a lead from a Place Details result
    pub fn from_details(place_id: impl Into<String>, details: PlaceDetails) -> Self {
        Self {
            name: details.name.unwrap_or_default(),
            address: details.formatted_address.unwrap_or_default(),
            phone: details.formatted_phone_number,
            website: details.website,
            google_maps_url: details.url,
            rating: details.rating,
            user_ratings_total: details.user_ratings_total,
            place_id: Some(place_id.into()),
        }
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = Some(place_id.into());
        self
    }

    /// Whether the business lists a website
    pub fn has_website(&self) -> bool {
        has_website(self)
    }
}

/// A lead counts as having a website when the field is present and not blank
pub fn has_website(lead: &BusinessLead) -> bool {
    lead.website
        .as_deref()
        .map(|w| !w.trim().is_empty())
        .unwrap_or(false)
}

/// Which half of a website split a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteFilter {
    WithWebsite,
    WithoutWebsite,
}

impl WebsiteFilter {
    /// Suffix used in exported file names
    pub fn as_suffix(&self) -> &'static str {
        match self {
            WebsiteFilter::WithWebsite => "with_website",
            WebsiteFilter::WithoutWebsite => "without_website",
        }
    }
}

impl std::fmt::Display for WebsiteFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_suffix())
    }
}

impl std::str::FromStr for WebsiteFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "with_website" => Ok(WebsiteFilter::WithWebsite),
            "without_website" => Ok(WebsiteFilter::WithoutWebsite),
            other => Err(format!(
                "unknown website filter '{}', expected with_website or without_website",
                other
            )),
        }
    }
}
