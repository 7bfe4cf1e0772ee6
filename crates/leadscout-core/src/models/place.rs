//! Google Places payload structures

use serde::{Deserialize, Serialize};

/// Fields requested from the Place Details endpoint
pub const DETAILS_FIELDS: &[&str] = &[
    "name",
    "formatted_address",
    "formatted_phone_number",
    "website",
    "rating",
    "user_ratings_total",
    "url", // Google Maps business URL
];

/// The `result` object of a Place Details response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Upstream status values shared by the Maps web services
pub mod status {
    pub const OK: &str = "OK";
    pub const ZERO_RESULTS: &str = "ZERO_RESULTS";
}

/// Read the `status` field of a Maps response
pub fn response_status(body: &serde_json::Value) -> &str {
    body["status"].as_str().unwrap_or("UNKNOWN")
}

/// `place_id` of a raw search result, if present and non-empty
pub fn place_id_of(place: &serde_json::Value) -> Option<&str> {
    place["place_id"].as_str().filter(|id| !id.is_empty())
}
