//! Google Places text search with page-token pagination

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::models::{response_status, status};
use crate::monitoring::{ApiCall, Sleeper};

use super::transport::{MapsApi, Query};

const TEXT_SEARCH_PATH: &str = "place/textsearch/json";

/// Searches for businesses around a point
#[derive(Clone)]
pub struct PlacesSearchService {
    api: MapsApi,
    settings: SearchConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl PlacesSearchService {
    pub fn new(api: MapsApi, settings: SearchConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            api,
            settings,
            sleeper,
        }
    }

    /// Search `keyword` around (lat, lng), following `next_page_token` until
    /// `max_results` raw results are collected or no token is offered.
    ///
    /// Returns at most `max_results` results in upstream order. Any status
    /// other than `OK` or `ZERO_RESULTS` fails the whole search, including
    /// pages already fetched.
    pub fn search_places(
        &self,
        lat: f64,
        lng: f64,
        keyword: &str,
        radius: Option<u32>,
        max_results: Option<usize>,
    ) -> Result<Vec<Value>> {
        // Zero means unset, like an omitted value
        let radius = radius
            .filter(|r| *r > 0)
            .unwrap_or(self.settings.default_radius);
        let max_results = max_results
            .filter(|n| *n > 0)
            .unwrap_or(self.settings.default_max_results);

        let mut query: Query = vec![
            ("query", keyword.to_string()),
            ("location", format!("{},{}", lat, lng)),
            ("radius", radius.to_string()),
        ];
        let mut places: Vec<Value> = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .api
                .get(ApiCall::PlacesSearch, TEXT_SEARCH_PATH, query.clone());
            let mut body = match response {
                Ok(body) => body,
                Err(e) => return Err(self.discard(places.len(), e)),
            };

            let api_status = response_status(&body).to_string();
            if api_status != status::OK && api_status != status::ZERO_RESULTS {
                let err = Error::UpstreamApi {
                    api: ApiCall::PlacesSearch.api_name(),
                    status: api_status,
                    payload: body,
                };
                return Err(self.discard(places.len(), err));
            }

            if let Value::Array(results) = body["results"].take() {
                debug!("Page {} returned {} results", page, results.len());
                places.extend(results);
            }

            let token = body["next_page_token"]
                .as_str()
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            match token {
                Some(token) if places.len() < max_results => {
                    // The token only becomes valid after a short delay
                    self.sleeper.sleep(self.settings.next_page_delay());
                    query.retain(|(key, _)| *key != "pagetoken");
                    query.push(("pagetoken", token));
                    page += 1;
                }
                _ => break,
            }
        }

        places.truncate(max_results);
        info!(
            "Found {} places for '{}' in {} page(s)",
            places.len(),
            keyword,
            page
        );
        Ok(places)
    }

    fn discard(&self, fetched: usize, err: Error) -> Error {
        if fetched > 0 {
            warn!("Search failed after {} results were fetched; discarding them", fetched);
        }
        err
    }
}
