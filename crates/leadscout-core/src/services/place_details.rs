//! Google Place Details API client

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::models::{response_status, status, PlaceDetails, DETAILS_FIELDS};
use crate::monitoring::{ApiCall, Sleeper};

use super::transport::MapsApi;

const DETAILS_PATH: &str = "place/details/json";

/// Fetches contact details for a single place
#[derive(Clone)]
pub struct PlaceDetailsService {
    api: MapsApi,
    settings: SearchConfig,
    sleeper: Arc<dyn Sleeper>,
}

impl PlaceDetailsService {
    pub fn new(api: MapsApi, settings: SearchConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            api,
            settings,
            sleeper,
        }
    }

    /// Fetch details for `place_id`.
    ///
    /// A non-`OK` status (NOT_FOUND, INVALID_REQUEST, ...) yields `Ok(None)`
    /// so the caller can skip the place, as does a result that does not
    /// decode. Transport failures and an exhausted
    /// daily quota are still errors.
    pub fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>> {
        let mut body = self.api.get(
            ApiCall::PlaceDetails,
            DETAILS_PATH,
            vec![
                ("place_id", place_id.to_string()),
                ("fields", DETAILS_FIELDS.join(",")),
            ],
        )?;

        let api_status = response_status(&body);
        if api_status != status::OK {
            warn!("Skipping place {}: details status {}", place_id, api_status);
            return Ok(None);
        }

        let result = body["result"].take();
        if !result.is_object() {
            debug!("Place {} returned no result object", place_id);
            return Ok(None);
        }
        let details: PlaceDetails = match serde_json::from_value(result) {
            Ok(details) => details,
            Err(e) => {
                warn!("Skipping place {}: malformed details ({})", place_id, e);
                return Ok(None);
            }
        };

        self.sleeper.sleep(self.settings.details_sleep());
        Ok(Some(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::testing::{status_only, Harness, ScriptedTransport};
    use serde_json::json;
    use std::time::Duration;

    fn service(harness: &Harness) -> PlaceDetailsService {
        PlaceDetailsService::new(
            harness.api.clone(),
            SearchConfig::default(),
            Arc::new(harness.sleeper.clone()),
        )
    }

    #[test]
    fn test_details_ok() {
        let harness = Harness::new(ScriptedTransport::new().respond(json!({
            "status": "OK",
            "result": {
                "name": "Lash Lounge",
                "formatted_address": "2 George St, Luton",
                "website": "https://lashlounge.example",
                "rating": 4.9,
                "user_ratings_total": 120
            }
        })));
        let details = service(&harness).place_details("p1").unwrap().unwrap();

        assert_eq!(details.name.as_deref(), Some("Lash Lounge"));
        assert_eq!(details.user_ratings_total, Some(120));
        assert_eq!(
            harness.transport.param(0, "fields").as_deref(),
            Some(concat!(
                "name,formatted_address,formatted_phone_number,",
                "website,rating,user_ratings_total,url"
            ))
        );
        assert_eq!(harness.transport.param(0, "place_id").as_deref(), Some("p1"));
        assert_eq!(harness.sleeper.calls(), vec![Duration::from_secs_f64(0.15)]);
        assert_eq!(harness.costs.stats().place_details_calls, 1);
    }

    #[test]
    fn test_not_found_is_skipped() {
        let harness = Harness::new(ScriptedTransport::new().respond(status_only("NOT_FOUND")));
        let details = service(&harness).place_details("gone").unwrap();
        assert!(details.is_none());
        assert!(harness.sleeper.calls().is_empty());
        assert_eq!(harness.costs.stats().place_details_calls, 1);
    }

    #[test]
    fn test_malformed_result_is_skipped() {
        let harness = Harness::new(ScriptedTransport::new().respond(json!({
            "status": "OK",
            "result": { "name": "Cuts", "rating": "4.5" }
        })));
        let details = service(&harness).place_details("p1").unwrap();
        assert!(details.is_none());
        assert!(harness.sleeper.calls().is_empty());
    }

    #[test]
    fn test_transport_error_propagates() {
        let harness = Harness::new(ScriptedTransport::new().fail("timeout"));
        let err = service(&harness).place_details("p1").unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
