//! Google Geocoding API client

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{response_status, status};
use crate::monitoring::ApiCall;

use super::transport::MapsApi;

const GEOCODE_PATH: &str = "geocode/json";

/// Converts an area name into coordinates
#[derive(Clone)]
pub struct GeocodeService {
    api: MapsApi,
}

impl GeocodeService {
    pub fn new(api: MapsApi) -> Self {
        Self { api }
    }

    /// Geocode `area_name` into (lat, lng) of the first match
    pub fn geocode_area(&self, area_name: &str) -> Result<(f64, f64)> {
        let body = self.api.get(
            ApiCall::Geocoding,
            GEOCODE_PATH,
            vec![("address", area_name.to_string())],
        )?;

        let api_status = response_status(&body).to_string();
        let location = &body["results"][0]["geometry"]["location"];
        let coords = location["lat"].as_f64().zip(location["lng"].as_f64());

        match coords {
            Some((lat, lng)) if api_status == status::OK => {
                info!("Geocoded '{}' to ({}, {})", area_name, lat, lng);
                Ok((lat, lng))
            }
            _ => Err(Error::UpstreamApi {
                api: ApiCall::Geocoding.api_name(),
                status: api_status,
                payload: body,
            }),
        }
    }
}
