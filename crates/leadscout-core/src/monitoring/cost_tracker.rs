//! API call counting and cost estimation

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CostSettings;

/// Billable Google Maps call types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiCall {
    Geocoding,
    PlacesSearch,
    PlaceDetails,
}

impl ApiCall {
    /// Name used in logs and error messages
    pub fn api_name(&self) -> &'static str {
        match self {
            ApiCall::Geocoding => "Geocoding",
            ApiCall::PlacesSearch => "Places",
            ApiCall::PlaceDetails => "Place Details",
        }
    }
}

/// Google Maps pricing in USD per 1000 requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostConfig {
    pub geocoding_per_1000: f64,
    pub places_text_search_per_1000: f64,
    pub place_details_per_1000: f64,
}

impl CostConfig {
    /// Price of a single call
    pub fn unit_price(&self, call: ApiCall) -> f64 {
        let per_1000 = match call {
            ApiCall::Geocoding => self.geocoding_per_1000,
            ApiCall::PlacesSearch => self.places_text_search_per_1000,
            ApiCall::PlaceDetails => self.place_details_per_1000,
        };
        per_1000 / 1000.0
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            geocoding_per_1000: 5.00,
            places_text_search_per_1000: 32.00,
            place_details_per_1000: 17.00,
        }
    }
}

impl From<&CostSettings> for CostConfig {
    fn from(settings: &CostSettings) -> Self {
        Self {
            geocoding_per_1000: settings.geocoding_per_1000,
            places_text_search_per_1000: settings.places_text_search_per_1000,
            place_details_per_1000: settings.place_details_per_1000,
        }
    }
}

/// Raw call counters for a session
#[derive(Debug, Clone, Serialize)]
pub struct CallStats {
    pub geocoding_calls: u64,
    pub places_search_calls: u64,
    pub place_details_calls: u64,
    pub total_cost: f64,
    pub started_at: DateTime<Utc>,
}

impl CallStats {
    fn new() -> Self {
        Self {
            geocoding_calls: 0,
            places_search_calls: 0,
            place_details_calls: 0,
            total_cost: 0.0,
            started_at: Utc::now(),
        }
    }

    fn add(&mut self, call: ApiCall, costs: &CostConfig) {
        match call {
            ApiCall::Geocoding => self.geocoding_calls += 1,
            ApiCall::PlacesSearch => self.places_search_calls += 1,
            ApiCall::PlaceDetails => self.place_details_calls += 1,
        }
        self.total_cost += costs.unit_price(call);
    }

    pub fn total_calls(&self) -> u64 {
        self.geocoding_calls + self.places_search_calls + self.place_details_calls
    }
}

/// Read-only usage and cost report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    pub geocoding_calls: u64,
    pub places_search_calls: u64,
    pub place_details_calls: u64,
    pub total_calls: u64,
    /// Rounded to 4 decimal places
    pub total_cost_usd: f64,
    pub elapsed_seconds: u64,
}

impl fmt::Display for CostSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{}", rule)?;
        writeln!(f, "API USAGE & COST SUMMARY")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Geocoding calls:      {:>6}", self.geocoding_calls)?;
        writeln!(f, "Places search calls:  {:>6}", self.places_search_calls)?;
        writeln!(f, "Place details calls:  {:>6}", self.place_details_calls)?;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(f, "Total API calls:      {:>6}", self.total_calls)?;
        writeln!(f, "Total cost (USD):     ${:>6.4}", self.total_cost_usd)?;
        writeln!(f, "Elapsed time (sec):   {:>6}", self.elapsed_seconds)?;
        write!(f, "{}", rule)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Tracks API calls and their estimated cost
pub struct CostTracker {
    costs: CostConfig,
    stats: Mutex<CallStats>,
}

impl CostTracker {
    pub fn new(costs: CostConfig) -> Self {
        Self {
            costs,
            stats: Mutex::new(CallStats::new()),
        }
    }

    /// Record one call of the given type
    pub fn track(&self, call: ApiCall) {
        let mut stats = self.stats.lock();
        stats.add(call, &self.costs);
        debug!(
            call = call.api_name(),
            total_cost = stats.total_cost,
            "Tracked API call"
        );
    }

    pub fn track_geocoding(&self) {
        self.track(ApiCall::Geocoding);
    }

    pub fn track_places_search(&self) {
        self.track(ApiCall::PlacesSearch);
    }

    pub fn track_place_details(&self) {
        self.track(ApiCall::PlaceDetails);
    }

    /// Copy of the raw counters
    pub fn stats(&self) -> CallStats {
        self.stats.lock().clone()
    }

    pub fn summary(&self) -> CostSummary {
        let stats = self.stats.lock();
        let elapsed = (Utc::now() - stats.started_at).num_seconds().max(0) as u64;
        CostSummary {
            geocoding_calls: stats.geocoding_calls,
            places_search_calls: stats.places_search_calls,
            place_details_calls: stats.place_details_calls,
            total_calls: stats.total_calls(),
            total_cost_usd: round_to(stats.total_cost, 4),
            elapsed_seconds: elapsed,
        }
    }
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new(CostConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_call_type_adds_its_price() {
        let tracker = CostTracker::default();
        tracker.track_geocoding();
        tracker.track_places_search();
        tracker.track_places_search();
        tracker.track_place_details();

        let stats = tracker.stats();
        assert_eq!(stats.geocoding_calls, 1);
        assert_eq!(stats.places_search_calls, 2);
        assert_eq!(stats.place_details_calls, 1);
        let expected = 0.005 + 2.0 * 0.032 + 0.017;
        assert!((stats.total_cost - expected).abs() < 1e-12);
    }

    #[test]
    fn test_summary_rounds_to_four_places() {
        let tracker = CostTracker::new(CostConfig {
            geocoding_per_1000: 0.123456,
            places_text_search_per_1000: 0.0,
            place_details_per_1000: 0.0,
        });
        for _ in 0..7 {
            tracker.track(ApiCall::Geocoding);
        }
        // 7 * 0.000123456 = 0.000864192
        let summary = tracker.summary();
        assert_eq!(summary.total_cost_usd, 0.0009);
        assert_eq!(summary.total_calls, 7);
    }

    #[test]
    fn test_total_matches_sum_of_unit_prices() {
        let costs = CostConfig::default();
        let tracker = CostTracker::new(costs);
        let calls = [
            ApiCall::Geocoding,
            ApiCall::PlacesSearch,
            ApiCall::PlacesSearch,
            ApiCall::PlacesSearch,
            ApiCall::PlaceDetails,
            ApiCall::PlaceDetails,
        ];
        let mut expected = 0.0;
        for call in calls {
            tracker.track(call);
            expected += costs.unit_price(call);
        }

        let summary = tracker.summary();
        assert_eq!(summary.total_calls, calls.len() as u64);
        assert_eq!(summary.total_cost_usd, round_to(expected, 4));
        assert_eq!(summary.total_cost_usd, 0.135);
    }

    #[test]
    fn test_summary_is_side_effect_free() {
        let tracker = CostTracker::default();
        tracker.track_place_details();
        let first = tracker.summary();
        let second = tracker.summary();
        assert_eq!(first.total_calls, second.total_calls);
        assert_eq!(first.total_cost_usd, second.total_cost_usd);
        assert_eq!(tracker.stats().place_details_calls, 1);
    }

    #[test]
    fn test_summary_report_format() {
        let tracker = CostTracker::default();
        tracker.track_geocoding();
        let report = tracker.summary().to_string();
        assert!(report.contains("API USAGE & COST SUMMARY"));
        assert!(report.contains("Geocoding calls:           1"));
        assert!(report.contains("$0.0050"));
    }
}
