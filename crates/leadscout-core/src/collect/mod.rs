//! Lead collection pipeline
//!
//! Geocode the area, search it for the keyword, then fetch details for
//! every place found and turn them into [`BusinessLead`]s.

mod classifier;

pub use classifier::*;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::{place_id_of, BusinessLead};
use crate::services::{GeocodeService, PlaceDetailsService, PlacesSearchService};

/// Orchestrates the three lookups for one area/keyword pair
pub struct LeadCollector {
    geocode: GeocodeService,
    search: PlacesSearchService,
    details: PlaceDetailsService,
}

impl LeadCollector {
    pub fn new(
        geocode: GeocodeService,
        search: PlacesSearchService,
        details: PlaceDetailsService,
    ) -> Self {
        Self {
            geocode,
            search,
            details,
        }
    }

    /// Collect leads for `keyword` in `area_name`.
    ///
    /// Places without a `place_id`, and places whose details lookup returns
    /// nothing, are skipped.
    pub fn collect_leads(
        &self,
        area_name: &str,
        keyword: &str,
        radius: Option<u32>,
        max_results: Option<usize>,
    ) -> Result<Vec<BusinessLead>> {
        let (lat, lng) = self.geocode.geocode_area(area_name)?;

        let raw_places = self
            .search
            .search_places(lat, lng, keyword, radius, max_results)?;

        let mut leads = Vec::with_capacity(raw_places.len());
        let mut skipped = 0;
        for place in &raw_places {
            let Some(place_id) = place_id_of(place) else {
                skipped += 1;
                continue;
            };

            match self.details.place_details(place_id)? {
                Some(details) => leads.push(BusinessLead::from_details(place_id, details)),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("Skipped {} of {} places", skipped, raw_places.len());
        }
        info!(
            "Collected {} leads for '{}' in '{}'",
            leads.len(),
            keyword,
            area_name
        );
        Ok(leads)
    }
}
