//! Google Maps web service clients
//!
//! Geocoding, places text search and place details. Every request goes
//! through [`MapsApi`], which admits it with the session rate limiter and
//! bills it to the cost tracker.

mod geocode;
mod place_details;
mod places_search;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use geocode::*;
pub use place_details::*;
pub use places_search::*;
pub use transport::*;
