//! Data models for LeadScout
//!
//! Business leads and the Google Places payloads they are built from.

mod lead;
mod place;

pub use lead::*;
pub use place::*;
