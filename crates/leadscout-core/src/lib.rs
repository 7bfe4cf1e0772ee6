//! LeadScout Core Library
//!
//! Collects local business leads from the Google Maps web services
//! (geocoding, places text search, place details) under a sliding-window
//! rate limiter and a per-session cost tracker, then splits them by
//! website presence and writes them to CSV.

pub mod collect;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod monitoring;
pub mod services;

pub use config::Config;
pub use error::{Error, Result};
pub use models::*;

/// Application name for config paths
pub const APP_NAME: &str = "leadscout";
