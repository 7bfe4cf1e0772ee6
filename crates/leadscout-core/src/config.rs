//! Configuration management for LeadScout

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Google Maps API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Search and pagination settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    /// Cost tracking
    #[serde(default)]
    pub costs: CostSettings,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional log file; logs go to stderr when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Directory CSV exports are written to and merged from
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            output_dir: default_output_dir(),
        }
    }
}

/// Google Maps API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the Maps web services
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Response deadline for every request (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read the API key from the environment, loading `.env` first
    pub fn resolve_api_key(&self) -> Result<String> {
        // A missing .env file is fine, the variable may come from the shell
        let _ = dotenvy::dotenv();
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::MissingApiKey {
                var: self.api_key_env.clone(),
            }),
        }
    }
}

/// Search and pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search radius in meters when the caller gives none
    #[serde(default = "default_radius")]
    pub default_radius: u32,

    /// Result cap when the caller gives none
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,

    /// Courtesy pause after each successful details lookup
    #[serde(default = "default_details_sleep")]
    pub details_sleep_seconds: f64,

    /// Pause before following a next_page_token (tokens are not valid immediately)
    #[serde(default = "default_next_page_sleep")]
    pub next_page_sleep_seconds: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius: default_radius(),
            default_max_results: default_max_results(),
            details_sleep_seconds: default_details_sleep(),
            next_page_sleep_seconds: default_next_page_sleep(),
        }
    }
}

impl SearchConfig {
    pub fn details_sleep(&self) -> Duration {
        Duration::from_secs_f64(self.details_sleep_seconds.max(0.0))
    }

    pub fn next_page_delay(&self) -> Duration {
        Duration::from_secs_f64(self.next_page_sleep_seconds.max(0.0))
    }
}

/// Rate limiting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Throttle outbound calls at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_requests_per_day")]
    pub requests_per_day: u32,

    #[serde(default = "default_min_delay")]
    pub min_delay_seconds: f64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: default_requests_per_minute(),
            requests_per_day: default_requests_per_day(),
            min_delay_seconds: default_min_delay(),
        }
    }
}

/// Cost tracking settings. Prices are USD per 1000 requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_geocoding_price")]
    pub geocoding_per_1000: f64,

    #[serde(default = "default_text_search_price")]
    pub places_text_search_per_1000: f64,

    #[serde(default = "default_details_price")]
    pub place_details_per_1000: f64,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            geocoding_per_1000: default_geocoding_price(),
            places_text_search_per_1000: default_text_search_price(),
            place_details_per_1000: default_details_price(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_api_key_env() -> String {
    "GOOGLE_MAPS_API_KEY".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_radius() -> u32 {
    3000
}

fn default_max_results() -> usize {
    60
}

fn default_details_sleep() -> f64 {
    0.15
}

fn default_next_page_sleep() -> f64 {
    2.5
}

fn default_true() -> bool {
    true
}

fn default_requests_per_minute() -> u32 {
    60 // 1 per second
}

fn default_requests_per_day() -> u32 {
    5000
}

fn default_min_delay() -> f64 {
    0.1
}

fn default_geocoding_price() -> f64 {
    5.00
}

fn default_text_search_price() -> f64 {
    32.00
}

fn default_details_price() -> f64 {
    17.00
}

/// Get the config directory (XDG: ~/.config/leadscout)
fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(crate::APP_NAME)
}

impl Config {
    /// Default config file path
    pub fn default_path() -> PathBuf {
        get_config_dir().join("config.toml")
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            info!("Loaded configuration from {:?}", path);
            config
        } else {
            info!("No config file found at {:?}, using defaults", path);
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = self.to_toml()?;
        std::fs::write(path, contents)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject values the rate limiter and services cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(invalid("api.base_url", "must not be empty"));
        }
        if self.rate_limit.requests_per_minute == 0 {
            return Err(invalid("rate_limit.requests_per_minute", "must be greater than 0"));
        }
        if self.rate_limit.requests_per_day == 0 {
            return Err(invalid("rate_limit.requests_per_day", "must be greater than 0"));
        }
        let non_negative = [
            ("rate_limit.min_delay_seconds", self.rate_limit.min_delay_seconds),
            ("search.details_sleep_seconds", self.search.details_sleep_seconds),
            ("search.next_page_sleep_seconds", self.search.next_page_sleep_seconds),
            ("costs.geocoding_per_1000", self.costs.geocoding_per_1000),
            ("costs.places_text_search_per_1000", self.costs.places_text_search_per_1000),
            ("costs.place_details_per_1000", self.costs.place_details_per_1000),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }
        if self.search.default_max_results == 0 {
            return Err(invalid("search.default_max_results", "must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> Error {
    Error::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
