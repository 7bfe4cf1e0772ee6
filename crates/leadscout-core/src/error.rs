//! Error types for LeadScout

use thiserror::Error;

/// Result type alias using LeadScout's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for LeadScout
#[derive(Error, Debug)]
pub enum Error {
    // Transport errors
    #[error("Transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Upstream API errors
    #[error("{api} API error: {status}")]
    UpstreamApi {
        api: &'static str,
        status: String,
        payload: serde_json::Value,
    },

    // Quota errors
    #[error(
        "Daily API limit reached ({limit} requests). Please wait 24 hours or increase your quota."
    )]
    DailyQuotaExceeded { limit: u32 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("{var} is not set. Add it to your .env file or environment variables.")]
    MissingApiKey { var: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Returns true if the whole collection session has to stop
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(self, Error::DailyQuotaExceeded { .. } | Error::MissingApiKey { .. })
    }

    /// Upstream status string, if this error came from an API status check
    pub fn upstream_status(&self) -> Option<&str> {
        match self {
            Error::UpstreamApi { status, .. } => Some(status.as_str()),
            _ => None,
        }
    }

    /// Returns a short error code for logs and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            Error::Transport { .. } | Error::Http(_) => "TRANSPORT_ERROR",
            Error::UpstreamApi { .. } => "UPSTREAM_API_ERROR",
            Error::DailyQuotaExceeded { .. } => "DAILY_QUOTA_EXCEEDED",
            Error::Config(_) | Error::InvalidConfig { .. } | Error::MissingApiKey { .. } => {
                "CONFIG_ERROR"
            }
            Error::Csv(_) | Error::Pattern(_) => "EXPORT_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-friendly action message for recoverable errors
    pub fn action_hint(&self) -> Option<&'static str> {
        match self {
            Error::DailyQuotaExceeded { .. } => {
                Some("Wait 24 hours or raise rate_limit.requests_per_day")
            }
            Error::MissingApiKey { .. } => {
                Some("Set GOOGLE_MAPS_API_KEY in .env or the environment")
            }
            Error::UpstreamApi { status, .. } if status == "REQUEST_DENIED" => {
                Some("Check that the API key is valid and the Places API is enabled")
            }
            Error::UpstreamApi { status, .. } if status == "OVER_QUERY_LIMIT" => {
                Some("Lower rate_limit.requests_per_minute or check billing")
            }
            Error::Transport { .. } | Error::Http(_) => Some("Check your network connection"),
            _ => None,
        }
    }
}
