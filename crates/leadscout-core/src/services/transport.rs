//! HTTP transport for the Maps web services

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::monitoring::{ApiCall, ApiGate};

/// Query parameters for one request
pub type Query = Vec<(&'static str, String)>;

/// Minimal blocking GET-with-query client
pub trait HttpTransport: Send + Sync {
    /// GET `url` with `query` and decode the body as JSON. Non-2xx responses
    /// are transport failures.
    fn get_json(&self, url: &str, query: &Query) -> Result<serde_json::Value>;
}

/// `reqwest` blocking transport with a response deadline
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get_json(&self, url: &str, query: &Query) -> Result<serde_json::Value> {
        let response = self.client.get(url).query(query).send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            error!("Request to {} failed: {}", url, status);
            return Err(Error::Transport {
                url: url.to_string(),
                reason: format!("{} - {}", status, body),
            });
        }

        Ok(response.json()?)
    }
}

/// Authenticated access to the Maps endpoints, routed through the session gate
#[derive(Clone)]
pub struct MapsApi {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
    gate: ApiGate,
}

impl MapsApi {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        gate: ApiGate,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            gate,
        }
    }

    /// Production client for the configured endpoint
    pub fn from_config(api: &ApiConfig, api_key: impl Into<String>, gate: ApiGate) -> Result<Self> {
        let transport = ReqwestTransport::new(api.request_timeout())?;
        Ok(Self::new(Arc::new(transport), &api.base_url, api_key, gate))
    }

    /// Admit, send and bill one request. The status field is left to the caller.
    pub fn get(&self, call: ApiCall, path: &str, mut query: Query) -> Result<serde_json::Value> {
        self.gate.admit()?;

        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} ({})", url, call.api_name());
        query.push(("key", self.api_key.clone()));
        let body = self.transport.get_json(&url, &query)?;

        self.gate.record(call);
        Ok(body)
    }
}
