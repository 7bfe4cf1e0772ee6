//! Scripted transport and fixtures shared by the service tests

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::monitoring::{
    ApiGate, CostConfig, CostTracker, ManualClock, ManualSleeper, RateLimitConfig, RateLimiter,
};

use super::transport::{HttpTransport, MapsApi, Query};

/// Replays canned responses in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<std::result::Result<Value, String>>>,
    requests: Mutex<Vec<(String, Query)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: Value) -> Self {
        self.responses.lock().push_back(Ok(body));
        self
    }

    pub fn fail(self, reason: &str) -> Self {
        self.responses.lock().push_back(Err(reason.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<(String, Query)> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Value of a query parameter on the n-th request
    pub fn param(&self, index: usize, name: &str) -> Option<String> {
        self.requests.lock()[index]
            .1
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
    }
}

impl HttpTransport for ScriptedTransport {
    fn get_json(&self, url: &str, query: &Query) -> Result<Value> {
        self.requests.lock().push((url.to_string(), query.clone()));
        match self.responses.lock().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(reason)) => Err(Error::Transport {
                url: url.to_string(),
                reason,
            }),
            None => Err(Error::Other(format!("no scripted response for {}", url))),
        }
    }
}

/// Everything a service test needs, on a manual clock
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub api: MapsApi,
    pub limiter: Arc<RateLimiter>,
    pub costs: Arc<CostTracker>,
    pub clock: ManualClock,
    pub sleeper: ManualSleeper,
}

impl Harness {
    pub fn new(transport: ScriptedTransport) -> Self {
        Self::with_limits(transport, RateLimitConfig::new(60, 5000, 0.1))
    }

    pub fn with_limits(transport: ScriptedTransport, limits: RateLimitConfig) -> Self {
        let clock = ManualClock::new();
        let sleeper = ManualSleeper::new(clock.clone());
        let limiter = Arc::new(RateLimiter::with_time(
            limits,
            Arc::new(clock.clone()),
            Arc::new(sleeper.clone()),
        ));
        let costs = Arc::new(CostTracker::new(CostConfig::default()));
        let gate = ApiGate::new(Some(Arc::clone(&limiter)), Some(Arc::clone(&costs)));
        let transport = Arc::new(transport);
        let api = MapsApi::new(
            Arc::clone(&transport) as Arc<dyn HttpTransport>,
            "https://maps.test/api",
            "test-key",
            gate,
        );
        Self {
            transport,
            api,
            limiter,
            costs,
            clock,
            sleeper,
        }
    }
}

/// A search page with `count` results named `{prefix}{i}`
pub fn search_page(prefix: &str, count: usize, next_page_token: Option<&str>) -> Value {
    let results: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "place_id": format!("{}{}", prefix, i),
                "name": format!("Place {}{}", prefix, i)
            })
        })
        .collect();
    let mut body = json!({ "status": "OK", "results": results });
    if let Some(token) = next_page_token {
        body["next_page_token"] = Value::String(token.to_string());
    }
    body
}

pub fn status_only(status: &str) -> Value {
    json!({ "status": status, "results": [] })
}
