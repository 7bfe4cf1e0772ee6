//! Admission and accounting around every outbound API call

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

use super::cost_tracker::{ApiCall, CostConfig, CostTracker};
use super::rate_limiter::{RateLimitConfig, RateLimiter};

/// Shared by all services of a session. Each call is admitted by the rate
/// limiter before it is sent and billed to the cost tracker once a response
/// came back. Either half may be switched off.
#[derive(Clone, Default)]
pub struct ApiGate {
    limiter: Option<Arc<RateLimiter>>,
    costs: Option<Arc<CostTracker>>,
}

impl ApiGate {
    pub fn new(limiter: Option<Arc<RateLimiter>>, costs: Option<Arc<CostTracker>>) -> Self {
        Self { limiter, costs }
    }

    /// Build the session gate described by the config
    pub fn from_config(config: &Config) -> Self {
        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::new(RateLimitConfig::from(&config.rate_limit))));
        let costs = config
            .costs
            .enabled
            .then(|| Arc::new(CostTracker::new(CostConfig::from(&config.costs))));
        Self { limiter, costs }
    }

    /// Block until the next request may go out
    pub fn admit(&self) -> Result<()> {
        match &self.limiter {
            Some(limiter) => limiter.wait_if_needed(),
            None => Ok(()),
        }
    }

    /// Bill one completed call
    pub fn record(&self, call: ApiCall) {
        if let Some(costs) = &self.costs {
            costs.track(call);
        }
    }

    pub fn limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }

    pub fn costs(&self) -> Option<&Arc<CostTracker>> {
        self.costs.as_ref()
    }
}
