//! Sliding-window rate limiter for Google Maps API requests
//!
//! Keeps the exact timestamps of admitted requests for the trailing minute
//! and the trailing day. Minute pressure is absorbed by blocking the caller;
//! an exhausted day window is an error.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RateLimitSettings;
use crate::error::{Error, Result};

use super::clock::{Clock, MonotonicClock, Sleeper, ThreadSleeper};

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(86_400);

/// Rate limit configuration. Defaults to one request per second and 5000
/// per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    pub requests_per_minute: u32,
    pub requests_per_day: u32,
    pub min_delay: Duration,
}

impl RateLimitConfig {
    pub fn new(requests_per_minute: u32, requests_per_day: u32, min_delay_seconds: f64) -> Self {
        Self {
            requests_per_minute,
            requests_per_day,
            min_delay: Duration::from_secs_f64(min_delay_seconds.max(0.0)),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(60, 5000, 0.1)
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.requests_per_minute,
            settings.requests_per_day,
            settings.min_delay_seconds,
        )
    }
}

/// Snapshot of how much of each window is in use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLimitUsage {
    pub requests_last_minute: usize,
    pub requests_today: usize,
    pub minute_limit: u32,
    pub day_limit: u32,
    pub minute_usage_percent: f64,
    pub day_usage_percent: f64,
}

#[derive(Debug, Default)]
struct Windows {
    minute: VecDeque<Duration>,
    day: VecDeque<Duration>,
    last_request: Option<Duration>,
}

impl Windows {
    /// Both deques are non-decreasing, so popping from the front is enough.
    fn evict(&mut self, now: Duration) {
        evict_older_than(&mut self.minute, now, MINUTE);
        evict_older_than(&mut self.day, now, DAY);
    }

    fn record(&mut self, now: Duration) {
        self.minute.push_back(now);
        self.day.push_back(now);
        self.last_request = Some(now);
    }
}

/// Drops entries whose age has reached `max_age`. Inclusive, so a slot is free
/// again exactly when the minute wait computed in `wait_if_needed` ends.
fn evict_older_than(window: &mut VecDeque<Duration>, now: Duration, max_age: Duration) {
    while let Some(&oldest) = window.front() {
        if now.saturating_sub(oldest) >= max_age {
            window.pop_front();
        } else {
            break;
        }
    }
}

fn percent(used: usize, limit: u32) -> f64 {
    if limit == 0 {
        return 100.0;
    }
    used as f64 / f64::from(limit) * 100.0
}

/// Rate limiter shared by every service in a collection session
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Create a limiter on the real clock
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_time(
            config,
            Arc::new(MonotonicClock::default()),
            Arc::new(ThreadSleeper),
        )
    }

    /// Create a limiter with an injected clock and sleeper
    pub fn with_time(
        config: RateLimitConfig,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            clock,
            sleeper,
            windows: Mutex::new(Windows::default()),
        }
    }

    /// Block until one more request may be sent, then record it.
    ///
    /// Fails with [`Error::DailyQuotaExceeded`] when the day window is full;
    /// nothing is recorded in that case. A `requests_per_minute` of zero is a
    /// misconfiguration that `Config::validate` rejects.
    pub fn wait_if_needed(&self) -> Result<()> {
        // Held across the sleeps so admissions stay in time order
        let mut windows = self.windows.lock();
        let mut now = self.clock.now();
        windows.evict(now);

        let per_minute = self.config.requests_per_minute as usize;
        while windows.minute.len() >= per_minute {
            let Some(&oldest) = windows.minute.front() else {
                break;
            };
            let wait = MINUTE.saturating_sub(now.saturating_sub(oldest));
            if !wait.is_zero() {
                warn!(
                    "Per-minute limit reached ({} requests). Waiting {:.2}s...",
                    self.config.requests_per_minute,
                    wait.as_secs_f64()
                );
                self.sleeper.sleep(wait);
            }
            now = self.clock.now();
            windows.evict(now);
        }

        if windows.day.len() >= self.config.requests_per_day as usize {
            return Err(Error::DailyQuotaExceeded {
                limit: self.config.requests_per_day,
            });
        }

        if let Some(last) = windows.last_request {
            let since_last = now.saturating_sub(last);
            if since_last < self.config.min_delay {
                self.sleeper.sleep(self.config.min_delay - since_last);
                now = self.clock.now();
            }
        }

        windows.record(now);
        debug!(
            minute = windows.minute.len(),
            day = windows.day.len(),
            "Rate limiter: request allowed"
        );
        Ok(())
    }

    /// Current window usage. Drops stale entries but never records a request.
    pub fn current_usage(&self) -> RateLimitUsage {
        let mut windows = self.windows.lock();
        windows.evict(self.clock.now());

        let minute = windows.minute.len();
        let day = windows.day.len();
        RateLimitUsage {
            requests_last_minute: minute,
            requests_today: day,
            minute_limit: self.config.requests_per_minute,
            day_limit: self.config.requests_per_day,
            minute_usage_percent: percent(minute, self.config.requests_per_minute),
            day_usage_percent: percent(day, self.config.requests_per_day),
        }
    }

    /// Time of the last admitted request on this limiter's clock
    pub fn last_request_time(&self) -> Option<Duration> {
        self.windows.lock().last_request
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
