//! Rate limiting and cost tracking for outbound API calls

mod clock;
mod cost_tracker;
mod gate;
mod rate_limiter;

pub use clock::*;
pub use cost_tracker::*;
pub use gate::*;
pub use rate_limiter::*;
