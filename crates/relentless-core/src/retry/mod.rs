//! Backoff timing and retry eligibility.
//!
//! Two deterministic pieces of the retry loop live here:
//!
//! - [`TimingFunction`] maps an attempt count to an inter-attempt delay.
//! - [`RetryPolicy`] decides whether a classified failure is eligible for
//!   another attempt.
//!
//! Neither touches the clock or the network; the `relentless` crate owns the
//! sleeping and the shared state.

mod policy;
mod timing;

pub use policy::{RetryPolicy, UNLIMITED_RETRIES};
pub use timing::TimingFunction;
