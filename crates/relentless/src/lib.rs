#![deny(unsafe_code)]
#![warn(missing_docs)]

//! A resilience layer in front of a single outbound HTTP call.
//!
//! [`Request`] drives one logical HTTP call through an attempt loop that
//! retries failed attempts with configurable backoff, honors server-issued
//! `Retry-After` hints, enforces a global failure budget shared by every
//! request in the process, bounds the total elapsed time per request, and
//! respects a process-wide kill switch.
//!
//! # Architecture
//!
//! - **[`Request`]**: the per-request orchestrator — guard checks, delay,
//!   transport call, classification, loop-or-terminate.
//! - **[`SharedContext`]**: the state that couples concurrent requests —
//!   kill switch, global error counter, rate-limit expiry. Injected, with a
//!   process-lifetime [`SharedContext::global`] default.
//! - **[`Transport`]**: the seam to the actual network call; the stock
//!   [`HttpTransport`] is reqwest-backed.
//! - **[`RequestOptions`]**: per-request knobs over sensible defaults.
//!
//! # Usage
//!
//! ```ignore
//! use relentless::{HttpRequest, Request, RequestOptions, TimingFunction};
//! use std::time::Duration;
//!
//! let options = RequestOptions::builder()
//!     .retries(5)
//!     .timing_function(TimingFunction::Constant)
//!     .total_request_time_limit(Duration::from_secs(30))
//!     .build();
//!
//! let response = Request::with_options(
//!     "https://api.example.com/v1/widgets",
//!     HttpRequest::new("GET"),
//!     options,
//! )
//! .send()
//! .await?;
//! ```

pub mod context;
pub mod options;
pub mod request;
pub mod transport;

pub use context::SharedContext;
pub use options::{ErrorObserver, RequestOptions, RequestOptionsBuilder, RetryOverride};
pub use request::Request;
pub use transport::{HttpTransport, HttpTransportConfig, Transport};

// Re-export the core vocabulary so callers need only this crate.
pub use relentless_core::error::{ErrorKind, FetchError, TransportError};
pub use relentless_core::logging::{Logging, NoopLogger, TracingLogger};
pub use relentless_core::message::{HttpRequest, HttpResponse};
pub use relentless_core::retry::{RetryPolicy, TimingFunction, UNLIMITED_RETRIES};
