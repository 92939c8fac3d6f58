#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core building blocks for the `relentless` resilience layer.
//!
//! This crate holds the pure, I/O-free pieces that the request loop in the
//! `relentless` crate is assembled from:
//!
//! - **HTTP message records** ([`message::HttpRequest`], [`message::HttpResponse`])
//! - **Error taxonomy** ([`error::FetchError`], [`error::TransportError`])
//! - **Backoff timing** ([`retry::TimingFunction`])
//! - **Retry eligibility** ([`retry::RetryPolicy`])
//! - **Leveled logging capability** ([`logging::Logging`])
//!
//! Everything here is deterministic and synchronous, which is what makes the
//! retry loop built on top of it testable without a network.
//!
//! # Examples
//!
//! ```rust
//! use relentless_core::prelude::*;
//! use std::time::Duration;
//!
//! let delay = TimingFunction::Exponential.clamped(2, Duration::from_secs(60));
//! assert_eq!(delay, Duration::from_millis(1500));
//! ```

pub mod error;
pub mod logging;
pub mod message;
pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// Import all core building blocks with:
///
/// ```rust
/// use relentless_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorKind, FetchError, TransportError};
    pub use crate::logging::{Logging, NoopLogger, TracingLogger};
    pub use crate::message::{HttpRequest, HttpResponse};
    pub use crate::retry::{RetryPolicy, TimingFunction, UNLIMITED_RETRIES};
}
