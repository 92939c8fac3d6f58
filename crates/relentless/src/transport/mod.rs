//! Transport seam between the request loop and the actual network call.
//!
//! The loop only knows that a transport is an asynchronous operation that
//! resolves with a response (whatever its status) or fails before one was
//! available. The stock implementation is the reqwest-backed
//! [`HttpTransport`]; tests substitute scripted transports.

mod http;

pub use http::{HttpTransport, HttpTransportConfig};

use async_trait::async_trait;
use relentless_core::error::TransportError;
use relentless_core::message::{HttpRequest, HttpResponse};

/// One logical HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the call described by `request` against `url`.
    ///
    /// # Errors
    ///
    /// `Err` means no response was obtained at all (DNS, TCP, TLS, or
    /// transport-level timeout); a received response is always `Ok`, even
    /// with a failing status — classification is the request loop's job.
    async fn send_http(
        &self,
        url: &str,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError>;
}
