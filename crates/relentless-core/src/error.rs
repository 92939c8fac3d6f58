//! Error taxonomy for the resilience layer.
//!
//! Two boundaries, two types: [`TransportError`] is what a transport
//! implementation reports when it never obtained a response at all, and
//! [`FetchError`] is the closed set of ways a whole request can fail, used
//! uniformly wherever an error crosses a boundary (observer callback,
//! rejection, retry-policy input).

use crate::message::{HttpRequest, HttpResponse};
use thiserror::Error;

/// Failure raised by a transport before any HTTP status was available.
///
/// String-backed so records stay cheap to clone; the request loop never
/// inspects the variant, only wraps it into [`FetchError::Network`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The transport gave up waiting for the server.
    #[error("transport timed out")]
    Timeout,

    /// The request description could not be turned into a wire request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Anything else the transport could not express.
    #[error("{0}")]
    Other(String),
}

/// Discriminant for [`FetchError`], handy for matching in tests and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The total-request-time limit elapsed before settlement.
    Timeout,
    /// The global error budget was reached or exceeded.
    MaxErrorsExceeded,
    /// The transport never produced a response.
    Network,
    /// The kill switch was off at guard time.
    Disabled,
    /// The server answered with a status of 400 or above.
    Http,
    /// Honoring a rate-limit hint would overrun the time limit.
    RateLimited,
}

/// Terminal outcome of a request: the closed set of failure kinds.
///
/// Every variant carries the target URL and the request description that
/// produced it; the response-bearing kinds additionally carry the transport
/// response, and [`FetchError::Network`] the underlying transport failure.
/// Records are immutable once constructed; build them through the
/// one-constructor-per-kind factory functions below.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The total-request-time limit elapsed before the request settled.
    #[error("request timed out: [{} {}]", .request.method, .url)]
    Timeout {
        /// Target URL.
        url: String,
        /// The request description in flight when the limit fired.
        request: HttpRequest,
    },

    /// The shared error counter reached the configured budget.
    #[error("global error limit of {} reached: [{} {}]", .limit, .request.method, .url)]
    MaxErrorsExceeded {
        /// Target URL.
        url: String,
        /// The request description that was refused.
        request: HttpRequest,
        /// The configured budget that was exhausted.
        limit: u32,
    },

    /// The transport failed without producing a response.
    #[error("network failure: [{} {}]", .request.method, .url)]
    Network {
        /// Target URL.
        url: String,
        /// The request description that failed.
        request: HttpRequest,
        /// What the transport reported.
        #[source]
        source: TransportError,
    },

    /// Requests are globally disabled.
    #[error("requests are disabled: [{} {}]", .request.method, .url)]
    Disabled {
        /// Target URL.
        url: String,
        /// The request description that was refused.
        request: HttpRequest,
    },

    /// The server answered with a failing status.
    #[error("HTTP {} received: [{} {}]", .response.status, .request.method, .url)]
    Http {
        /// Target URL.
        url: String,
        /// The request description that failed.
        request: HttpRequest,
        /// The failing response, untouched.
        response: HttpResponse,
    },

    /// The server's rate-limit hint pushed the next attempt past the
    /// total-request-time limit.
    #[error("rate limited past the request time limit: [{} {}]", .request.method, .url)]
    RateLimited {
        /// Target URL.
        url: String,
        /// The request description that was cut short.
        request: HttpRequest,
        /// The 429 response that carried the hint.
        response: HttpResponse,
    },
}

impl FetchError {
    /// The time limit fired before the request settled.
    pub fn timeout(url: impl Into<String>, request: HttpRequest) -> Self {
        Self::Timeout {
            url: url.into(),
            request,
        }
    }

    /// The global error budget of `limit` is exhausted.
    pub fn max_errors_exceeded(url: impl Into<String>, request: HttpRequest, limit: u32) -> Self {
        Self::MaxErrorsExceeded {
            url: url.into(),
            request,
            limit,
        }
    }

    /// The transport failed with `source` before any response arrived.
    pub fn network(url: impl Into<String>, request: HttpRequest, source: TransportError) -> Self {
        Self::Network {
            url: url.into(),
            request,
            source,
        }
    }

    /// The kill switch is off.
    pub fn disabled(url: impl Into<String>, request: HttpRequest) -> Self {
        Self::Disabled {
            url: url.into(),
            request,
        }
    }

    /// The server answered with `response`, status 400 or above.
    pub fn http(url: impl Into<String>, request: HttpRequest, response: HttpResponse) -> Self {
        Self::Http {
            url: url.into(),
            request,
            response,
        }
    }

    /// Waiting out the rate-limit hint in `response` would overrun the
    /// time limit.
    pub fn rate_limited(url: impl Into<String>, request: HttpRequest, response: HttpResponse) -> Self {
        Self::RateLimited {
            url: url.into(),
            request,
            response,
        }
    }

    /// Which kind of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::MaxErrorsExceeded { .. } => ErrorKind::MaxErrorsExceeded,
            Self::Network { .. } => ErrorKind::Network,
            Self::Disabled { .. } => ErrorKind::Disabled,
            Self::Http { .. } => ErrorKind::Http,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
        }
    }

    /// The target URL the failing request was aimed at.
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url, .. }
            | Self::MaxErrorsExceeded { url, .. }
            | Self::Network { url, .. }
            | Self::Disabled { url, .. }
            | Self::Http { url, .. }
            | Self::RateLimited { url, .. } => url,
        }
    }

    /// The request description that produced this error.
    pub fn request(&self) -> &HttpRequest {
        match self {
            Self::Timeout { request, .. }
            | Self::MaxErrorsExceeded { request, .. }
            | Self::Network { request, .. }
            | Self::Disabled { request, .. }
            | Self::Http { request, .. }
            | Self::RateLimited { request, .. } => request,
        }
    }

    /// The transport response, for the kinds that carry one.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Http { response, .. } | Self::RateLimited { response, .. } => Some(response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::error::Error as _;

    fn request() -> HttpRequest {
        HttpRequest::new("POST").with_text_body("payload")
    }

    #[test]
    fn factory_round_trip_is_lossless() {
        let response = HttpResponse::new(503, HashMap::new(), b"busy".to_vec());
        let error = FetchError::http("https://api.example.com/v1", request(), response);

        assert_eq!(error.kind(), ErrorKind::Http);
        assert_eq!(error.url(), "https://api.example.com/v1");
        assert_eq!(error.request().method, "POST");
        assert_eq!(error.response().unwrap().status, 503);
        assert_eq!(error.response().unwrap().body, b"busy".to_vec());
    }

    #[test]
    fn every_kind_maps_to_its_discriminant() {
        let response = HttpResponse::new(429, HashMap::new(), Vec::new());
        let cases = vec![
            (
                FetchError::timeout("u", request()),
                ErrorKind::Timeout,
            ),
            (
                FetchError::max_errors_exceeded("u", request(), 5),
                ErrorKind::MaxErrorsExceeded,
            ),
            (
                FetchError::network("u", request(), TransportError::Timeout),
                ErrorKind::Network,
            ),
            (FetchError::disabled("u", request()), ErrorKind::Disabled),
            (
                FetchError::http("u", request(), response.clone()),
                ErrorKind::Http,
            ),
            (
                FetchError::rate_limited("u", request(), response),
                ErrorKind::RateLimited,
            ),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind);
            assert_eq!(error.url(), "u");
        }
    }

    #[test]
    fn budget_errors_carry_the_configured_limit() {
        let error = FetchError::max_errors_exceeded("u", request(), 7);
        match error {
            FetchError::MaxErrorsExceeded { limit, .. } => assert_eq!(limit, 7),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn network_errors_chain_their_source() {
        let error = FetchError::network(
            "u",
            request(),
            TransportError::Connection("refused".to_string()),
        );

        let source = error.source().expect("network errors have a source");
        assert_eq!(source.to_string(), "connection failed: refused");
    }

    #[test]
    fn display_tags_method_and_url() {
        let error = FetchError::disabled("https://example.com", HttpRequest::new("DELETE"));
        let rendered = error.to_string();
        assert!(rendered.contains("DELETE"), "{rendered}");
        assert!(rendered.contains("https://example.com"), "{rendered}");

        let response = HttpResponse::new(500, HashMap::new(), Vec::new());
        let http = FetchError::http("u", HttpRequest::default(), response);
        assert!(http.to_string().contains("500"));
    }
}
