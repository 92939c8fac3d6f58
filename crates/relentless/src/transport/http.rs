//! reqwest-backed stock transport.

use super::Transport;
use async_trait::async_trait;
use relentless_core::error::TransportError;
use relentless_core::message::{HttpRequest, HttpResponse};
use reqwest::Client as ReqwestClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Stock [`Transport`] over a pooled reqwest client.
///
/// Status codes are passed through untouched; only transport-level failures
/// (connect, TLS, socket timeout) surface as `Err`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<ReqwestClient>,
}

impl HttpTransport {
    /// Create a transport with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError::Connection`] if the underlying client
    /// cannot be constructed.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError::Connection`] if the underlying client
    /// cannot be constructed.
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new().expect("Failed to create HTTP transport with defaults")
    }
}

fn parse_method(method: &str) -> Result<reqwest::Method, TransportError> {
    match method.to_uppercase().as_str() {
        "GET" => Ok(reqwest::Method::GET),
        "POST" => Ok(reqwest::Method::POST),
        "PUT" => Ok(reqwest::Method::PUT),
        "DELETE" => Ok(reqwest::Method::DELETE),
        "PATCH" => Ok(reqwest::Method::PATCH),
        "HEAD" => Ok(reqwest::Method::HEAD),
        "OPTIONS" => Ok(reqwest::Method::OPTIONS),
        other => Err(TransportError::InvalidRequest(format!(
            "unsupported HTTP method: {other}"
        ))),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_http(
        &self,
        url: &str,
        request: &HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let method = parse_method(&request.method)?;
        let mut req = self.client.request(method, url);

        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else if e.is_connect() {
                TransportError::Connection(e.to_string())
            } else {
                TransportError::Other(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?
            .to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}

/// Transport-level knobs for the stock client.
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Per-call socket timeout; firing surfaces as a network-level failure,
    /// distinct from the request loop's total time limit.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            connect_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 10,
        }
    }
}
