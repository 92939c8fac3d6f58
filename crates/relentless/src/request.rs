//! The per-request retry loop.

use crate::context::SharedContext;
use crate::options::RequestOptions;
use crate::transport::{HttpTransport, Transport};
use relentless_core::error::FetchError;
use relentless_core::message::{HttpRequest, HttpResponse};
use relentless_core::retry::RetryPolicy;
use std::sync::Arc;
use tokio::time::{Duration, Instant, sleep};

/// One logical HTTP request with retries, rate-limit handling, a failure
/// budget, and a kill switch wrapped around it.
///
/// A `Request` owns its attempt counter and terminal-error slot and is
/// consumed by the call to [`Request::send`]; the state it shares with
/// sibling requests lives in the injected [`SharedContext`].
///
/// # Examples
///
/// ```ignore
/// use relentless::{HttpRequest, Request};
///
/// let response = Request::new("https://api.example.com/v1/widgets", HttpRequest::new("GET"))
///     .send()
///     .await?;
/// assert!(response.is_success());
/// ```
pub struct Request {
    url: String,
    request: HttpRequest,
    options: RequestOptions,
    policy: RetryPolicy,
    context: Arc<SharedContext>,
    transport: Arc<dyn Transport>,
    attempt_count: u32,
    terminal: Option<FetchError>,
    started: Instant,
}

impl Request {
    /// Build a request over the default options, the global context, and
    /// the stock transport.
    pub fn new(url: impl Into<String>, request: HttpRequest) -> Self {
        Self::with_options(url, request, RequestOptions::default())
    }

    /// Build a request with explicit options.
    ///
    /// The global failure budget is pre-checked here: a request constructed
    /// while the budget is already exhausted fails on `send` without ever
    /// invoking the transport.
    pub fn with_options(
        url: impl Into<String>,
        request: HttpRequest,
        options: RequestOptions,
    ) -> Self {
        let url = url.into();
        let context = SharedContext::global();
        let policy = options.retry_policy();
        let terminal = Self::exhausted_budget(&options, &context, &url, &request);

        Self {
            url,
            request,
            policy,
            context,
            transport: Arc::new(HttpTransport::default()),
            attempt_count: 0,
            terminal,
            started: Instant::now(),
            options,
        }
    }

    /// Couple this request to `context` instead of the global one.
    ///
    /// The budget pre-check is re-evaluated against the new context.
    pub fn with_context(mut self, context: Arc<SharedContext>) -> Self {
        self.terminal = Self::exhausted_budget(&self.options, &context, &self.url, &self.request);
        self.context = context;
        self
    }

    /// Perform attempts through `transport` instead of the stock one.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Drive the request to settlement: the first response with a status
    /// below 400, or the error that ended the loop.
    ///
    /// When a total-request-time limit is configured the loop races a
    /// deadline; the deadline firing settles the request with `Timeout` and
    /// drops the loop, discarding whatever attempt was in flight.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`]; see the taxonomy for which kinds are terminal
    /// and which were retried first.
    pub async fn send(&mut self) -> Result<HttpResponse, FetchError> {
        self.started = Instant::now();

        let result = match self.options.total_request_time_limit {
            Some(limit) => {
                let deadline_error = FetchError::timeout(self.url.clone(), self.request.clone());
                tokio::select! {
                    biased;
                    () = sleep(limit) => Err(deadline_error),
                    result = self.run_loop() => result,
                }
            }
            None => self.run_loop().await,
        };

        if let Err(error) = &result {
            let line = self.log_line(&format!("{:?}", error.kind()));
            self.options.logger.error(&line);
        }
        result
    }

    async fn run_loop(&mut self) -> Result<HttpResponse, FetchError> {
        loop {
            match self.attempt_once().await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if let Some(observer) = &self.options.on_error {
                        observer(&error);
                    }
                    if self.can_retry(&error) {
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }

    async fn attempt_once(&mut self) -> Result<HttpResponse, FetchError> {
        self.guard()?;

        self.attempt_count += 1;
        self.delay_if_needed().await;

        // Conditions may have shifted while sleeping
        self.guard()?;

        let response = match self.transport.send_http(&self.url, &self.request).await {
            Ok(response) => response,
            Err(transport_error) => {
                let error =
                    FetchError::network(self.url.clone(), self.request.clone(), transport_error);
                self.handle_failure(&error);
                return Err(self.terminal.clone().unwrap_or(error));
            }
        };

        if response.status < 400 {
            return Ok(response);
        }

        let error = FetchError::http(self.url.clone(), self.request.clone(), response);
        self.handle_failure(&error);
        // The terminal error, when present, supersedes the per-attempt one
        Err(self.terminal.clone().unwrap_or(error))
    }

    /// Refuse the attempt outright when the kill switch is off, the budget
    /// is spent, or a terminal error has already been recorded.
    fn guard(&mut self) -> Result<(), FetchError> {
        if !self.context.is_enabled() {
            return Err(FetchError::disabled(self.url.clone(), self.request.clone()));
        }

        if self.terminal.is_none() {
            self.terminal =
                Self::exhausted_budget(&self.options, &self.context, &self.url, &self.request);
        }

        if let Some(error) = &self.terminal {
            return Err(error.clone());
        }
        Ok(())
    }

    fn exhausted_budget(
        options: &RequestOptions,
        context: &SharedContext,
        url: &str,
        request: &HttpRequest,
    ) -> Option<FetchError> {
        options
            .max_errors
            .filter(|max| context.error_count() >= *max)
            .map(|max| FetchError::max_errors_exceeded(url.to_string(), request.clone(), max))
    }

    /// Wait out the longer of the backoff delay and the shared rate-limit
    /// window. A zero delay still yields so a pending deadline can win.
    async fn delay_if_needed(&self) {
        let backoff = self
            .options
            .timing_function
            .clamped(self.attempt_count, self.options.max_delay);
        let delay = backoff.max(self.context.rate_limit_delay(Instant::now()));

        if delay.is_zero() {
            tokio::task::yield_now().await;
            return;
        }

        let line = self.log_line(&format!("delay retry for {} ms", delay.as_millis()));
        self.options.logger.debug(&line);
        sleep(delay).await;
    }

    /// Bookkeeping applied to every classified failure, synchronously,
    /// before the retry decision: the shared counter, the budget trip, and
    /// rate-limit hints.
    fn handle_failure(&mut self, error: &FetchError) {
        let count = self.context.record_failure();
        if let Some(max) = self.options.max_errors {
            if count >= max {
                self.terminal = Some(FetchError::max_errors_exceeded(
                    self.url.clone(),
                    self.request.clone(),
                    max,
                ));
            }
        }

        if let FetchError::Http { response, .. } = error {
            match response.status {
                401 => {
                    let line = self.log_line("401 received");
                    self.options.logger.warn(&line);
                }
                429 => {
                    let line = self.log_line("rate limited");
                    self.options.logger.warn(&line);

                    let retry_after = response
                        .get_header("Retry-After")
                        .and_then(|value| value.trim().parse::<u64>().ok());
                    if let Some(seconds) = retry_after {
                        let until = Instant::now() + Duration::from_secs(seconds);
                        self.context.note_rate_limited_until(until);

                        // Waiting the window out would blow the time limit;
                        // settle now instead
                        if let Some(limit) = self.options.total_request_time_limit {
                            if until.duration_since(self.started) > limit {
                                self.terminal = Some(FetchError::rate_limited(
                                    self.url.clone(),
                                    self.request.clone(),
                                    response.clone(),
                                ));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn can_retry(&self, error: &FetchError) -> bool {
        // A request that has permanently failed never retries
        if self.terminal.is_some() {
            return false;
        }

        // A caller-supplied verdict is authoritative
        if let Some(should_retry) = &self.options.should_retry {
            return should_retry(error, self.attempt_count);
        }

        self.policy.permits(error, self.attempt_count)
    }

    fn log_line(&self, message: &str) -> String {
        format!(
            "{}: [{} {}]",
            message.to_uppercase(),
            self.request.method.to_uppercase(),
            self.url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_lines_tag_method_and_url() {
        let request = Request::new("https://example.com/x", HttpRequest::new("post"))
            .with_context(SharedContext::new());
        assert_eq!(
            request.log_line("rate limited"),
            "RATE LIMITED: [POST https://example.com/x]"
        );
    }
}
