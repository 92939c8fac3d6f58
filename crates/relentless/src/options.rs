//! Per-request configuration.

use relentless_core::error::FetchError;
use relentless_core::logging::{Logging, TracingLogger};
use relentless_core::retry::{RetryPolicy, TimingFunction};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Observer invoked once per failed attempt, including attempts later
/// superseded by a terminal error. A notification side channel: its return
/// value is ignored, though it may itself trip the kill switch.
pub type ErrorObserver = Arc<dyn Fn(&FetchError) + Send + Sync>;

/// Caller-supplied retry verdict. Authoritative when present: no default
/// rule applies, including the retry ceiling.
pub type RetryOverride = Arc<dyn Fn(&FetchError, u32) -> bool + Send + Sync>;

/// Knobs for one request, merged over defaults.
///
/// Build with [`RequestOptions::builder`] or construct directly; every
/// field has a default.
#[derive(Clone)]
pub struct RequestOptions {
    /// Backoff curve between attempts. Default: exponential.
    pub timing_function: TimingFunction,

    /// Upper bound on the backoff curve (rate-limit waits are exempt).
    /// Default: 60 seconds.
    pub max_delay: Duration,

    /// Time limit across all attempts of this request, after which it fails
    /// with `Timeout`. Default: none.
    pub total_request_time_limit: Option<Duration>,

    /// How many attempts to make; [`UNLIMITED_RETRIES`](relentless_core::retry::UNLIMITED_RETRIES)
    /// lifts the ceiling. Default: 3.
    pub retries: i32,

    /// The lowest HTTP status code eligible for retry. Default: 400.
    pub minimum_status_code_for_retry: u16,

    /// Status codes never retried, even above the minimum threshold.
    /// Default: 401, 403, 422.
    pub unretryable_status_codes: Vec<u16>,

    /// Whether to retry when the transport produced no response at all.
    /// Default: false.
    pub retry_on_network_failure: bool,

    /// Global failure budget across ALL requests on the shared context;
    /// once reached, no further transport calls are made. Default: none.
    pub max_errors: Option<u32>,

    /// Called once per failed attempt. Default: none.
    pub on_error: Option<ErrorObserver>,

    /// Overrides the whole retry decision when present. Default: none.
    pub should_retry: Option<RetryOverride>,

    /// Logging sink for request events. Default: [`TracingLogger`].
    pub logger: Arc<dyn Logging>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timing_function: TimingFunction::Exponential,
            max_delay: Duration::from_millis(60_000),
            total_request_time_limit: None,
            retries: 3,
            minimum_status_code_for_retry: 400,
            unretryable_status_codes: vec![401, 403, 422],
            retry_on_network_failure: false,
            max_errors: None,
            on_error: None,
            should_retry: None,
            logger: Arc::new(TracingLogger),
        }
    }
}

impl RequestOptions {
    /// Start a builder over the defaults.
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder {
            options: Self::default(),
        }
    }

    /// The kind-rule/ceiling evaluator derived from these options.
    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retries,
            self.minimum_status_code_for_retry,
            self.unretryable_status_codes.clone(),
            self.retry_on_network_failure,
        )
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("timing_function", &self.timing_function)
            .field("max_delay", &self.max_delay)
            .field("total_request_time_limit", &self.total_request_time_limit)
            .field("retries", &self.retries)
            .field(
                "minimum_status_code_for_retry",
                &self.minimum_status_code_for_retry,
            )
            .field("unretryable_status_codes", &self.unretryable_status_codes)
            .field("retry_on_network_failure", &self.retry_on_network_failure)
            .field("max_errors", &self.max_errors)
            .field("on_error", &self.on_error.is_some())
            .field("should_retry", &self.should_retry.is_some())
            .finish_non_exhaustive()
    }
}

/// Fluent builder for [`RequestOptions`].
#[derive(Clone)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
}

impl RequestOptionsBuilder {
    /// Set the backoff curve.
    pub fn timing_function(mut self, timing_function: TimingFunction) -> Self {
        self.options.timing_function = timing_function;
        self
    }

    /// Set the upper bound on the backoff curve.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.options.max_delay = max_delay;
        self
    }

    /// Bound the total elapsed time across all attempts.
    pub fn total_request_time_limit(mut self, limit: Duration) -> Self {
        self.options.total_request_time_limit = Some(limit);
        self
    }

    /// Set the attempt ceiling (−1 for unlimited).
    pub fn retries(mut self, retries: i32) -> Self {
        self.options.retries = retries;
        self
    }

    /// Set the lowest status code eligible for retry.
    pub fn minimum_status_code_for_retry(mut self, status: u16) -> Self {
        self.options.minimum_status_code_for_retry = status;
        self
    }

    /// Replace the set of never-retried status codes.
    pub fn unretryable_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.options.unretryable_status_codes = codes;
        self
    }

    /// Retry attempts whose transport produced no response at all.
    pub fn retry_on_network_failure(mut self, retry: bool) -> Self {
        self.options.retry_on_network_failure = retry;
        self
    }

    /// Set the global failure budget.
    pub fn max_errors(mut self, max_errors: u32) -> Self {
        self.options.max_errors = Some(max_errors);
        self
    }

    /// Observe every failed attempt.
    pub fn on_error(mut self, observer: impl Fn(&FetchError) + Send + Sync + 'static) -> Self {
        self.options.on_error = Some(Arc::new(observer));
        self
    }

    /// Take over the retry decision entirely.
    pub fn should_retry(
        mut self,
        verdict: impl Fn(&FetchError, u32) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.options.should_retry = Some(Arc::new(verdict));
        self
    }

    /// Swap the logging sink.
    pub fn logger(mut self, logger: Arc<dyn Logging>) -> Self {
        self.options.logger = logger;
        self
    }

    /// Finish the builder.
    pub fn build(self) -> RequestOptions {
        self.options
    }
}
