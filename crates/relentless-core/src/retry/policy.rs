//! Retry eligibility rules.

use crate::error::FetchError;

/// Sentinel retry count meaning "no ceiling".
pub const UNLIMITED_RETRIES: i32 = -1;

/// Decides whether a classified failure is eligible for another attempt.
///
/// Two upstream checks happen in the request loop before this policy is
/// consulted: a terminal error on the request refuses retries
/// unconditionally, and a caller-supplied override verdict is authoritative
/// when configured. What remains here is the kind rule and the attempt
/// ceiling:
///
/// - network failures are retryable only when enabled,
/// - HTTP failures are retryable only when the status is outside the
///   never-retry set AND at or above the minimum threshold — an explicit
///   never-retry status always wins,
/// - every other kind is terminal,
/// - and the attempt count must still be below the ceiling, unless the
///   ceiling is [`UNLIMITED_RETRIES`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: i32,
    minimum_status_code_for_retry: u16,
    unretryable_status_codes: Vec<u16>,
    retry_on_network_failure: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            minimum_status_code_for_retry: 400,
            unretryable_status_codes: vec![401, 403, 422],
            retry_on_network_failure: false,
        }
    }
}

impl RetryPolicy {
    /// Build a policy from its four rule inputs.
    pub fn new(
        max_retries: i32,
        minimum_status_code_for_retry: u16,
        unretryable_status_codes: Vec<u16>,
        retry_on_network_failure: bool,
    ) -> Self {
        Self {
            max_retries,
            minimum_status_code_for_retry,
            unretryable_status_codes,
            retry_on_network_failure,
        }
    }

    /// Whether another attempt is permitted after `error`, given that
    /// `attempt_count` attempts have already been made.
    pub fn permits(&self, error: &FetchError, attempt_count: u32) -> bool {
        let retryable = match error {
            FetchError::Network { .. } => self.retry_on_network_failure,
            FetchError::Http { response, .. } => {
                !self.unretryable_status_codes.contains(&response.status)
                    && response.status >= self.minimum_status_code_for_retry
            }
            _ => false,
        };

        retryable && self.attempts_remain(attempt_count)
    }

    fn attempts_remain(&self, attempt_count: u32) -> bool {
        self.max_retries == UNLIMITED_RETRIES
            || i64::from(attempt_count) < i64::from(self.max_retries)
    }
}
