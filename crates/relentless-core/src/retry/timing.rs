//! Delay curves between attempts.

use std::time::Duration;

/// Maps an attempt count to the delay taken before that attempt.
///
/// The count is 1-based and is read at the time of the previous failed
/// attempt: the delay before attempt 1 is `delay(1)`, the delay before the
/// retry that follows a failed attempt 1 is `delay(2)`, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingFunction {
    /// `((n² − 1) / 2) × 1000` milliseconds.
    ///
    /// The first attempt is immediate: n=1 yields 0 ms, n=2 yields 1500 ms,
    /// n=3 yields 4000 ms.
    #[default]
    Exponential,

    /// A flat 1000 ms regardless of the attempt count.
    Constant,
}

impl TimingFunction {
    /// The raw, uncapped delay for `attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Exponential => {
                let n = u64::from(attempt);
                Duration::from_millis(n.saturating_mul(n).saturating_sub(1).saturating_mul(500))
            }
            Self::Constant => Duration::from_millis(1000),
        }
    }

    /// The delay for `attempt`, clamped to `[0, max_delay]`.
    ///
    /// Rate-limit waits are not subject to this cap; clamping applies to the
    /// backoff curve alone.
    pub fn clamped(&self, attempt: u32, max_delay: Duration) -> Duration {
        self.delay(attempt).min(max_delay)
    }
}
