//! Process-wide circuit state and rate-limit coordination.
//!
//! One [`SharedContext`] couples every request that holds a handle to it:
//! the kill switch, the cumulative error counter behind the failure budget,
//! and the shared rate-limit expiry that one request's 429 imposes on its
//! siblings. The process-lifetime instance from [`SharedContext::global`]
//! is the default; tests construct isolated contexts with
//! [`SharedContext::new`] instead of resetting shared state.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use tokio::time::{Duration, Instant};

/// Safety pad added on top of a server-issued rate-limit expiry so the next
/// attempt lands comfortably after the window reopens.
const RATE_LIMIT_PAD: Duration = Duration::from_millis(100);

static GLOBAL: LazyLock<Arc<SharedContext>> = LazyLock::new(|| Arc::new(SharedContext::default()));

/// State shared by every request that holds a handle to it.
///
/// All updates happen synchronously during classification, before the loop
/// yields, so a concurrently-running sibling observes a consistent value at
/// its next guard check.
#[derive(Debug)]
pub struct SharedContext {
    enabled: AtomicBool,
    error_count: AtomicU32,
    /// Rate-limit expiry as whole milliseconds after `base`; 0 means unset.
    rate_limited_until_ms: AtomicU64,
    base: Instant,
}

impl Default for SharedContext {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            error_count: AtomicU32::new(0),
            rate_limited_until_ms: AtomicU64::new(0),
            base: Instant::now(),
        }
    }
}

impl SharedContext {
    /// Create an isolated context, unrelated to the global one.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The process-lifetime context every request uses by default.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Trip the kill switch: every subsequent guard check fails with
    /// `Disabled` and no transport call is made.
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Reopen the circuit.
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Whether requests through this context are currently allowed.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// The cumulative failure count across every request on this context.
    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::SeqCst)
    }

    /// Administrative reset of the failure counter; nothing else resets it.
    pub fn reset_error_count(&self) {
        self.error_count.store(0, Ordering::SeqCst);
    }

    /// Record one failed attempt and return the updated count.
    pub fn record_failure(&self) -> u32 {
        self.error_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Advance the shared rate-limit expiry to `until`.
    ///
    /// The expiry only moves forward: a later, shorter hint never pulls an
    /// already-published expiry back.
    pub fn note_rate_limited_until(&self, until: Instant) {
        let offset = until.saturating_duration_since(self.base).as_millis() as u64;
        // An expiry exactly at `base` would collide with the unset marker
        self.rate_limited_until_ms
            .fetch_max(offset.max(1), Ordering::SeqCst);
    }

    /// The shared rate-limit expiry, if one has been published.
    pub fn rate_limited_until(&self) -> Option<Instant> {
        match self.rate_limited_until_ms.load(Ordering::SeqCst) {
            0 => None,
            ms => Some(self.base + Duration::from_millis(ms)),
        }
    }

    /// How much longer any request must wait, as of `now`, before the
    /// rate-limit window (plus the safety pad) reopens.
    ///
    /// Never negative, and never subject to the backoff cap.
    pub fn rate_limit_delay(&self, now: Instant) -> Duration {
        match self.rate_limited_until() {
            Some(until) => (until + RATE_LIMIT_PAD).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}
