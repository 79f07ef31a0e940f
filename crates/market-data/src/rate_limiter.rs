//! Token bucket rate limiter for the symbol lookup provider.
//!
//! The limiter caps outbound lookup calls to a configurable quota per
//! window (Finnhub free tier: 60 calls per minute). It is an explicitly
//! constructed, injectable object shared by all workers via `Arc` - there
//! is no ambient singleton.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Default quota: 60 requests per minute (Finnhub free tier).
const DEFAULT_MAX_REQUESTS: u32 = 60;

/// Default window duration.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter configuration.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum number of permits per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Internal bucket state.
///
/// The bucket starts full and refills to full capacity once a whole
/// window has elapsed since the last refill. Together with consumption
/// under the lock this keeps starts within any window-length interval
/// at or below capacity.
#[derive(Debug)]
struct TokenBucket {
    /// Permits currently available.
    tokens: u32,
    /// Maximum bucket capacity.
    capacity: u32,
    /// Window duration.
    window: Duration,
    /// Start of the current window.
    last_refill: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let capacity = config.max_requests.max(1);
        Self {
            tokens: capacity,
            capacity,
            window: config.window,
            last_refill: Instant::now(),
        }
    }

    /// Refill to full capacity when the current window has elapsed.
    fn refill(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_refill) >= self.window {
            self.tokens = self.capacity;
            self.last_refill = now;
        }
    }

    /// Try to consume one permit.
    fn try_acquire(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1 {
            if self.tokens == self.capacity {
                // A full bucket's window starts at its first use, so a
                // burst plus the next refill can never share one window
                self.last_refill = Instant::now();
            }
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// Time until the next refill makes a permit available.
    fn time_until_available(&mut self) -> Duration {
        self.refill();

        if self.tokens >= 1 {
            Duration::ZERO
        } else {
            self.window
                .saturating_sub(self.last_refill.elapsed())
                // Wake just after the boundary so the refill observes a
                // full elapsed window.
                .saturating_add(Duration::from_millis(1))
        }
    }
}

/// Token bucket rate limiter shared across concurrent workers.
///
/// All state mutation happens under a single mutex, so no two callers
/// can observe and consume the same permit. Waiters in [`acquire`]
/// re-contend after each refill; every refill admits at least one of
/// them, so every waiter eventually completes.
///
/// [`acquire`]: RateLimiter::acquire
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Create a rate limiter with the default quota (60/minute).
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    /// Create a rate limiter with a custom quota.
    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(&config)),
        }
    }

    /// Lock the bucket mutex, recovering from poison if necessary.
    ///
    /// For rate limiting it is safe to recover from a poisoned mutex:
    /// the worst case is slightly incorrect rate limiting, which beats
    /// panicking.
    fn lock_bucket(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Acquire one permit, waiting as long as needed.
    ///
    /// Waits (asynchronously) until a permit is available. Callers that
    /// need a deadline should wrap this in their own timeout.
    pub async fn acquire(&self) {
        loop {
            let wait_time = {
                let mut bucket = self.lock_bucket();

                if bucket.try_acquire() {
                    debug!("Rate limiter: acquired permit");
                    return;
                }

                bucket.time_until_available()
            };

            if wait_time > Duration::ZERO {
                debug!("Rate limiter: waiting {:?} for next window", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
    }

    /// Try to acquire a permit without waiting.
    ///
    /// Returns true if a permit was acquired, false if rate limited.
    pub fn try_acquire(&self) -> bool {
        self.lock_bucket().try_acquire()
    }

    /// Permits remaining in the current window.
    pub fn remaining(&self) -> u32 {
        let mut bucket = self.lock_bucket();
        bucket.refill();
        bucket.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
