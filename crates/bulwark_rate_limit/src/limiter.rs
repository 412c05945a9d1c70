//! Token-bucket admission gate with a FIFO wait queue.
//!
//! Tokens accumulate continuously at `capacity / window` per second, capped at
//! `capacity`. A caller that finds a whole token (and nobody queued ahead of
//! it) is admitted immediately. Otherwise it joins the wait queue, and a single
//! drain task per limiter sleeps until the next token is due, admits as many
//! queued callers as the bucket allows in arrival order, and re-arms itself
//! while callers remain. A drain task that is dropped early (runtime shutdown,
//! for one) hands the job back to the next `acquire`.
//!
//! All bucket state sits behind one mutex that is never held across an await.

use bulwark_error::{RateLimitError, RateLimitErrorKind};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

/// Refill arithmetic slack, so float rounding never strands a whole token.
const EPSILON: f64 = 1e-9;

/// Mutable bucket state.
#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
    waiters: VecDeque<oneshot::Sender<()>>,
    draining: bool,
    // Bumped by reset so a stale drain task knows to stop.
    generation: u64,
}

impl Bucket {
    fn refill(&mut self, now: Instant, capacity: f64, per_second: f64) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * per_second).min(capacity);
        self.last_refill = now;
        trace!(tokens = self.tokens, "Refilled bucket");
    }

    fn has_token(&self) -> bool {
        self.tokens + EPSILON >= 1.0
    }

    fn take_token(&mut self) {
        self.tokens = (self.tokens - 1.0).max(0.0);
    }

    fn live_waiters(&self) -> usize {
        self.waiters.iter().filter(|w| !w.is_closed()).count()
    }

    /// Hand whole tokens to queued callers in arrival order.
    fn admit_waiters(&mut self) -> usize {
        let mut admitted = 0;
        while self.has_token() {
            let Some(waiter) = self.waiters.pop_front() else {
                break;
            };
            // A closed channel means the caller gave up; its token stays put.
            if waiter.send(()).is_ok() {
                self.take_token();
                admitted += 1;
                trace!(tokens = self.tokens, "Admitted queued caller");
            }
        }
        self.waiters.retain(|w| !w.is_closed());
        admitted
    }
}

#[derive(Debug)]
struct Shared {
    capacity: u32,
    window: Duration,
    per_second: f64,
    bucket: Mutex<Bucket>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Bucket> {
        self.bucket.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time until the bucket holds one whole token, given what it holds now.
    fn wait_for_next_token(&self, tokens: f64) -> Duration {
        let deficit = (1.0 - tokens).max(0.0);
        let nanos = (deficit / self.per_second * 1e9).ceil();
        Duration::from_nanos(nanos as u64)
    }
}

/// A queued caller's place in line.
///
/// If the caller goes away after being granted a token but before seeing the
/// grant, the token goes back in the bucket.
struct Ticket {
    receiver: oneshot::Receiver<()>,
    shared: Arc<Shared>,
    settled: bool,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if self.settled || self.receiver.try_recv().is_err() {
            return;
        }
        let mut bucket = self.shared.lock();
        let capacity = f64::from(self.shared.capacity);
        bucket.refill(Instant::now(), capacity, self.shared.per_second);
        bucket.tokens = (bucket.tokens + 1.0).min(capacity);
        let admitted = bucket.admit_waiters();
        debug!(
            admitted,
            tokens = bucket.tokens,
            "Returned token from abandoned admission"
        );
    }
}

/// Clears `draining` when a drain task is dropped before finishing, so the
/// next `acquire` spawns a replacement.
struct DrainGuard {
    shared: Arc<Shared>,
    generation: u64,
    armed: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut bucket = self.shared.lock();
        if bucket.generation == self.generation {
            bucket.draining = false;
            debug!(
                waiting = bucket.waiters.len(),
                "Drain task dropped with callers queued"
            );
        }
    }
}

/// Per-provider token-bucket rate limiter.
///
/// Cloning is cheap and every clone gates the same bucket.
///
/// # Example
///
/// ```no_run
/// use bulwark_rate_limit::RateLimiter;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // 60 requests per minute, bursting up to 60
/// let limiter = RateLimiter::new(60, Duration::from_secs(60))?;
///
/// limiter.acquire().await?;
/// // ... call the provider ...
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiter {
    shared: Arc<Shared>,
}

impl RateLimiter {
    /// Create a limiter admitting `capacity` requests per `window`.
    ///
    /// The bucket starts full.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `capacity` is zero or `window` is zero.
    #[track_caller]
    pub fn new(capacity: u32, window: Duration) -> Result<Self, RateLimitError> {
        if capacity == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidConfig(
                "capacity must be greater than zero".to_string(),
            )));
        }
        if window.is_zero() {
            return Err(RateLimitError::new(RateLimitErrorKind::InvalidConfig(
                "window must be greater than zero".to_string(),
            )));
        }

        let per_second = f64::from(capacity) / window.as_secs_f64();
        debug!(capacity, ?window, per_second, "Creating rate limiter");

        Ok(Self {
            shared: Arc::new(Shared {
                capacity,
                window,
                per_second,
                bucket: Mutex::new(Bucket {
                    tokens: f64::from(capacity),
                    last_refill: Instant::now(),
                    waiters: VecDeque::new(),
                    draining: false,
                    generation: 0,
                }),
            }),
        })
    }

    /// Create a limiter from a requests-per-minute figure.
    #[track_caller]
    pub fn per_minute(requests_per_minute: u32) -> Result<Self, RateLimitError> {
        Self::new(requests_per_minute, Duration::from_secs(60))
    }

    /// Maximum tokens the bucket holds.
    pub fn capacity(&self) -> u32 {
        self.shared.capacity
    }

    /// Time over which a full bucket's worth of tokens accrues.
    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// Wait for a token, then consume it.
    ///
    /// Callers are admitted in the order they called `acquire`. Dropping the
    /// returned future while queued gives up the place in line without
    /// consuming a token.
    ///
    /// # Errors
    ///
    /// Returns `Reset` if [`reset`](Self::reset) is called while this caller
    /// is queued.
    pub async fn acquire(&self) -> Result<(), RateLimitError> {
        let receiver = {
            let mut bucket = self.shared.lock();
            bucket.refill(
                Instant::now(),
                f64::from(self.shared.capacity),
                self.shared.per_second,
            );

            if bucket.live_waiters() == 0 && bucket.has_token() {
                bucket.take_token();
                trace!(tokens = bucket.tokens, "Admitted immediately");
                return Ok(());
            }

            let (sender, receiver) = oneshot::channel();
            bucket.waiters.push_back(sender);
            debug!(waiting = bucket.waiters.len(), "Queued for admission");

            if !bucket.draining {
                bucket.draining = true;
                let delay = self.shared.wait_for_next_token(bucket.tokens);
                tokio::spawn(drain(
                    Arc::clone(&self.shared),
                    bucket.generation,
                    delay,
                ));
            }
            receiver
        };

        let mut ticket = Ticket {
            receiver,
            shared: Arc::clone(&self.shared),
            settled: false,
        };
        let admitted = (&mut ticket.receiver).await;
        ticket.settled = true;
        admitted.map_err(|_| RateLimitError::new(RateLimitErrorKind::Reset))
    }

    /// Consume a token only if one is available right now and nobody is queued.
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.shared.lock();
        bucket.refill(
            Instant::now(),
            f64::from(self.shared.capacity),
            self.shared.per_second,
        );
        if bucket.live_waiters() == 0 && bucket.has_token() {
            bucket.take_token();
            true
        } else {
            false
        }
    }

    /// Current token count, including accrual since the last refill.
    pub fn available_tokens(&self) -> f64 {
        let bucket = self.shared.lock();
        let elapsed = Instant::now().saturating_duration_since(bucket.last_refill);
        (bucket.tokens + elapsed.as_secs_f64() * self.shared.per_second)
            .min(f64::from(self.shared.capacity))
    }

    /// Number of callers currently queued.
    pub fn waiting_count(&self) -> usize {
        self.shared.lock().live_waiters()
    }

    /// Refill to capacity and reject every queued caller with `Reset`.
    #[instrument(skip(self), fields(capacity = self.shared.capacity))]
    pub fn reset(&self) {
        let mut bucket = self.shared.lock();
        let rejected = bucket.live_waiters();
        bucket.tokens = f64::from(self.shared.capacity);
        bucket.last_refill = Instant::now();
        bucket.waiters.clear();
        bucket.draining = false;
        bucket.generation = bucket.generation.wrapping_add(1);
        debug!(rejected, "Rate limiter reset");
    }
}

/// Admit queued callers as tokens accrue, until the queue is empty.
async fn drain(shared: Arc<Shared>, generation: u64, mut delay: Duration) {
    let mut guard = DrainGuard {
        shared,
        generation,
        armed: true,
    };
    loop {
        tokio::time::sleep(delay).await;

        let mut bucket = guard.shared.lock();
        if bucket.generation != generation {
            trace!("Stale drain task exiting after reset");
            guard.armed = false;
            return;
        }
        bucket.refill(
            Instant::now(),
            f64::from(guard.shared.capacity),
            guard.shared.per_second,
        );
        bucket.admit_waiters();

        if bucket.waiters.is_empty() {
            bucket.draining = false;
            guard.armed = false;
            return;
        }
        delay = guard.shared.wait_for_next_token(bucket.tokens);
    }
}
