//! Per-client token buckets guarding the API.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use rocket::{
    http::Status,
    request::{FromRequest, Outcome, Request},
    State,
};

use crate::{config::Config, error::Error};

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }
}

/// A token bucket per client address.
///
/// Buckets refill greedily, i.e. continuously at `refill_tokens` per
/// `refill_period`, up to `capacity`. At most `max_clients` buckets are
/// kept. When a new client arrives and the limit is reached, buckets
/// untouched for `idle` are dropped first, then the least recently used.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    tokens_per_sec: f64,
    idle: Duration,
    buckets: Mutex<LruCache<String, Bucket>>,
}

impl RateLimiter {
    pub fn new(config: &Config) -> Self {
        let max_clients =
            NonZeroUsize::new(config.rate_limit_max_clients()).unwrap_or(NonZeroUsize::MIN);
        let period = config.rate_limit_refill_period().as_secs_f64();
        let tokens_per_sec = if period > 0.0 {
            f64::from(config.rate_limit_refill_tokens()) / period
        } else {
            f64::INFINITY
        };
        Self {
            capacity: f64::from(config.rate_limit_capacity()),
            tokens_per_sec,
            idle: config.rate_limit_idle(),
            buckets: Mutex::new(LruCache::new(max_clients)),
        }
    }

    /// Take one token for `client`, returning false if none are left.
    pub fn try_acquire(&self, client: &str) -> bool {
        self.try_acquire_at(client, Instant::now())
    }

    fn try_acquire_at(&self, client: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        if !buckets.contains(client) && buckets.len() >= buckets.cap().get() {
            let mut pruned = 0;
            while let Some((_, oldest)) = buckets.peek_lru() {
                if now.saturating_duration_since(oldest.last_refill) < self.idle {
                    break;
                }
                buckets.pop_lru();
                pruned += 1;
            }
            if pruned > 0 {
                debug!("Pruned {pruned} idle rate limit buckets");
            }
            // Still full: the least recently used client makes room.
            if buckets.len() >= buckets.cap().get() {
                if let Some((evicted, _)) = buckets.pop_lru() {
                    debug!("Rate limit table full, forgetting {evicted}");
                }
            }
        }

        let capacity = self.capacity;
        let bucket =
            buckets.get_or_insert_mut(client.to_string(), || Bucket::full(capacity, now));
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.tokens_per_sec).min(capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// A request guard that spends one token of the caller's bucket.
///
/// Fails with 429 when the bucket is empty. Passes everything if no
/// [`RateLimiter`] is managed.
#[derive(Debug, Clone, Copy)]
pub struct Throttle;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Throttle {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Outcome::Success(limiter) = req.guard::<&State<RateLimiter>>().await else {
            return Outcome::Success(Throttle);
        };
        let client = req
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        if limiter.try_acquire(&client) {
            Outcome::Success(Throttle)
        } else {
            warn!("Rate limit exceeded for {client}");
            Outcome::Failure((Status::TooManyRequests, Error::RateLimitExceeded))
        }
    }
}
