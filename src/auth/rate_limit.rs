//! Fixed-window rate limiting keyed by client.
//!
//! Each client key gets a counter and the instant its window started. The
//! counter resets once the window elapses, so a burst straddling a window
//! boundary can briefly see up to twice the limit.
//!
//! Buckets live in process memory: with several server instances each one
//! enforces the limit independently.

use crate::types::AppError;
use crate::utils::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Above this many tracked clients, `check` sweeps stale buckets inline,
/// at most once per window.
const LAZY_SWEEP_THRESHOLD: usize = 10_000;

struct Bucket {
    count: u32,
    window_start: Instant,
}

#[derive(Default)]
struct BucketTable {
    buckets: HashMap<String, Bucket>,
    last_sweep: Option<Instant>,
}

impl BucketTable {
    fn sweep(&mut self, now: Instant, window: Duration) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.window_start) < window);
        self.last_sweep = Some(now);
        before - self.buckets.len()
    }

    fn sweep_due(&self, now: Instant, window: Duration) -> bool {
        self.last_sweep
            .is_none_or(|last| now.saturating_duration_since(last) >= window)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Exceeded { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Shared, cloneable limiter handle.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    trust_forwarded_for: bool,
    lazy_sweep_threshold: usize,
    table: Arc<Mutex<BucketTable>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            trust_forwarded_for: false,
            lazy_sweep_threshold: LAZY_SWEEP_THRESHOLD,
            table: Arc::new(Mutex::new(BucketTable::default())),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_lazy_sweep_threshold(mut self, threshold: usize) -> Self {
        self.lazy_sweep_threshold = threshold;
        self
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        let mut limiter = Self::new(config.requests, config.window());
        limiter.trust_forwarded_for = config.trust_forwarded_for;
        limiter
    }

    /// Counts a request from `key`; `false` once the window's quota is spent.
    pub fn allow(&self, key: &str) -> bool {
        self.check(key).is_allowed()
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Increment-and-compare under a single lock so concurrent requests
    /// never lose counts.
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut table = self.table.lock();

        if table.buckets.len() > self.lazy_sweep_threshold && table.sweep_due(now, self.window) {
            let removed = table.sweep(now, self.window);
            debug!(removed, "inline sweep of rate limit buckets");
        }

        let bucket = table.buckets.entry(key.to_string()).or_insert(Bucket {
            count: 0,
            window_start: now,
        });

        if now.saturating_duration_since(bucket.window_start) >= self.window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.max_requests {
            let reset_at = bucket.window_start + self.window;
            return RateLimitDecision::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            };
        }

        bucket.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - bucket.count,
        }
    }

    /// Drops buckets whose window has elapsed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        self.table.lock().sweep(now, self.window)
    }

    pub fn tracked_clients(&self) -> usize {
        self.table.lock().buckets.len()
    }

    /// Runs [`RateLimiter::sweep`] every `interval` until the task is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = limiter.sweep();
                if removed > 0 {
                    debug!(removed, "swept idle rate limit buckets");
                }
            }
        })
    }

    /// Derives the bucket key for a request.
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if self.trust_forwarded_for
            && let Some(forwarded) = headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        {
            return forwarded.to_string();
        }

        peer.map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Rejects the request with 429 once its client has used up the window.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = limiter.client_key(req.headers(), peer);

    match limiter.check(&key) {
        RateLimitDecision::Allowed { .. } => Ok(next.run(req).await),
        RateLimitDecision::Exceeded { retry_after } => {
            warn!(
                client = %key,
                path = %req.uri().path(),
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            })
        }
    }
}
