//! Rate limiting middleware.
//!
//! Sliding-window counting per client identity: the authenticated user id
//! when the proxy supplies one, the client IP otherwise. The window is a
//! queue of request instants pruned on every check, so a client regains
//! capacity continuously instead of at window rollover.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::api::error::ApiError;

/// Header a trusted reverse proxy can set to key limits by user instead of
/// by IP.
const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct RateLimiterConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

/// Rate limiter state tracking request instants per identity.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Exceeded { retry_after: Duration },
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check and record one request for the identity.
    pub fn check(&self, identity: &str) -> RateLimitDecision {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        let bucket = state.entry(identity.to_string()).or_default();

        // Drop instants that have slid out of the window.
        while let Some(&front) = bucket.front() {
            if now.duration_since(front) >= window {
                bucket.pop_front();
            } else {
                break;
            }
        }

        if bucket.len() >= self.config.max_requests as usize {
            let oldest = *bucket.front().expect("non-empty at capacity");
            return RateLimitDecision::Exceeded {
                retry_after: window.saturating_sub(now.duration_since(oldest)),
            };
        }

        bucket.push_back(now);
        RateLimitDecision::Allowed {
            remaining: self.config.max_requests - bucket.len() as u32,
        }
    }

    /// Drop identities with no requests inside the window (call from a
    /// background task).
    pub fn cleanup(&self) {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = self.config.window;

        state.retain(|_, bucket| {
            bucket
                .back()
                .is_some_and(|&last| now.duration_since(last) < window)
        });
    }
}

/// Rate limiting middleware function.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let identity = request
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|user| format!("user:{user}"))
        .unwrap_or_else(|| format!("ip:{}", addr.ip()));

    match limiter.check(&identity) {
        RateLimitDecision::Allowed { .. } => next.run(request).await,
        RateLimitDecision::Exceeded { retry_after } => {
            warn!(
                identity = %identity,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            ApiError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            }
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window: Duration) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_requests,
            window,
        })
    }

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = limiter(10, Duration::from_secs(60));

        for i in 0..10 {
            match limiter.check("ip:127.0.0.1") {
                RateLimitDecision::Allowed { remaining } => {
                    assert_eq!(remaining, 10 - i - 1);
                }
                _ => panic!("request {i} should be allowed"),
            }
        }
        assert!(matches!(
            limiter.check("ip:127.0.0.1"),
            RateLimitDecision::Exceeded { .. }
        ));
    }

    #[test]
    fn identities_are_independent() {
        let limiter = limiter(2, Duration::from_secs(60));
        limiter.check("ip:10.0.0.1");
        limiter.check("ip:10.0.0.1");
        assert!(matches!(
            limiter.check("ip:10.0.0.1"),
            RateLimitDecision::Exceeded { .. }
        ));
        assert!(matches!(
            limiter.check("user:alice"),
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[test]
    fn window_slides_rather_than_resets() {
        let limiter = limiter(2, Duration::from_millis(50));
        limiter.check("k");
        limiter.check("k");
        assert!(matches!(
            limiter.check("k"),
            RateLimitDecision::Exceeded { .. }
        ));

        std::thread::sleep(Duration::from_millis(60));
        assert!(matches!(
            limiter.check("k"),
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[test]
    fn retry_after_is_bounded_by_window() {
        let limiter = limiter(1, Duration::from_secs(60));
        limiter.check("k");
        match limiter.check("k") {
            RateLimitDecision::Exceeded { retry_after } => {
                assert!(retry_after <= Duration::from_secs(60));
            }
            _ => panic!("should be exceeded"),
        }
    }

    #[test]
    fn cleanup_drops_idle_buckets() {
        let limiter = limiter(5, Duration::from_millis(10));
        limiter.check("a");
        limiter.check("b");
        std::thread::sleep(Duration::from_millis(20));
        limiter.cleanup();
        assert!(limiter.state.lock().is_empty());
    }
}
