//! Per-client-address rate limiting on a keyed `governor` limiter.
//!
//! The key table is capped: once it holds `max_clients` entries, idle keys
//! are pruned with `retain_recent` (at most once per prune interval) and,
//! while it is still full, every request is charged to one overflow key.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{clock::Clock, DefaultKeyedRateLimiter, Quota};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::state::AppState;

const MAX_TRACKED_CLIENTS: usize = 10_000;
const MAX_PRUNE_INTERVAL: Duration = Duration::from_secs(1);
const UNKNOWN_CLIENT: &str = "unknown";
const OVERFLOW_CLIENT: &str = "overflow";

pub struct RateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    max_clients: usize,
    prune_interval: Duration,
    last_prune: Mutex<Instant>,
}

impl RateLimiter {
    /// Bursts of `requests`, replenished evenly over `window`.
    pub fn new(requests: u32, window: Duration) -> Self {
        Self::with_max_clients(requests, window, MAX_TRACKED_CLIENTS)
    }

    pub fn with_max_clients(requests: u32, window: Duration, max_clients: usize) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);
        Self {
            limiter: governor::RateLimiter::keyed(quota),
            max_clients: max_clients.max(1),
            prune_interval: window.min(MAX_PRUNE_INTERVAL),
            last_prune: Mutex::new(Instant::now()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.requests, config.window)
    }

    /// Admits one request for `key`, or returns how long until the next one
    /// would be admitted.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        let key = if self.limiter.len() < self.max_clients || self.prune() {
            key.to_string()
        } else {
            OVERFLOW_CLIENT.to_string()
        };
        self.limiter
            .check_key(&key)
            .map_err(|not_until| not_until.wait_time_from(self.limiter.clock().now()))
    }

    /// Drops keys whose state has fully replenished. Returns whether the
    /// table has room afterwards.
    fn prune(&self) -> bool {
        {
            let mut last = self.last_prune.lock().unwrap_or_else(PoisonError::into_inner);
            if last.elapsed() < self.prune_interval {
                return false;
            }
            *last = Instant::now();
        }
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let after = self.limiter.len();
        tracing::debug!(pruned = before.saturating_sub(after), "pruned idle rate limit keys");
        after < self.max_clients
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

/// Source address of the request. With `trust_proxy` the first
/// `X-Forwarded-For` hop wins, then `X-Real-IP`; otherwise only the socket
/// peer counts.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let forwarded = trust_proxy
        .then(|| header("x-forwarded-for").or_else(|| header("x-real-ip")))
        .flatten();

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub fn request_client_ip(request: &Request, trust_proxy: bool) -> String {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_ip(request.headers(), peer, trust_proxy)
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let key = request_client_ip(&request, state.config.trust_proxy_headers);
    match state.rate_limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            let seconds = retry_after.as_secs().max(1);
            tracing::warn!(client = %key, retry_after = seconds, "Rate limit exceeded");
            let mut response =
                AppError::TooManyRequests("Too many requests. Please try again later.".into())
                    .into_response();
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert("retry-after", value);
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn burst_is_admitted_then_rejected_with_a_wait() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").is_ok());
        }
        let retry = limiter.check("10.0.0.1").unwrap_err();
        assert!(retry > Duration::from_secs(18) && retry <= Duration::from_secs(20));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_err());
        assert!(limiter.check("b").is_ok());
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn capacity_replenishes_after_the_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(100));
        assert!(limiter.check("c").is_ok());
        assert!(limiter.check("c").is_ok());
        assert!(limiter.check("c").is_err());
        std::thread::sleep(Duration::from_millis(150));
        assert!(limiter.check("c").is_ok());
    }

    #[test]
    fn zero_config_values_are_clamped() {
        let limiter = RateLimiter::new(0, Duration::ZERO);
        assert!(limiter.check("z").is_ok());
        assert!(limiter.check("z").is_err());
    }

    #[test]
    fn key_table_never_grows_past_the_cap() {
        let limiter = RateLimiter::new(100, Duration::from_secs(60));
        let started = Instant::now();
        for i in 0..(2 * MAX_TRACKED_CLIENTS) {
            let _ = limiter.check(&format!("10.{}.{}.{}", i >> 16, (i >> 8) & 0xff, i & 0xff));
        }
        assert!(limiter.tracked_clients() <= MAX_TRACKED_CLIENTS + 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn clients_past_the_cap_share_one_budget() {
        let limiter = RateLimiter::with_max_clients(2, Duration::from_secs(60), 4);
        for key in ["a", "b", "c", "d"] {
            assert!(limiter.check(key).is_ok());
        }
        assert!(limiter.check("e").is_ok());
        assert!(limiter.check("f").is_ok());
        assert!(limiter.check("g").is_err());
        assert_eq!(limiter.tracked_clients(), 5);
    }

    #[test]
    fn idle_keys_are_pruned_to_make_room() {
        let limiter = RateLimiter::with_max_clients(1, Duration::from_millis(50), 8);
        for i in 0..8 {
            assert!(limiter.check(&format!("old-{i}")).is_ok());
        }
        std::thread::sleep(Duration::from_millis(120));
        assert!(limiter.check("fresh").is_ok());
        assert!(limiter.check("fresh").is_err());
        assert!(limiter.tracked_clients() < 8);
    }

    #[test]
    fn concurrent_first_requests_share_one_budget() {
        let limiter = Arc::new(RateLimiter::new(50, Duration::from_secs(3600)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..10)
                        .filter(|_| limiter.check("shared").is_ok())
                        .count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn proxy_headers_count_only_when_trusted() {
        let peer: SocketAddr = "192.168.1.9:5000".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(peer), true), "192.168.1.9");
        assert_eq!(client_ip(&headers, None, true), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.5"));
        assert_eq!(client_ip(&headers, Some(peer), true), "203.0.113.5");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(peer), true), "198.51.100.7");
        assert_eq!(client_ip(&headers, Some(peer), false), "192.168.1.9");
        assert_eq!(client_ip(&headers, None, false), "unknown");
    }
}
