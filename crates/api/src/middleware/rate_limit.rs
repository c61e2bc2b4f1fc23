//! Login throttling keyed by username.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use serde_json::json;
use std::num::NonZeroU32;

/// Per-username login budget. Keys are normalised so `Admin` and ` admin `
/// share one bucket.
pub struct LoginRateLimiter {
    limiter: Option<DefaultKeyedRateLimiter<String>>,
    per_minute: u32,
}

impl LoginRateLimiter {
    /// `0` disables throttling.
    pub fn new(per_minute: u32) -> Self {
        Self {
            limiter: NonZeroU32::new(per_minute)
                .map(|limit| RateLimiter::keyed(Quota::per_minute(limit))),
            per_minute,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Consumes one attempt. `Err` carries the seconds until the next attempt is allowed.
    pub fn check(&self, username: &str) -> Result<(), u64> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        limiter
            .check_key(&username.trim().to_lowercase())
            .map_err(|not_until| {
                not_until
                    .wait_time_from(DefaultClock::default().now())
                    .as_secs()
                    .max(1)
            })
    }

    /// Drops buckets that have fully refilled.
    pub fn purge(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
        }
    }

    pub fn rejection(&self, retry_after: u64) -> Response {
        let body = json!({
            "error": "rate_limited",
            "message": format!("Too many login attempts, limit is {} per minute", self.per_minute),
            "retryAfter": retry_after
        });

        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        response
    }
}

impl std::fmt::Debug for LoginRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRateLimiter")
            .field("per_minute", &self.per_minute)
            .field("tracked_keys", &self.limiter.as_ref().map_or(0, |l| l.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_limiter_always_allows() {
        let limiter = LoginRateLimiter::new(0);
        assert!(!limiter.is_enabled());
        for _ in 0..100 {
            assert!(limiter.check("admin").is_ok());
        }
    }

    #[test]
    fn test_limiter_exhaustion() {
        let limiter = LoginRateLimiter::new(3);
        for _ in 0..3 {
            assert!(limiter.check("recepcion").is_ok());
        }
        let retry_after = limiter.check("recepcion").unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn test_usernames_are_normalised() {
        let limiter = LoginRateLimiter::new(1);
        assert!(limiter.check("Admin").is_ok());
        assert!(limiter.check(" admin ").is_err());
    }

    #[test]
    fn test_buckets_are_independent() {
        let limiter = LoginRateLimiter::new(1);
        assert!(limiter.check("alice").is_ok());
        assert!(limiter.check("bob").is_ok());
        assert!(limiter.check("alice").is_err());
    }

    #[test]
    fn test_rejection_sets_retry_after() {
        let response = LoginRateLimiter::new(5).rejection(12);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "12");
    }
}
