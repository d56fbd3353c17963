use actix_web::HttpRequest;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Number of tracked keys above which a check also sweeps expired windows
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub success: bool,
    pub remaining: u32,
    pub reset_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_time: DateTime<Utc>,
}

/// Fixed-window request counter kept in process memory.
///
/// Not shared between instances and lost on restart; a deployment with more
/// than one process needs an external counter with the same contract.
pub struct FixedWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }

    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if entries.len() > SWEEP_THRESHOLD {
            entries.retain(|_, w| w.reset_time > now);
        }

        let window = entries
            .entry(key.to_string())
            .and_modify(|w| {
                if now >= w.reset_time {
                    *w = Window {
                        count: 0,
                        reset_time: now + self.window,
                    };
                }
            })
            .or_insert(Window {
                count: 0,
                reset_time: now + self.window,
            });

        if window.count >= self.max_requests {
            return RateLimitDecision {
                success: false,
                remaining: 0,
                reset_time: window.reset_time,
            };
        }

        window.count += 1;

        RateLimitDecision {
            success: true,
            remaining: self.max_requests - window.count,
            reset_time: window.reset_time,
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Client identity for rate limiting: first forwarded address, then the real-ip
/// header, else "unknown"
pub fn client_key(req: &HttpRequest) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header("x-real-ip").map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_eleventh_request_in_window_is_rejected() {
        let limiter = FixedWindowRateLimiter::new(10, Duration::hours(24));
        let now = start();

        for i in 0..10 {
            let decision = limiter.check_at("203.0.113.7", now + Duration::minutes(i));
            assert!(decision.success, "request {} should pass", i + 1);
            assert_eq!(decision.remaining, 9 - i as u32);
        }

        let eleventh = limiter.check_at("203.0.113.7", now + Duration::hours(23));
        assert!(!eleventh.success);
        assert_eq!(eleventh.remaining, 0);
        assert_eq!(eleventh.reset_time, now + Duration::hours(24));
    }

    #[test]
    fn test_window_expiry_resets_counter() {
        let limiter = FixedWindowRateLimiter::new(10, Duration::hours(24));
        let now = start();

        for _ in 0..11 {
            limiter.check_at("203.0.113.7", now);
        }

        let later = now + Duration::hours(24);
        let decision = limiter.check_at("203.0.113.7", later);
        assert!(decision.success);
        assert_eq!(decision.remaining, 9);
        assert_eq!(decision.reset_time, later + Duration::hours(24));
    }

    #[test]
    fn test_keys_are_counted_separately() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::hours(1));
        let now = start();

        assert!(limiter.check_at("a", now).success);
        assert!(!limiter.check_at("a", now).success);
        assert!(limiter.check_at("b", now).success);
    }

    #[test]
    fn test_expired_entries_are_swept() {
        let limiter = FixedWindowRateLimiter::new(5, Duration::minutes(1));
        let now = start();

        for i in 0..=SWEEP_THRESHOLD {
            limiter.check_at(&format!("10.0.0.{}", i), now);
        }
        assert_eq!(limiter.tracked_keys(), SWEEP_THRESHOLD + 1);

        limiter.check_at("fresh", now + Duration::minutes(2));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "198.51.100.4, 10.0.0.1"))
            .insert_header(("x-real-ip", "10.0.0.9"))
            .to_http_request();
        assert_eq!(client_key(&req), "198.51.100.4");
    }

    #[test]
    fn test_client_key_falls_back() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "10.0.0.9"))
            .to_http_request();
        assert_eq!(client_key(&req), "10.0.0.9");

        let req = TestRequest::default().to_http_request();
        assert_eq!(client_key(&req), "unknown");
    }
}
