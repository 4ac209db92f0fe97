use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Token bucket shared by every handler that calls the generation service.
#[derive(Clone)]
pub struct RateLimiter {
    rps: u32,
    bucket: Arc<Mutex<Bucket>>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last: Instant,
}

impl RateLimiter {
    /// `RATE_LIMIT_RPS` unset, unparsable or zero disables limiting.
    pub fn from_env() -> Option<Self> {
        std::env::var("RATE_LIMIT_RPS")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .and_then(Self::new)
    }

    pub fn new(rps: u32) -> Option<Self> {
        if rps == 0 {
            return None;
        }
        Some(Self {
            rps,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: rps as f64,
                last: Instant::now(),
            })),
        })
    }

    pub fn rps(&self) -> u32 {
        self.rps
    }

    /// Take one token, or report how long until one is available.
    pub async fn acquire(&self) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last);
        bucket.last = now;

        let capacity = self.rps as f64;
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * capacity).min(capacity);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return Ok(());
        }

        Err(Duration::from_secs_f64((1.0 - bucket.tokens) / capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_disables_limiter() {
        assert!(RateLimiter::new(0).is_none());
        assert_eq!(RateLimiter::new(3).map(|l| l.rps()), Some(3));
    }

    #[tokio::test]
    async fn bucket_empties_then_reports_wait() {
        let limiter = RateLimiter::new(2).unwrap();
        assert!(limiter.acquire().await.is_ok());
        assert!(limiter.acquire().await.is_ok());

        let wait = limiter.acquire().await.unwrap_err();
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn bucket_refills_over_time() {
        let limiter = RateLimiter::new(1).unwrap();
        assert!(limiter.acquire().await.is_ok());
        assert!(limiter.acquire().await.is_err());
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(limiter.acquire().await.is_ok());
    }
}
