use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

/// Per-IP throttle on review submissions.
pub struct ReviewLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl ReviewLimiter {
    pub fn new(per_min: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_min.max(1)).unwrap());
        Self { limiter: RateLimiter::keyed(quota) }
    }

    /// Whether a submission from this address may proceed right now.
    pub fn allow(&self, ip: &str) -> bool {
        self.limiter.check_key(&ip.to_string()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_per_key() {
        let limiter = ReviewLimiter::new(2);
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
        // Other addresses have their own budget.
        assert!(limiter.allow("10.0.0.2"));
    }
}
