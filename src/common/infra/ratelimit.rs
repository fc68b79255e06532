// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Token-bucket rate limiter keyed by integration id.

use std::time::Instant;

use dashmap::DashMap;

pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
    rate: f64,
    burst: f64,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(rate: u32, burst: u32) -> Self {
        Self {
            buckets: DashMap::new(),
            rate: rate as f64,
            burst: burst as f64,
        }
    }

    /// Take one token for `key`; false means the caller is over limit
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            tokens: self.burst,
            last_refill: now,
        });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_limit() {
        let limiter = RateLimiter::new(10, 5);
        for _ in 0..5 {
            assert!(limiter.check("int1"));
        }
        // bucket exhausted, no time has passed
        assert!(!limiter.check("int1"));
        // other keys are unaffected
        assert!(limiter.check("int2"));
    }

    #[test]
    fn test_refill() {
        let limiter = RateLimiter::new(1000, 5);
        for _ in 0..5 {
            assert!(limiter.check("k"));
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(limiter.check("k"));
    }
}
