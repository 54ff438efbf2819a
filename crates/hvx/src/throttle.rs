//! 🐢 The self-throttle — a mandatory pause before every upstream request.
//!
//! A fixed jittered delay, not adaptive backoff: the upstream publishes no
//! rate limit, and a steady sub-request-per-second cadence per worker is
//! what keeps it from rejecting bursts. The policy is a trait so tests can
//! swap in zero delay and get on with their day. Patience, as a plugin. 🦆

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::app_config::ThrottleConfig;

/// ⏲️ Rate-limit policy consulted once per request, per worker.
#[async_trait]
pub trait Throttle: Send + Sync + std::fmt::Debug {
    async fn before_request(&self);
}

/// 🎲 Sleeps `base + U(0, jitter)` ahead of each request. Per-worker, not
/// global — effective request rate scales with worker count, so add
/// workers before you start shaving milliseconds off of this.
#[derive(Debug, Clone)]
pub struct JitterThrottle {
    base: Duration,
    jitter: Duration,
}

impl JitterThrottle {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_ms),
            Duration::from_millis(config.jitter_ms),
        )
    }

    fn pick_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jittered = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.base + Duration::from_millis(jittered)
    }
}

#[async_trait]
impl Throttle for JitterThrottle {
    async fn before_request(&self) {
        let delay = self.pick_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// 🏎️ Zero-delay policy for tests. Speed limit? Never heard of her.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThrottle;

#[async_trait]
impl Throttle for NoThrottle {
    async fn before_request(&self) {}
}
