//! Rate limiting for model calls.
//!
//! `RateLimitedClient` wraps any `ModelClient`. Up to `max_requests` calls go
//! through at once; after that one slot frees every `period / max_requests`.
//! Calls over the limit fail fast with `TransportError::RateLimited` and never
//! reach the network.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::warn;

use crate::llm_client::{ModelClient, TransportError};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub struct RateLimitedClient {
    inner: Arc<dyn ModelClient>,
    /// `None` when the quota is zero: every call is rejected.
    limiter: Option<DirectLimiter>,
    max_requests: usize,
    period: Duration,
}

impl RateLimitedClient {
    pub fn new(inner: Arc<dyn ModelClient>, max_requests: usize, period: Duration) -> Self {
        Self {
            inner,
            limiter: build_limiter(max_requests, period),
            max_requests,
            period,
        }
    }

    fn try_acquire(&self) -> bool {
        self.limiter
            .as_ref()
            .map_or(false, |limiter| limiter.check().is_ok())
    }
}

fn build_limiter(max_requests: usize, period: Duration) -> Option<DirectLimiter> {
    let burst = NonZeroU32::new(u32::try_from(max_requests).unwrap_or(u32::MAX))?;
    let replenish = (period / burst.get()).max(Duration::from_nanos(1));
    let quota = Quota::with_period(replenish)?.allow_burst(burst);
    Some(RateLimiter::direct(quota))
}

#[async_trait]
impl ModelClient for RateLimitedClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, TransportError> {
        if !self.try_acquire() {
            warn!(
                "Model call rejected: more than {} calls in {}s",
                self.max_requests,
                self.period.as_secs()
            );
            return Err(TransportError::RateLimited {
                limit: self.max_requests,
                period_secs: self.period.as_secs(),
            });
        }
        self.inner.complete(prompt, system).await
    }
}
