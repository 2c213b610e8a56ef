//! Pacing policies for outbound site requests
//!
//! `FixedDelayPacing` sleeps after every request of a task (the classic flat
//! delay). `PerSiteRateLimiter` shares one governor bucket per site across all
//! workers and waits before a request until the site's interval has elapsed.

use async_trait::async_trait;
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::domain::{PacingPolicy, Site};
use crate::infrastructure::config::{PacingConfig, PacingStrategy};

/// Fixed sleep after every adapter invocation, success or failure
#[derive(Debug, Clone)]
pub struct FixedDelayPacing {
    delay: Duration,
}

impl FixedDelayPacing {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PacingPolicy for FixedDelayPacing {
    async fn after_request(&self, site: Site) {
        if self.delay.is_zero() {
            return;
        }
        debug!("⏳ Pausing {:?} after {} request", self.delay, site);
        sleep(self.delay).await;
    }
}

/// Minimum interval between two requests to the same site, across workers
pub struct PerSiteRateLimiter {
    interval: Duration,
    limiter: RateLimiter<Site, DefaultKeyedStateStore<Site>, DefaultClock>,
}

impl PerSiteRateLimiter {
    /// Returns `None` for a zero interval
    pub fn new(interval: Duration) -> Option<Self> {
        let quota = Quota::with_period(interval)?;
        Some(Self {
            interval,
            limiter: RateLimiter::keyed(quota),
        })
    }
}

#[async_trait]
impl PacingPolicy for PerSiteRateLimiter {
    async fn before_request(&self, site: Site) {
        debug!("⚖️ Waiting for {} slot (interval {:?})", site, self.interval);
        self.limiter.until_key_ready(&site).await;
    }
}

/// Build the policy selected in configuration
pub fn build_pacing(config: &PacingConfig) -> Arc<dyn PacingPolicy> {
    let delay = Duration::from_millis(config.delay_ms);
    match config.strategy {
        PacingStrategy::PerSite => {
            if let Some(limiter) = PerSiteRateLimiter::new(delay) {
                info!("Pacing: at most one request per {:?} to each site", delay);
                return Arc::new(limiter);
            }
            info!("Pacing: per-site interval is zero, requests are not paced");
            Arc::new(FixedDelayPacing::new(Duration::ZERO))
        }
        PacingStrategy::Fixed => {
            info!("Pacing: fixed {:?} pause after every request", delay);
            Arc::new(FixedDelayPacing::new(delay))
        }
    }
}
