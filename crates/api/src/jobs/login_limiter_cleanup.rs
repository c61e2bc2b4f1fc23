//! Drops idle login throttling buckets.

use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::LoginRateLimiter;

pub struct LoginLimiterCleanupJob {
    limiter: Arc<LoginRateLimiter>,
}

impl LoginLimiterCleanupJob {
    pub fn new(limiter: Arc<LoginRateLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for LoginLimiterCleanupJob {
    fn name(&self) -> &'static str {
        "login_limiter_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> Result<(), String> {
        self.limiter.purge();
        Ok(())
    }
}
