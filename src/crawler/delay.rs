//! Injectable delays
//!
//! Every wait the harvester performs (politeness pauses, retry backoff,
//! PDF download backoff) goes through a [`Sleeper`], so tests can run
//! the same loops without wall-clock waits.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Something that can pause the current task
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Picks a politeness delay uniformly from `[max / 2, max]`
///
/// Returns zero when `max` is zero.
pub fn politeness_delay(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }

    let max_secs = max.as_secs_f64();
    let secs = rand::thread_rng().gen_range(max_secs / 2.0..=max_secs);
    Duration::from_secs_f64(secs)
}

/// Linear backoff: `base * attempt`
pub fn linear_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}
