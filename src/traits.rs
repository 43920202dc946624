//! Seam traits between the scheduling core and its collaborators
//!
//! The map engine, the scheduler tick and the clock are all reached through
//! these traits so the core can be driven headless and under test.

use crate::prelude::{BoxFuture, Duration, Instant};
use crate::runtime::async_utils;
use crate::{
    core::geo::ScreenRect,
    spatial::feature::{QueryTarget, RenderedFeature},
    Result,
};
use async_trait::async_trait;

/// The map engine's rendered-feature query surface.
///
/// Implementations must be side-effect free and safe to call repeatedly
/// without caller-side rate limiting.
#[async_trait]
pub trait FeatureQuery: Send + Sync {
    /// Return every rendered feature intersecting `rect` (screen pixels).
    async fn query_features_in_screen_rect(
        &self,
        rect: &ScreenRect,
        target: &QueryTarget,
    ) -> Result<Vec<RenderedFeature>>;
}

/// Suspension point the loader awaits between batches.
pub trait TickScheduler: Send + Sync {
    /// Resolve after giving other pending work one chance to run.
    fn tick(&self) -> BoxFuture<'static, ()>;
}

/// Yields exactly one scheduler tick.
#[derive(Debug, Default, Clone, Copy)]
pub struct YieldTicker;

impl TickScheduler for YieldTicker {
    fn tick(&self) -> BoxFuture<'static, ()> {
        Box::pin(async_utils::yield_now())
    }
}

/// Waits a fixed delay per tick, for hosts that want batches spread out
/// over wall-clock time rather than back to back.
#[derive(Debug, Clone, Copy)]
pub struct DelayTicker(pub Duration);

impl TickScheduler for DelayTicker {
    fn tick(&self) -> BoxFuture<'static, ()> {
        Box::pin(async_utils::async_delay(self.0))
    }
}

/// Monotonic time source used by the camera throttler.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Clock backed by the runtime timer, so paused runtime time is respected.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuntimeClock;

impl Clock for RuntimeClock {
    fn now(&self) -> Instant {
        #[cfg(feature = "tokio-runtime")]
        {
            tokio::time::Instant::now().into_std()
        }

        #[cfg(not(feature = "tokio-runtime"))]
        {
            Instant::now()
        }
    }
}
