//! Test doubles shared by the integration tests

use chartlet::prelude::*;
use chartlet::runtime::spawners::tokio_impl::TokioSpawner;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Spawns onto the current tokio runtime and counts every scheduling call
#[derive(Default)]
pub struct CountingSpawner {
    spawned: AtomicUsize,
}

impl CountingSpawner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }
}

impl AsyncSpawner for CountingSpawner {
    fn spawn_boxed(
        &self,
        future: Pin<Box<dyn Future<Output = ()> + Send + 'static>>,
    ) -> Result<Box<dyn AsyncHandle>> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        TokioSpawner.spawn_boxed(future)
    }
}

/// Chart packs with the given ids and dummy locators
#[allow(dead_code)]
pub fn packs(ids: &[&str]) -> Vec<ChartPackRef> {
    ids.iter()
        .map(|id| ChartPackRef::new(*id, format!("file:///charts/{}.mbtiles", id)))
        .collect()
}

/// Lets spawned tasks and timers run under paused time
#[allow(dead_code)]
pub async fn settle(steps: usize) {
    for _ in 0..steps {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}
