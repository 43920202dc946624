//! Progressive chart-pack loader
//!
//! Admits a large chart inventory into the [`RenderSet`] tier by tier, in
//! fixed-size batches, yielding to the scheduler between batches so the host
//! stays responsive. Each batch publishes a full snapshot of the render set.

use super::{
    pack::ChartPackRef, phase::LoadingPhase, render_set::RenderSet,
    visibility::{is_visible_at_zoom, query_scope},
};
use crate::core::config::{LoaderConfig, SourceMode};
use crate::prelude::{Arc, Duration, HashSet, Mutex};
use crate::runtime::{self, AsyncHandle, AsyncSpawner};
use crate::traits::{DelayTicker, TickScheduler, YieldTicker};
use crate::{ChartError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress indicator published with every render-set update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadProgress {
    pub current: usize,
    pub total: usize,
    pub phase_label: String,
}

/// Replace-in-full snapshot published after each batch and phase change
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderUpdate {
    pub session: u64,
    pub phase: LoadingPhase,
    /// Index of the tier that produced this update, `None` for resets
    pub tier: Option<usize>,
    pub progress: LoadProgress,
    pub render_set: Vec<String>,
}

/// One tier of a load plan, already filtered and capped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannedTier {
    pub label: String,
    pub batch_size: usize,
    pub ids: Vec<String>,
}

/// Ordered tiers the loader will admit, highest priority first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadPlan {
    pub tiers: Vec<PlannedTier>,
}

impl LoadPlan {
    /// Partitions the inventory into the configured tiers.
    ///
    /// Duplicate ids keep their first occurrence. Inventory order is kept
    /// within each tier. Packs beyond a tier's cap are left out.
    pub fn build(inventory: &[ChartPackRef], config: &LoaderConfig) -> Self {
        let specs = [&config.primary, &config.detail];
        let mut tiers: Vec<PlannedTier> = specs
            .iter()
            .map(|spec| PlannedTier {
                label: spec.label.clone(),
                batch_size: spec.batch_size.max(1),
                ids: Vec::new(),
            })
            .collect();

        let mut seen: HashSet<&str> = HashSet::default();
        let mut filtered = 0usize;
        let mut capped = 0usize;
        let mut unplaced = 0usize;

        for pack in inventory {
            if !seen.insert(pack.id.as_str()) {
                continue;
            }
            if let Some(zoom) = config.zoom_filter {
                if !is_visible_at_zoom(&pack.id, zoom) {
                    filtered += 1;
                    continue;
                }
            }
            let band = pack.scale_band();
            let Some(index) = specs.iter().position(|spec| spec.admits(band)) else {
                unplaced += 1;
                continue;
            };
            if tiers[index].ids.len() >= specs[index].max_packs {
                capped += 1;
                continue;
            }
            tiers[index].ids.push(pack.id.clone());
        }

        if filtered + capped + unplaced > 0 {
            log::debug!(
                "load plan left out {} packs ({} below zoom filter, {} over tier caps, {} without a tier)",
                filtered + capped + unplaced,
                filtered,
                capped,
                unplaced
            );
        }

        Self { tiers }
    }

    /// Number of packs the plan admits
    pub fn total(&self) -> usize {
        self.tiers.iter().map(|t| t.ids.len()).sum()
    }

    pub fn batch_count(&self) -> usize {
        self.tiers
            .iter()
            .map(|t| t.ids.len().div_ceil(t.batch_size))
            .sum()
    }
}

#[derive(Debug, Default)]
struct LoaderShared {
    /// Bumped on teardown; a running session stops publishing once it changes
    session: u64,
    render_set: RenderSet,
    phase: LoadingPhase,
    progress: LoadProgress,
}

impl LoaderShared {
    fn snapshot(&self, tier: Option<usize>) -> LoaderUpdate {
        LoaderUpdate {
            session: self.session,
            phase: self.phase,
            tier,
            progress: self.progress.clone(),
            render_set: self.render_set.to_vec(),
        }
    }
}

/// Drives progressive admission of chart packs into the render set.
///
/// At most one loading run is in flight; further triggers while it runs are
/// ignored. Dropping the loader cancels the run.
pub struct ChartLoader {
    config: LoaderConfig,
    shared: Arc<Mutex<LoaderShared>>,
    in_flight: Arc<AtomicBool>,
    spawner: Arc<dyn AsyncSpawner>,
    ticker: Arc<dyn TickScheduler>,
    handle: Option<Box<dyn AsyncHandle>>,
    update_tx: Sender<LoaderUpdate>,
    update_rx: Receiver<LoaderUpdate>,
}

impl ChartLoader {
    /// Create a loader that schedules onto the global runtime
    pub fn new(config: LoaderConfig) -> Self {
        let ticker: Arc<dyn TickScheduler> = if config.tick_delay_ms == 0 {
            Arc::new(YieldTicker)
        } else {
            Arc::new(DelayTicker(Duration::from_millis(config.tick_delay_ms)))
        };
        Self::with_scheduling(config, runtime::runtime(), ticker)
    }

    /// Create a loader with an explicit spawner and inter-batch tick
    pub fn with_scheduling(
        config: LoaderConfig,
        spawner: Arc<dyn AsyncSpawner>,
        ticker: Arc<dyn TickScheduler>,
    ) -> Self {
        let (update_tx, update_rx) = unbounded();
        Self {
            config,
            shared: Arc::new(Mutex::new(LoaderShared::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
            spawner,
            ticker,
            handle: None,
            update_tx,
            update_rx,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Begin loading `inventory`.
    ///
    /// Returns `Ok(false)` without scheduling anything when a run is already
    /// in flight or this session has already completed. A scheduling failure
    /// leaves the session in its current phase.
    pub fn start(&mut self, inventory: &[ChartPackRef]) -> Result<bool> {
        if self.config.source_mode == SourceMode::Composited {
            return Ok(self.complete_composited());
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("chart loading already in flight; ignoring trigger");
            return Ok(false);
        }

        let session = match self.shared.lock() {
            Ok(state) if state.phase.is_complete() => {
                self.in_flight.store(false, Ordering::SeqCst);
                log::debug!("chart loading already complete for session {}", state.session);
                return Ok(false);
            }
            Ok(state) => state.session,
            Err(_) => {
                self.in_flight.store(false, Ordering::SeqCst);
                return Err(ChartError::Scheduling("loader state poisoned".to_string()));
            }
        };

        let plan = LoadPlan::build(inventory, &self.config);
        log::info!(
            "loading {} of {} chart packs in {} batches",
            plan.total(),
            inventory.len(),
            plan.batch_count()
        );

        let future = run_session(
            self.shared.clone(),
            self.in_flight.clone(),
            self.ticker.clone(),
            self.update_tx.clone(),
            plan,
            session,
        );

        match self.spawner.spawn_boxed(Box::pin(future)) {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(true)
            }
            Err(e) => {
                self.in_flight.store(false, Ordering::SeqCst);
                log::warn!("failed to schedule chart loading: {}", e);
                Err(e)
            }
        }
    }

    /// Cancel the running session, if any. Whatever was already admitted stays.
    pub fn teardown(&mut self) {
        if let Ok(mut state) = self.shared.lock() {
            state.session += 1;
        }
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                log::debug!("cancelling in-flight chart loading");
            }
            handle.cancel();
        }
        self.in_flight.store(false, Ordering::SeqCst);
    }

    /// Discard the render set and load `inventory` from scratch.
    pub fn reload(&mut self, inventory: &[ChartPackRef]) -> Result<bool> {
        self.teardown();
        if let Ok(mut state) = self.shared.lock() {
            state.render_set.clear();
            state.phase = LoadingPhase::Initial;
            state.progress = LoadProgress::default();
            let _ = self.update_tx.send(state.snapshot(None));
        }
        self.start(inventory)
    }

    /// Whether a loading run is currently in flight
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> LoadingPhase {
        self.shared
            .lock()
            .map(|state| state.phase)
            .unwrap_or_default()
    }

    pub fn progress(&self) -> LoadProgress {
        self.shared
            .lock()
            .map(|state| state.progress.clone())
            .unwrap_or_default()
    }

    /// Current render set in admission order
    pub fn render_set(&self) -> Vec<String> {
        self.shared
            .lock()
            .map(|state| state.render_set.to_vec())
            .unwrap_or_default()
    }

    /// Admitted packs visible at `zoom`, for scoping feature queries
    pub fn query_scope(&self, zoom: f64) -> Vec<String> {
        self.shared
            .lock()
            .map(|state| query_scope(&state.render_set, zoom))
            .unwrap_or_default()
    }

    /// Receiver for published updates. All receivers share one queue.
    pub fn subscribe(&self) -> Receiver<LoaderUpdate> {
        self.update_rx.clone()
    }

    /// Drain published updates (non-blocking)
    pub fn try_recv_updates(&self) -> Vec<LoaderUpdate> {
        self.update_rx.try_iter().collect()
    }

    fn complete_composited(&mut self) -> bool {
        let Ok(mut state) = self.shared.lock() else {
            return false;
        };
        if !state.phase.advance_to(LoadingPhase::Complete) {
            return false;
        }
        state.progress = LoadProgress {
            current: 0,
            total: 0,
            phase_label: "Composited chart source".to_string(),
        };
        log::info!("composited chart source; skipping per-pack loading");
        let _ = self.update_tx.send(state.snapshot(None));
        true
    }
}

impl Drop for ChartLoader {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn run_session(
    shared: Arc<Mutex<LoaderShared>>,
    in_flight: Arc<AtomicBool>,
    ticker: Arc<dyn TickScheduler>,
    update_tx: Sender<LoaderUpdate>,
    plan: LoadPlan,
    session: u64,
) {
    let total = plan.total();
    let last_tier = plan.tiers.len().saturating_sub(1);

    for (index, tier) in plan.tiers.iter().enumerate() {
        for batch in tier.ids.chunks(tier.batch_size) {
            {
                let Ok(mut state) = shared.lock() else {
                    return;
                };
                if state.session != session {
                    return;
                }
                let added = state.render_set.extend(batch.iter().cloned());
                state.progress = LoadProgress {
                    current: state.render_set.len(),
                    total,
                    phase_label: tier.label.clone(),
                };
                log::debug!(
                    "admitted {} packs ({}/{}) for '{}'",
                    added,
                    state.progress.current,
                    total,
                    tier.label
                );
                let _ = update_tx.send(state.snapshot(Some(index)));
            }
            ticker.tick().await;
        }

        {
            let Ok(mut state) = shared.lock() else {
                return;
            };
            if state.session != session {
                return;
            }
            let next = if index == last_tier {
                LoadingPhase::Complete
            } else {
                LoadingPhase::Tier1
            };
            if state.phase.advance_to(next) {
                log::info!("chart loading reached phase {}", next);
                let _ = update_tx.send(state.snapshot(Some(index)));
            }
        }
    }

    if let Ok(state) = shared.lock() {
        if state.session == session {
            in_flight.store(false, Ordering::SeqCst);
        }
    }
}
