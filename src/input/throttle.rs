//! Camera update throttling
//!
//! [`ThrottleGate`] is the timing state machine: leading-edge emission once
//! the interval has passed, otherwise a single trailing emission that picks up
//! whatever event is pending when it fires. [`CameraThrottler`] drives the gate
//! from engine notifications and owns the trailing timer.

use super::events::{CameraEvent, CameraEventKind, EngineCameraPayload};
use crate::core::{camera::CameraState, config::CameraThrottleConfig};
use crate::prelude::{Arc, Duration, Instant, Mutex};
use crate::runtime::{self, async_utils, AsyncHandle, AsyncSpawner};
use crate::traits::{Clock, RuntimeClock};
use crate::{ChartError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// What the gate wants done with an incoming event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Emit this state now and cancel any scheduled trailing emission
    Emit(CameraState),
    /// Schedule a trailing emission after `delay`, identified by `token`
    Schedule { delay: Duration, token: u64 },
    /// A trailing emission is already scheduled and will pick this event up
    Coalesced,
}

#[derive(Debug, Clone)]
pub struct ThrottleGate {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<CameraState>,
    trailing: Option<u64>,
    next_token: u64,
}

impl ThrottleGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
            trailing: None,
            next_token: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record `state` as pending and decide how to handle it.
    pub fn offer(&mut self, now: Instant, state: CameraState) -> GateDecision {
        self.pending = Some(state);

        let elapsed = self.last_emit.map(|at| now.saturating_duration_since(at));
        match elapsed {
            Some(elapsed) if elapsed < self.interval => {
                if self.trailing.is_some() {
                    GateDecision::Coalesced
                } else {
                    self.next_token += 1;
                    self.trailing = Some(self.next_token);
                    GateDecision::Schedule {
                        delay: self.interval - elapsed,
                        token: self.next_token,
                    }
                }
            }
            _ => {
                self.trailing = None;
                self.pending = None;
                self.last_emit = Some(now);
                GateDecision::Emit(state)
            }
        }
    }

    /// The trailing timer identified by `token` fired.
    ///
    /// Returns the pending state to emit, or `None` if the timer was
    /// superseded or nothing is pending.
    pub fn fire_trailing(&mut self, token: u64, now: Instant) -> Option<CameraState> {
        if self.trailing != Some(token) {
            return None;
        }
        self.trailing = None;
        let state = self.pending.take()?;
        self.last_emit = Some(now);
        Some(state)
    }

    /// Emit `state` immediately, discarding anything pending.
    pub fn pass_through(&mut self, now: Instant, state: CameraState) -> CameraState {
        self.pending = None;
        self.trailing = None;
        self.last_emit = Some(now);
        state
    }

    /// Forget a scheduled trailing emission but keep the pending state, so
    /// the next event can schedule again.
    pub fn cancel_trailing(&mut self) {
        self.trailing = None;
    }

    pub fn trailing_token(&self) -> Option<u64> {
        self.trailing
    }

    pub fn pending(&self) -> Option<&CameraState> {
        self.pending.as_ref()
    }

    pub fn reset(&mut self) {
        self.last_emit = None;
        self.pending = None;
        self.trailing = None;
    }
}

struct ThrottleShared {
    gate: ThrottleGate,
    trailing: Option<Box<dyn AsyncHandle>>,
    current: Option<CameraState>,
    emitted: u64,
    torn_down: bool,
}

impl ThrottleShared {
    fn publish(&mut self, tx: &Sender<CameraState>, state: CameraState) {
        self.current = Some(state);
        self.emitted += 1;
        let _ = tx.send(state);
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.trailing.take() {
            handle.cancel();
        }
    }
}

/// Republishes engine camera notifications at a bounded rate.
///
/// "Changing" events are throttled to one per interval with a trailing
/// emission so the end of a gesture is never lost; "idle" events are
/// published immediately. Teardown (or drop) cancels any trailing timer.
pub struct CameraThrottler {
    config: CameraThrottleConfig,
    shared: Arc<Mutex<ThrottleShared>>,
    spawner: Arc<dyn AsyncSpawner>,
    clock: Arc<dyn Clock>,
    update_tx: Sender<CameraState>,
    update_rx: Receiver<CameraState>,
}

impl CameraThrottler {
    pub fn new(config: CameraThrottleConfig) -> Self {
        Self::with_scheduling(config, runtime::runtime(), Arc::new(RuntimeClock))
    }

    pub fn with_scheduling(
        config: CameraThrottleConfig,
        spawner: Arc<dyn AsyncSpawner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (update_tx, update_rx) = unbounded();
        let shared = ThrottleShared {
            gate: ThrottleGate::new(config.interval()),
            trailing: None,
            current: None,
            emitted: 0,
            torn_down: false,
        };
        Self {
            config,
            shared: Arc::new(Mutex::new(shared)),
            spawner,
            clock,
            update_tx,
            update_rx,
        }
    }

    pub fn config(&self) -> &CameraThrottleConfig {
        &self.config
    }

    /// Route an engine notification to the matching channel
    pub fn handle_event(&self, event: &CameraEvent) -> Result<()> {
        match event.kind {
            CameraEventKind::Idle => self.on_camera_idle(&event.payload),
            CameraEventKind::Changing => self.on_camera_changing(&event.payload),
        }
    }

    /// High-frequency channel: throttled with a trailing emission.
    pub fn on_camera_changing(&self, payload: &EngineCameraPayload) -> Result<()> {
        let state = self.normalize(payload)?;
        let mut shared = self.lock()?;
        if shared.torn_down {
            return Ok(());
        }

        match shared.gate.offer(self.clock.now(), state) {
            GateDecision::Emit(state) => {
                shared.cancel_timer();
                shared.publish(&self.update_tx, state);
            }
            GateDecision::Schedule { delay, token } => {
                log::trace!("scheduling trailing camera update in {:?}", delay);
                let future = trailing_emit(
                    self.shared.clone(),
                    self.clock.clone(),
                    self.update_tx.clone(),
                    delay,
                    token,
                );
                match self.spawner.spawn_boxed(Box::pin(future)) {
                    Ok(handle) => shared.trailing = Some(handle),
                    Err(e) => {
                        shared.gate.cancel_trailing();
                        log::warn!("failed to schedule trailing camera update: {}", e);
                        return Err(e);
                    }
                }
            }
            GateDecision::Coalesced => {}
        }
        Ok(())
    }

    /// Low-frequency channel: published as-is, superseding anything pending.
    pub fn on_camera_idle(&self, payload: &EngineCameraPayload) -> Result<()> {
        let state = self.normalize(payload)?;
        let mut shared = self.lock()?;
        if shared.torn_down {
            return Ok(());
        }
        shared.cancel_timer();
        let state = shared.gate.pass_through(self.clock.now(), state);
        shared.publish(&self.update_tx, state);
        Ok(())
    }

    /// Stop publishing and cancel any trailing timer. Final.
    pub fn teardown(&self) {
        if let Ok(mut shared) = self.shared.lock() {
            if shared.torn_down {
                return;
            }
            shared.torn_down = true;
            shared.cancel_timer();
            shared.gate.reset();
            log::debug!("camera throttler torn down after {} updates", shared.emitted);
        }
    }

    /// Last emitted camera state
    pub fn current(&self) -> Option<CameraState> {
        self.shared.lock().ok().and_then(|shared| shared.current)
    }

    /// Number of states emitted so far
    pub fn emitted_count(&self) -> u64 {
        self.shared.lock().map(|shared| shared.emitted).unwrap_or(0)
    }

    pub fn has_trailing_scheduled(&self) -> bool {
        self.shared
            .lock()
            .map(|shared| shared.gate.trailing_token().is_some())
            .unwrap_or(false)
    }

    /// Receiver for emitted states. All receivers share one queue.
    pub fn subscribe(&self) -> Receiver<CameraState> {
        self.update_rx.clone()
    }

    /// Drain emitted states (non-blocking)
    pub fn try_recv_updates(&self) -> Vec<CameraState> {
        self.update_rx.try_iter().collect()
    }

    fn normalize(&self, payload: &EngineCameraPayload) -> Result<CameraState> {
        payload.normalize(&self.config).map_err(|e| {
            log::warn!("dropping camera event: {}", e);
            e
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ThrottleShared>> {
        self.shared
            .lock()
            .map_err(|_| ChartError::Scheduling("camera throttler state poisoned".to_string()))
    }
}

impl Drop for CameraThrottler {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn trailing_emit(
    shared: Arc<Mutex<ThrottleShared>>,
    clock: Arc<dyn Clock>,
    update_tx: Sender<CameraState>,
    delay: Duration,
    token: u64,
) {
    async_utils::async_delay(delay).await;

    let Ok(mut shared) = shared.lock() else {
        return;
    };
    if shared.torn_down || shared.gate.trailing_token() != Some(token) {
        return;
    }
    // Our own handle; the task is finishing anyway
    shared.trailing = None;
    if let Some(state) = shared.gate.fire_trailing(token, clock.now()) {
        shared.publish(&update_tx, state);
    }
}
