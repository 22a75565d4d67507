//! Tick scheduler for time-based workflows.
//!
//! One fixed-interval timer drives every `time_based` workflow; per-workflow
//! cadence is expressed through trigger conditions, not per-workflow timers.
//! Missed ticks are lost (at-most-once, best-effort): if the process is not
//! running when a tick would have fired, that occurrence never happens.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::models::TriggerPayload;
use crate::service::WorkflowEngine;

/// Drives the engine with a synthetic current-time payload on every tick.
pub struct Scheduler {
    engine: Arc<WorkflowEngine>,
    interval: Duration,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl Scheduler {
    pub fn new(engine: Arc<WorkflowEngine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            shutdown: Mutex::new(None),
        }
    }

    /// Start ticking.  Idempotent: calling `start` while running is a no-op,
    /// so a double start never produces competing timers.
    pub fn start(&self) {
        let mut guard = self.shutdown.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            debug!("scheduler already running; start ignored");
            return;
        }

        info!("scheduler starting (interval {:?})", self.interval);
        let engine = Arc::clone(&self.engine);
        let interval = self.interval;
        let (tx, mut rx) = watch::channel(false);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Skipping rather than bursting encodes the at-most-once
            // contract: a delayed tick is dropped, not replayed.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately;
            // consume it so ticks land at t = i, 2i, …
            ticker.tick().await;

            loop {
                // The shutdown signal is only observed here, between ticks,
                // so a dispatch that has already started always finishes
                // and its record reaches the log.
                tokio::select! {
                    _ = ticker.tick() => {
                        let payload = TriggerPayload::time_based(Utc::now());
                        engine.dispatch(&payload).await;
                    }
                    _ = rx.changed() => break,
                }
            }
        });

        *guard = Some(tx);
    }

    /// Cancel future ticks.  Safe to call when already stopped.
    /// An in-flight execution runs to completion; only future ticks are lost.
    pub fn stop(&self) {
        let mut guard = self.shutdown.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = guard.take() {
            info!("scheduler stopping");
            let _ = tx.send(true);
        }
    }

    /// Whether a tick task is currently installed.
    pub fn is_running(&self) -> bool {
        self.shutdown
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
