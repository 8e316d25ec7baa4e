//! Background refresh: periodic APY drift and snapshot broadcast
//!
//! The refresh task never mutates committed ledger amounts; it only
//! drifts the informational APY fields and re-broadcasts a full snapshot.
//! Failures are logged and the next tick retries.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

use crate::engine::LedgerEngine;
use crate::types::LedgerSnapshot;

/// One drift step applied to an APY on each refresh tick.
///
/// Pluggable so tests can pin the drift to a constant or a seeded
/// sequence.
pub trait ApyPerturbation: Send {
    /// Delta in percentage points.
    fn delta(&mut self) -> f64;
}

/// Default drift: uniform in ±0.1 percentage points.
pub struct RandomDrift {
    rng: StdRng,
}

impl RandomDrift {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic drift for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDrift {
    fn default() -> Self {
        Self::new()
    }
}

impl ApyPerturbation for RandomDrift {
    fn delta(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * 0.2
    }
}

/// Handle to the spawned background refresh task.
pub struct RefreshTask {
    handle: JoinHandle<()>,
    snapshots: broadcast::Sender<LedgerSnapshot>,
}

impl RefreshTask {
    /// Spawn the refresh loop on the current tokio runtime.
    pub fn spawn(
        engine: LedgerEngine,
        interval: Duration,
        mut perturbation: Box<dyn ApyPerturbation>,
    ) -> Self {
        let (tx, _) = broadcast::channel(16);
        let snapshots = tx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first
            // drift lands one full interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match engine.refresh(perturbation.as_mut()).await {
                    Ok(snapshot) => {
                        debug!(
                            pools = snapshot.lending_pools.len(),
                            "refresh tick complete"
                        );
                        // No receivers is fine; the broadcast is best-effort.
                        let _ = tx.send(snapshot);
                    }
                    Err(e) => {
                        // Non-fatal: the next scheduled tick retries.
                        error!(error = %e, code = e.code(), "refresh failed");
                    }
                }
            }
        });
        Self { handle, snapshots }
    }

    /// Subscribe to refreshed snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerSnapshot> {
        self.snapshots.subscribe()
    }

    /// Stop the background task.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}
