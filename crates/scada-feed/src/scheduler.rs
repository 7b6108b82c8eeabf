//! Refresh scheduler — background task that regenerates a screen's snapshot.
//!
//! A `RefreshScheduler` owns one generator and one RNG. `start()` publishes
//! a snapshot synchronously and spawns a task that republishes on a fixed
//! period. `stop()` cancels the task; generation and publication happen
//! under the same lock `stop()` takes, so nothing is published once it
//! returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use scada_core::MAX_REFRESH_PERIOD;

use crate::generator::Generator;

/// Shortest period the scheduler will tick at.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Latest published snapshot, `None` until the first generation.
pub type SnapshotReceiver<S> = watch::Receiver<Option<Arc<S>>>;

struct FeedState {
    rng: StdRng,
    /// Bumped by every `start()`. A tick from an earlier start publishes nothing.
    epoch: u64,
    /// Cleared by `stop()`; a tick that sees `false` publishes nothing.
    active: bool,
}

struct Shared<G: Generator> {
    label: String,
    generator: G,
    state: Mutex<FeedState>,
    snapshots: watch::Sender<Option<Arc<G::Snapshot>>>,
    generations: AtomicU64,
}

impl<G: Generator> Shared<G> {
    /// Generate and publish one snapshot for the start identified by
    /// `epoch`. Returns `false` once that start has been stopped.
    fn refresh(&self, epoch: u64) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.active || state.epoch != epoch {
            return false;
        }

        let snapshot = self.generator.generate(&mut state.rng, Utc::now());
        self.snapshots.send_replace(Some(Arc::new(snapshot)));
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;

        debug!(screen = %self.label, generation, "snapshot refreshed");
        true
    }

    /// Open a new epoch and return it.
    fn activate(&self) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.epoch += 1;
        state.active = true;
        state.epoch
    }

    fn deactivate(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.active = false;
    }
}

/// Handle to the running refresh task.
struct RefreshTask {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

/// Periodically replaces a snapshot with a freshly generated one.
pub struct RefreshScheduler<G: Generator> {
    shared: Arc<Shared<G>>,
    period: Duration,
    task: Option<RefreshTask>,
}

impl<G: Generator> RefreshScheduler<G> {
    /// Create a stopped scheduler. The period is clamped to
    /// `1ms..=MAX_REFRESH_PERIOD`.
    pub fn new(label: impl Into<String>, generator: G, period: Duration, rng: StdRng) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                label: label.into(),
                generator,
                state: Mutex::new(FeedState {
                    rng,
                    epoch: 0,
                    active: false,
                }),
                snapshots,
                generations: AtomicU64::new(0),
            }),
            period: period.clamp(MIN_PERIOD, MAX_REFRESH_PERIOD),
            task: None,
        }
    }

    /// Create a scheduler seeded from `seed`, or from OS entropy when `None`.
    pub fn seeded(
        label: impl Into<String>,
        generator: G,
        period: Duration,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(label, generator, period, rng)
    }

    /// Generate a snapshot now and keep refreshing every period.
    ///
    /// Must be called from within a tokio runtime. No-op while running.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }

        let epoch = self.shared.activate();
        self.shared.refresh(epoch);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let shared = Arc::clone(&self.shared);
        let period = self.period;
        let handle = tokio::spawn(async move {
            run_refresh_loop(shared, epoch, period, shutdown_rx).await;
        });

        self.task = Some(RefreshTask {
            handle,
            shutdown_tx,
        });

        info!(
            screen = %self.shared.label,
            period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX),
            "refresh scheduler started"
        );
    }

    /// Cancel the refresh task. No snapshot is published after this returns.
    pub fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        self.shared.deactivate();
        let _ = task.shutdown_tx.send(true);
        task.handle.abort();

        info!(
            screen = %self.shared.label,
            generations = self.generations(),
            "refresh scheduler stopped"
        );
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// True until the first snapshot has been published. Never resets.
    pub fn is_loading(&self) -> bool {
        self.shared.snapshots.borrow().is_none()
    }

    /// The current snapshot, if any has been generated.
    pub fn latest(&self) -> Option<Arc<G::Snapshot>> {
        self.shared.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> SnapshotReceiver<G::Snapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Total snapshots published over the scheduler's lifetime.
    pub fn generations(&self) -> u64 {
        self.shared.generations.load(Ordering::Relaxed)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn label(&self) -> &str {
        &self.shared.label
    }

    pub fn generator(&self) -> &G {
        &self.shared.generator
    }
}

impl<G: Generator> Drop for RefreshScheduler<G> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The tick loop for a single scheduler.
async fn run_refresh_loop<G: Generator>(
    shared: Arc<Shared<G>>,
    epoch: u64,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let now = Instant::now();
    let first = now.checked_add(period).unwrap_or(now);
    let mut ticker = tokio::time::interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !shared.refresh(epoch) {
                    break;
                }
            }
            _ = shutdown.changed() => {
                debug!(screen = %shared.label, "refresh loop shutting down");
                break;
            }
        }
    }
}
