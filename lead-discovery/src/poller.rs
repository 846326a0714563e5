//! Status polling for a backend discovery job.
//!
//! One observation session runs as a single tokio task:
//!
//! ```text
//! start_observing()
//!     └─► immediate poll cycle
//!     └─► loop
//!           ├─ timer tick ─► poll cycle (status, then leads while running)
//!           └─ local change ─► recheck cadence
//!           └─ is_running flipped? ─► replace timer (3s running / 5s idle)
//! stop_observing()
//!     └─► bump generation, abort task
//! ```
//!
//! A cycle is awaited inside the loop, so a new status request is never sent
//! while the previous one is outstanding. Every write to the shared snapshot
//! carries the generation of the session that issued it and is dropped if
//! that session has since been stopped.

use crate::traits::DiscoveryBackend;
use crate::types::{DiscoveryStatus, Lead, PollConfig};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Active,
}

impl PollPhase {
    pub fn of(status: &DiscoveryStatus) -> Self {
        if status.is_running {
            PollPhase::Active
        } else {
            PollPhase::Idle
        }
    }
}

/// Latest known job state as seen by the operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollSnapshot {
    pub status: DiscoveryStatus,
    pub leads: Vec<Lead>,
    pub last_polled: Option<DateTime<Utc>>,
    /// Set when the most recent cycle failed; cleared by the next good one.
    pub last_error: Option<String>,
}

impl PollSnapshot {
    pub fn phase(&self) -> PollPhase {
        PollPhase::of(&self.status)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollerMetrics {
    pub cycles: u64,
    pub failures: u64,
    pub reschedules: u64,
    pub discarded: u64,
}

struct Shared {
    snapshot: RwLock<PollSnapshot>,
    generation: AtomicU64,
    updates: watch::Sender<PollSnapshot>,
    cadence_changed: Notify,
    cycles: AtomicU64,
    failures: AtomicU64,
    reschedules: AtomicU64,
    discarded: AtomicU64,
}

impl Shared {
    /// Apply `update` unless the issuing session has been cancelled.
    async fn apply<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut PollSnapshot),
    {
        let mut snapshot = self.snapshot.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            debug!("Discarding response from cancelled observation (generation {})", generation);
            return false;
        }
        update(&mut snapshot);
        self.updates.send_replace(snapshot.clone());
        true
    }

    async fn phase(&self) -> PollPhase {
        self.snapshot.read().await.phase()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Observes one backend job and keeps [`PollSnapshot`] current.
pub struct StatusPoller {
    backend: Arc<dyn DiscoveryBackend>,
    config: PollConfig,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
    session_id: Option<Uuid>,
}

impl StatusPoller {
    pub fn new(backend: Arc<dyn DiscoveryBackend>, config: PollConfig) -> Self {
        let (updates, _) = watch::channel(PollSnapshot::default());
        let shared = Arc::new(Shared {
            snapshot: RwLock::new(PollSnapshot::default()),
            generation: AtomicU64::new(0),
            updates,
            cadence_changed: Notify::new(),
            cycles: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            reschedules: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
        });

        Self {
            backend,
            config,
            shared,
            task: None,
            session_id: None,
        }
    }

    /// Receive every snapshot the poller publishes.
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.shared.updates.subscribe()
    }

    pub async fn snapshot(&self) -> PollSnapshot {
        self.shared.snapshot.read().await.clone()
    }

    pub fn metrics(&self) -> PollerMetrics {
        PollerMetrics {
            cycles: self.shared.cycles.load(Ordering::Relaxed),
            failures: self.shared.failures.load(Ordering::Relaxed),
            reschedules: self.shared.reschedules.load(Ordering::Relaxed),
            discarded: self.shared.discarded.load(Ordering::Relaxed),
        }
    }

    pub fn is_observing(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Begin polling. Calling this while already observing keeps the
    /// current session.
    pub async fn start_observing(&mut self) -> Uuid {
        if let (true, Some(session_id)) = (self.is_observing(), self.session_id) {
            return session_id;
        }

        let generation = {
            let _guard = self.shared.snapshot.write().await;
            self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        let session_id = Uuid::new_v4();
        info!("Observation {} started", session_id);

        let task = tokio::spawn(observe(
            self.backend.clone(),
            self.config.clone(),
            self.shared.clone(),
            generation,
            session_id,
        ));

        self.task = Some(task);
        self.session_id = Some(session_id);
        session_id
    }

    /// Cancel the timer and any cycle in flight. Nothing issued by the
    /// stopped session reaches the snapshot afterwards.
    pub async fn stop_observing(&mut self) {
        {
            let _guard = self.shared.snapshot.write().await;
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(session_id) = self.session_id.take() {
            info!("Observation {} stopped", session_id);
        }
    }

    /// Local change made ahead of the backend confirming it. The next poll
    /// response overwrites it either way.
    pub async fn apply_local<F>(&self, update: F)
    where
        F: FnOnce(&mut PollSnapshot),
    {
        let mut snapshot = self.shared.snapshot.write().await;
        update(&mut snapshot);
        self.shared.updates.send_replace(snapshot.clone());
        drop(snapshot);
        self.shared.cadence_changed.notify_one();
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn observe(
    backend: Arc<dyn DiscoveryBackend>,
    config: PollConfig,
    shared: Arc<Shared>,
    generation: u64,
    session_id: Uuid,
) {
    poll_cycle(backend.as_ref(), &shared, generation).await;

    let mut phase = shared.phase().await;
    let mut ticker = cadence_ticker(&config, phase);
    debug!("Observation {} polling every {:?}", session_id, ticker.period());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poll_cycle(backend.as_ref(), &shared, generation).await;
            }
            _ = shared.cadence_changed.notified() => {}
        }

        if !shared.is_current(generation) {
            break;
        }

        let observed = shared.phase().await;
        if observed != phase {
            phase = observed;
            ticker = cadence_ticker(&config, phase);
            shared.reschedules.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Observation {} now {:?}, polling every {:?}",
                session_id,
                phase,
                ticker.period()
            );
        }
    }
}

// The first tick is a full period away; the immediate fetch happens out of band.
fn cadence_ticker(config: &PollConfig, phase: PollPhase) -> Interval {
    let period = config.interval_for(phase == PollPhase::Active);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn poll_cycle(backend: &dyn DiscoveryBackend, shared: &Shared, generation: u64) {
    shared.cycles.fetch_add(1, Ordering::Relaxed);

    let status = match backend.status().await {
        Ok(status) => status,
        Err(e) => {
            shared.failures.fetch_add(1, Ordering::Relaxed);
            warn!("Status fetch failed, keeping last known state: {}", e);
            let message = e.to_string();
            shared
                .apply(generation, |snapshot| snapshot.last_error = Some(message))
                .await;
            return;
        }
    };

    let mut lead_error = None;
    let leads = match status.run_id.as_deref() {
        Some(run_id) if status.is_active() => match backend.leads(run_id).await {
            Ok(leads) => Some(leads),
            Err(e) => {
                shared.failures.fetch_add(1, Ordering::Relaxed);
                warn!("Lead fetch for run {} failed, keeping previous leads: {}", run_id, e);
                lead_error = Some(e.to_string());
                None
            }
        },
        _ => None,
    };

    debug!(
        "Polled status: running={} run_id={:?} leads={:?}",
        status.is_running,
        status.run_id,
        leads.as_ref().map(Vec::len)
    );

    shared
        .apply(generation, |snapshot| {
            snapshot.status = status;
            if let Some(leads) = leads {
                snapshot.leads = leads;
            }
            snapshot.last_polled = Some(Utc::now());
            snapshot.last_error = lead_error;
        })
        .await;
}
