//! Polling loop: fetch the list on a fixed interval and reconcile it.
//!
//! Each tick starts one fetch on the blocking pool and does not wait for
//! it, so slow fetches may overlap, up to [`MAX_IN_FLIGHT`] at a time.
//! Results come back over a channel tagged with the tick's sequence number;
//! the [`Reconciler`] drops any result older than the last one applied. All
//! state changes happen on the loop task.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::reconcile::{Applied, Reconciler};
use crate::source::{self, FetchError, SongSource};
use crate::song::Song;
use crate::view::{SongTable, ViewSink};

/// Ticks that find this many fetches still outstanding start no new one.
pub const MAX_IN_FLIGHT: usize = 4;

/// Counters for one poller run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollStats {
    /// Fetches started.
    pub ticks: u64,
    /// Ticks skipped because [`MAX_IN_FLIGHT`] fetches were outstanding.
    pub skipped: u64,
    /// Responses reconciled into the view.
    pub applied: u64,
    /// Responses dropped because a newer one was already applied.
    pub stale: u64,
    /// "No data" responses.
    pub no_data: u64,
    /// Fetches that failed (skipped until the next tick).
    pub failed: u64,
    /// Effects handed to the view.
    pub effects: u64,
}

type FetchResult = Result<Option<Vec<Song>>, FetchError>;

/// Handle to a running poller task.
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<PollStats>,
}

impl PollerHandle {
    /// Ask the loop to stop. In-flight fetches are told to abort and their
    /// results are discarded.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the loop to finish and return its counters.
    pub async fn join(self) -> Result<PollStats> {
        Ok(self.task.await?)
    }

    /// Shut down and wait.
    pub async fn stop(self) -> Result<PollStats> {
        self.shutdown();
        self.join().await
    }
}

pub struct Poller<V> {
    source: Arc<dyn SongSource>,
    sink: V,
    interval: Duration,
    reconciler: Reconciler,
}

impl<V: ViewSink> Poller<V> {
    pub fn new(source: Arc<dyn SongSource>, sink: V, interval: Duration) -> Self {
        Self {
            source,
            sink,
            interval,
            reconciler: Reconciler::new(),
        }
    }

    /// Start the loop on the current tokio runtime. The first fetch starts
    /// immediately.
    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        PollerHandle { shutdown_tx, task }
    }

    async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> PollStats {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "poller started");

        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(u64, FetchResult)>();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let abort = Arc::new(AtomicBool::new(false));
        let mut stats = PollStats::default();
        let mut next_seq = 0u64;
        let mut in_flight = 0usize;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if in_flight >= MAX_IN_FLIGHT {
                        stats.skipped += 1;
                        tracing::debug!(in_flight, "previous fetches still running, skipping tick");
                        continue;
                    }
                    next_seq += 1;
                    stats.ticks += 1;
                    in_flight += 1;
                    let seq = next_seq;
                    let tx = result_tx.clone();
                    let source = Arc::clone(&self.source);
                    let abort = Arc::clone(&abort);
                    tokio::spawn(async move {
                        let res = source::fetch_blocking(source, abort).await;
                        // Receiver is gone once the poller stopped.
                        let _ = tx.send((seq, res));
                    });
                }
                Some((seq, res)) = result_rx.recv() => {
                    in_flight = in_flight.saturating_sub(1);
                    self.handle_result(seq, res, &mut stats);
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        abort.store(true, Ordering::Relaxed);
        tracing::info!(
            ticks = stats.ticks,
            skipped = stats.skipped,
            applied = stats.applied,
            stale = stats.stale,
            failed = stats.failed,
            in_flight,
            "poller stopped"
        );
        stats
    }

    fn handle_result(&mut self, seq: u64, res: FetchResult, stats: &mut PollStats) {
        let snapshot = match res {
            Ok(s) => s,
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(
                    seq,
                    kind = ?e.kind(),
                    transient = e.is_transient(),
                    "song list fetch failed: {}",
                    e
                );
                return;
            }
        };

        match self.reconciler.apply_tagged(seq, snapshot.as_deref()) {
            Applied::Stale { seq, last_applied } => {
                stats.stale += 1;
                tracing::debug!(seq, last_applied, "dropping stale song list");
            }
            Applied::NoData => {
                stats.no_data += 1;
                tracing::debug!(seq, "server returned no song list");
            }
            Applied::Effects(effects) => {
                stats.applied += 1;
                stats.effects += effects.len() as u64;
                for effect in &effects {
                    if effect.is_structural() {
                        tracing::debug!(seq, "{}", effect);
                    }
                    self.sink.apply(effect);
                }
            }
        }
    }
}

/// One fetch outside the loop, rendered into a fresh table.
pub async fn snapshot_table(source: Arc<dyn SongSource>) -> Result<SongTable, FetchError> {
    let mut table = SongTable::new();
    let abort = Arc::new(AtomicBool::new(false));
    if let Some(songs) = source::fetch_blocking(source, abort).await? {
        let mut reconciler = Reconciler::new();
        for effect in reconciler.apply(&songs) {
            table.apply(&effect);
        }
    }
    Ok(table)
}
