// ── Cache flush poller ──
//
// Periodically reads each source group's cache-flush marker and signals the
// invalidator when a marker moves. The first observation of a group only
// establishes its baseline. Failed polls keep the stored marker and are
// retried on the next tick; they never signal.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::group::SourceGroup;
use crate::invalidate::CacheInvalidator;

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Last observed flush marker per group.
pub type MarkerSnapshot = BTreeMap<SourceGroup, DateTime<Utc>>;

/// Anything that can report a group's current flush marker.
pub trait FlushMarkerSource: Send + Sync + 'static {
    fn flush_marker(
        &self,
        group: SourceGroup,
    ) -> impl Future<Output = Result<DateTime<Utc>, CoreError>> + Send;
}

/// Outcome of comparing a fetched marker with the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First marker seen for the group.
    Baseline,
    Unchanged,
    Changed {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

/// Per-group marker memory.
#[derive(Debug, Clone, Default)]
pub struct FlushTracker {
    markers: MarkerSnapshot,
}

impl FlushTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `marker` for `group` and report how it relates to the last one.
    pub fn observe(&mut self, group: SourceGroup, marker: DateTime<Utc>) -> Observation {
        match self.markers.insert(group, marker) {
            None => Observation::Baseline,
            Some(previous) if previous == marker => Observation::Unchanged,
            Some(previous) => Observation::Changed {
                previous,
                current: marker,
            },
        }
    }

    pub fn marker(&self, group: SourceGroup) -> Option<DateTime<Utc>> {
        self.markers.get(&group).copied()
    }

    pub fn snapshot(&self) -> MarkerSnapshot {
        self.markers.clone()
    }
}

/// Polls flush markers and drives a [`CacheInvalidator`].
pub struct CacheFlushPoller<S, I> {
    source: Arc<S>,
    invalidator: Arc<I>,
    groups: Vec<SourceGroup>,
    interval: Duration,
    tracker: FlushTracker,
}

impl<S, I> CacheFlushPoller<S, I>
where
    S: FlushMarkerSource,
    I: CacheInvalidator,
{
    /// A poller over every source group at the default interval.
    pub fn new(source: Arc<S>, invalidator: Arc<I>) -> Self {
        Self {
            source,
            invalidator,
            groups: SourceGroup::iter().collect(),
            interval: DEFAULT_POLL_INTERVAL,
            tracker: FlushTracker::new(),
        }
    }

    /// Poll every `interval` (at least one second).
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Restrict polling to `groups`.
    #[must_use]
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = SourceGroup>) -> Self {
        self.groups = groups.into_iter().collect();
        self.groups.sort();
        self.groups.dedup();
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn tracker(&self) -> &FlushTracker {
        &self.tracker
    }

    /// Run one polling round over every group.
    ///
    /// Returns the observation for each group whose marker was fetched;
    /// groups whose fetch failed are logged and left out.
    pub async fn poll_once(&mut self) -> Vec<(SourceGroup, Observation)> {
        let mut observed = Vec::with_capacity(self.groups.len());

        for &group in &self.groups {
            let marker = match self.source.flush_marker(group).await {
                Ok(marker) => marker,
                Err(e) => {
                    warn!(%group, error = %e, "cache flush poll failed");
                    continue;
                }
            };

            let observation = self.tracker.observe(group, marker);
            match observation {
                Observation::Baseline => debug!(%group, %marker, "flush marker baseline"),
                Observation::Unchanged => {}
                Observation::Changed { previous, current } => {
                    info!(%group, %previous, %current, "cache flushed upstream, invalidating");
                    self.invalidator.invalidate(group);
                }
            }
            observed.push((group, observation));
        }

        observed
    }

    /// Start polling in the background. The first round runs immediately.
    pub fn spawn(self) -> PollerHandle {
        let cancel = CancellationToken::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(self.tracker.snapshot());
        let task = tokio::spawn(poll_task(self, cancel.clone(), snapshot_tx));

        PollerHandle {
            cancel,
            task: Some(task),
            markers: snapshot_rx,
        }
    }
}

async fn poll_task<S, I>(
    mut poller: CacheFlushPoller<S, I>,
    cancel: CancellationToken,
    snapshot_tx: watch::Sender<MarkerSnapshot>,
) where
    S: FlushMarkerSource,
    I: CacheInvalidator,
{
    let mut interval = tokio::time::interval(poller.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                poller.poll_once().await;
                snapshot_tx.send_replace(poller.tracker.snapshot());
            }
        }
    }

    debug!("cache flush poller stopped");
}

/// Owns a running poller. Dropping the handle stops it.
pub struct PollerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    markers: watch::Receiver<MarkerSnapshot>,
}

impl PollerHandle {
    /// Markers as of the last completed round.
    pub fn markers(&self) -> MarkerSnapshot {
        self.markers.borrow().clone()
    }

    /// Watch markers as rounds complete.
    pub fn subscribe(&self) -> watch::Receiver<MarkerSnapshot> {
        self.markers.clone()
    }

    /// Stop scheduling ticks. A round already in flight still completes.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop and wait for the background task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "cache flush poller task ended abnormally");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }

    #[test]
    fn baseline_then_unchanged_then_changed() {
        let mut tracker = FlushTracker::new();

        assert_eq!(tracker.observe(SourceGroup::Vessels, at(100)), Observation::Baseline);
        assert_eq!(tracker.observe(SourceGroup::Vessels, at(100)), Observation::Unchanged);
        assert_eq!(
            tracker.observe(SourceGroup::Vessels, at(200)),
            Observation::Changed {
                previous: at(100),
                current: at(200)
            }
        );
        assert_eq!(tracker.marker(SourceGroup::Vessels), Some(at(200)));
    }

    #[test]
    fn groups_are_tracked_independently() {
        let mut tracker = FlushTracker::new();
        tracker.observe(SourceGroup::Vessels, at(1));
        assert_eq!(tracker.observe(SourceGroup::Fares, at(1)), Observation::Baseline);
        assert_eq!(tracker.snapshot().len(), 2);
    }
}
