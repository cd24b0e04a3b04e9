// ── Cache invalidation sinks ──

use tokio::sync::broadcast;
use tracing::trace;

use crate::group::SourceGroup;

const INVALIDATION_CHANNEL_SIZE: usize = 64;

/// Receives a signal when a source group's server-side data changed.
pub trait CacheInvalidator: Send + Sync + 'static {
    fn invalidate(&self, group: SourceGroup);
}

impl<F> CacheInvalidator for F
where
    F: Fn(SourceGroup) + Send + Sync + 'static,
{
    fn invalidate(&self, group: SourceGroup) {
        self(group);
    }
}

/// Fans invalidations out to any number of subscribers.
///
/// Subscribers that fall behind by more than the channel capacity see
/// `RecvError::Lagged` and should treat every group as stale.
#[derive(Debug, Clone)]
pub struct BroadcastInvalidator {
    tx: broadcast::Sender<SourceGroup>,
}

impl BroadcastInvalidator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(INVALIDATION_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SourceGroup> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastInvalidator {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheInvalidator for BroadcastInvalidator {
    fn invalidate(&self, group: SourceGroup) {
        // No subscribers is not an error; the signal is simply dropped.
        if self.tx.send(group).is_err() {
            trace!(%group, "invalidation with no subscribers");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn every_subscriber_sees_each_signal() {
        let invalidator = BroadcastInvalidator::new();
        let mut a = invalidator.subscribe();
        let mut b = invalidator.subscribe();

        invalidator.invalidate(SourceGroup::Schedule);

        assert_eq!(a.recv().await.unwrap(), SourceGroup::Schedule);
        assert_eq!(b.recv().await.unwrap(), SourceGroup::Schedule);
    }

    #[test]
    fn sending_without_subscribers_is_harmless() {
        BroadcastInvalidator::new().invalidate(SourceGroup::Fares);
    }

    #[test]
    fn closures_are_invalidators() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |group: SourceGroup| seen.lock().unwrap().push(group)
        };
        sink.invalidate(SourceGroup::Vessels);
        assert_eq!(*seen.lock().unwrap(), vec![SourceGroup::Vessels]);
    }
}
