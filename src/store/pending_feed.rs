use tokio::sync::watch;

use crate::model::calendar_entry::CalendarEntry;

/// Latest snapshot of every pending calendar entry, pushed to live subscribers.
pub struct PendingFeed {
    tx: watch::Sender<Vec<CalendarEntry>>,
}

impl PendingFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Replaces the snapshot. Subscribers are only woken when it actually changed.
    pub fn publish(&self, mut snapshot: Vec<CalendarEntry>) {
        snapshot.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    pub fn snapshot(&self) -> Vec<CalendarEntry> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> PendingSubscription {
        PendingSubscription {
            rx: self.tx.subscribe(),
            delivered_initial: false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for PendingFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Dropping the subscription unsubscribes.
pub struct PendingSubscription {
    rx: watch::Receiver<Vec<CalendarEntry>>,
    delivered_initial: bool,
}

impl PendingSubscription {
    /// First call yields the current snapshot immediately, later calls wait for a change.
    /// Returns `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<Vec<CalendarEntry>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
