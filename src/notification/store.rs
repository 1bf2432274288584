//! In-memory notification store.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::metrics::DispatchMetrics;

use super::event_log::{EventSink, StoreEvent};
use super::{Channel, Notification, NotificationStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("notification {0} not found")]
    NotFound(Uuid),

    /// Current status differs from the expected one, or the move is not in
    /// the transition table. Nothing was mutated.
    #[error("notification {id} cannot move from {expected} to {next} (current status: {current})")]
    InvalidTransition {
        id: Uuid,
        current: NotificationStatus,
        expected: NotificationStatus,
        next: NotificationStatus,
    },
}

/// Owns every notification record.
///
/// Records live in a `DashMap`; a transition holds the shard write lock for the
/// record while it compares and sets, which makes it atomic with respect to
/// other transitions on the same id.
pub struct NotificationStore {
    records: DashMap<Uuid, Notification>,
    sink: Option<Arc<dyn EventSink>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            sink: None,
        }
    }

    /// Create a store that reports committed changes to `sink`
    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self {
            records: DashMap::new(),
            sink: Some(sink),
        }
    }

    /// Store a new queued notification and return its id
    pub fn create(
        &self,
        recipient: impl Into<String>,
        message: impl Into<String>,
        channel: Channel,
    ) -> Uuid {
        let notification = Notification::new(recipient, message, channel);
        let id = notification.id;

        match self.records.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(notification.clone());
            }
            Entry::Occupied(_) => unreachable!("freshly generated notification id {id} already stored"),
        }

        DispatchMetrics::record_created(channel);
        tracing::debug!(notification_id = %id, channel = %channel, "Notification queued");
        self.emit(StoreEvent::created(notification));

        id
    }

    /// Snapshot of a record
    pub fn get(&self, id: &Uuid) -> Result<Notification, StoreError> {
        self.records
            .get(id)
            .map(|record| record.value().clone())
            .ok_or(StoreError::NotFound(*id))
    }

    /// Compare-and-set status update.
    ///
    /// Succeeds only when the current status equals `expected` and `next` is a
    /// legal successor of it. Returns the updated snapshot.
    pub fn transition(
        &self,
        id: &Uuid,
        expected: NotificationStatus,
        next: NotificationStatus,
    ) -> Result<Notification, StoreError> {
        let snapshot = {
            let mut record = self.records.get_mut(id).ok_or(StoreError::NotFound(*id))?;

            if record.status != expected || !expected.can_transition_to(next) {
                return Err(StoreError::InvalidTransition {
                    id: *id,
                    current: record.status,
                    expected,
                    next,
                });
            }

            record.status = next;
            record.updated_at = chrono::Utc::now();
            record.clone()
        };

        tracing::debug!(
            notification_id = %id,
            from = %expected,
            to = %next,
            "Notification status updated"
        );
        self.emit(StoreEvent::transitioned(snapshot.clone(), expected));

        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count records per status
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for record in self.records.iter() {
            match record.status {
                NotificationStatus::Queued => counts.queued += 1,
                NotificationStatus::Processing => counts.processing += 1,
                NotificationStatus::Sent => counts.sent += 1,
                NotificationStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    fn emit(&self, event: StoreEvent) {
        if let Some(sink) = &self.sink {
            sink.record(event);
        }
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of records in each status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub queued: usize,
    pub processing: usize,
    pub sent: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: NotificationStatus) -> usize {
        match status {
            NotificationStatus::Queued => self.queued,
            NotificationStatus::Processing => self.processing,
            NotificationStatus::Sent => self.sent,
            NotificationStatus::Failed => self.failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<StoreEvent>>,
    }

    impl EventSink for RecordingSink {
        fn record(&self, event: StoreEvent) {
            self.events.lock().push(event);
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = NotificationStore::new();
        let id = store.create("a@b.com", "hi", Channel::Email);

        let record = store.get(&id).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.recipient, "a@b.com");
        assert_eq!(record.message, "hi");
        assert_eq!(record.channel, Channel::Email);
        assert_eq!(record.status, NotificationStatus::Queued);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_are_unique() {
        let store = NotificationStore::new();
        let a = store.create("a", "m", Channel::Sms);
        let b = store.create("a", "m", Channel::Sms);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_unknown_id() {
        let store = NotificationStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.get(&id), Err(StoreError::NotFound(id)));
    }

    #[test]
    fn test_full_lifecycle() {
        let store = NotificationStore::new();
        let id = store.create("a", "m", Channel::Push);

        let record = store
            .transition(&id, NotificationStatus::Queued, NotificationStatus::Processing)
            .unwrap();
        assert_eq!(record.status, NotificationStatus::Processing);

        let record = store
            .transition(&id, NotificationStatus::Processing, NotificationStatus::Failed)
            .unwrap();
        assert_eq!(record.status, NotificationStatus::Failed);
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_transition_with_stale_expectation_does_not_mutate() {
        let store = NotificationStore::new();
        let id = store.create("a", "m", Channel::Email);
        store
            .transition(&id, NotificationStatus::Queued, NotificationStatus::Processing)
            .unwrap();

        let err = store
            .transition(&id, NotificationStatus::Queued, NotificationStatus::Processing)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidTransition {
                id,
                current: NotificationStatus::Processing,
                expected: NotificationStatus::Queued,
                next: NotificationStatus::Processing,
            }
        );
        assert_eq!(store.get(&id).unwrap().status, NotificationStatus::Processing);
    }

    #[test]
    fn test_illegal_moves_are_rejected() {
        let store = NotificationStore::new();
        let id = store.create("a", "m", Channel::Email);

        // Skipping processing
        assert!(store
            .transition(&id, NotificationStatus::Queued, NotificationStatus::Sent)
            .is_err());
        assert_eq!(store.get(&id).unwrap().status, NotificationStatus::Queued);

        store
            .transition(&id, NotificationStatus::Queued, NotificationStatus::Processing)
            .unwrap();
        store
            .transition(&id, NotificationStatus::Processing, NotificationStatus::Sent)
            .unwrap();

        // Terminal
        for next in NotificationStatus::ALL {
            assert!(store.transition(&id, NotificationStatus::Sent, next).is_err());
        }
        assert_eq!(store.get(&id).unwrap().status, NotificationStatus::Sent);
    }

    #[test]
    fn test_transition_unknown_id() {
        let store = NotificationStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.transition(&id, NotificationStatus::Queued, NotificationStatus::Processing),
            Err(StoreError::NotFound(id))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_transitions_have_one_winner() {
        let store = NotificationStore::new();
        let id = store.create("a", "m", Channel::Email);

        let winners = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    scope.spawn(|| {
                        store
                            .transition(&id, NotificationStatus::Queued, NotificationStatus::Processing)
                            .is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count()
        });

        assert_eq!(winners, 1);
    }

    #[test]
    fn test_status_counts() {
        let store = NotificationStore::new();
        let a = store.create("a", "m", Channel::Email);
        let _b = store.create("b", "m", Channel::Email);
        store
            .transition(&a, NotificationStatus::Queued, NotificationStatus::Processing)
            .unwrap();

        let counts = store.status_counts();
        assert_eq!(counts.queued, 1);
        assert_eq!(counts.processing, 1);
        assert_eq!(counts.get(NotificationStatus::Sent), 0);
    }

    #[test]
    fn test_sink_receives_committed_changes_only() {
        let sink = Arc::new(RecordingSink::default());
        let store = NotificationStore::with_sink(sink.clone());

        let id = store.create("a", "m", Channel::Sms);
        store
            .transition(&id, NotificationStatus::Queued, NotificationStatus::Processing)
            .unwrap();
        let _ = store.transition(&id, NotificationStatus::Queued, NotificationStatus::Processing);

        let events = sink.events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].previous_status, None);
        assert_eq!(events[1].previous_status, Some(NotificationStatus::Queued));
        assert_eq!(events[1].notification.status, NotificationStatus::Processing);
    }
}
