//! Unit of Work pattern implementation.
//!
//! Repositories stage changes into a [`ChangeTracker`] owned by one request.
//! [`TrackedUnitOfWork::save_changes`] then:
//!
//! 1. drains the staged changes and snapshots the events they carry,
//! 2. hands the changes to a [`CommitStore`], which applies them atomically,
//! 3. publishes the snapshot in order, only if the commit succeeded,
//! 4. returns the number of persisted changes.
//!
//! A failed commit discards the snapshot. A failed publication is logged and
//! does not affect the already committed result.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use domain::DomainEvent;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::events::EventPublisher;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Kind of staged repository operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
}

/// One staged operation together with the events it raised.
#[derive(Debug, Clone)]
pub struct Change<T> {
    pub kind: ChangeKind,
    pub entity: T,
    pub events: Vec<DomainEvent>,
}

/// Request-scoped list of staged changes, in staging order.
#[derive(Debug)]
pub struct ChangeTracker<T> {
    changes: Mutex<Vec<Change<T>>>,
}

impl<T> Default for ChangeTracker<T> {
    fn default() -> Self {
        Self {
            changes: Mutex::new(Vec::new()),
        }
    }
}

impl<T> ChangeTracker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self, kind: ChangeKind, entity: T, events: Vec<DomainEvent>) {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Change {
                kind,
                entity,
                events,
            });
    }

    /// Remove and return everything staged so far.
    pub fn take(&self) -> Vec<Change<T>> {
        std::mem::take(&mut *self.changes.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.changes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Commit everything staged in this unit and publish its events.
    async fn save_changes(&self) -> AppResult<u64>;
}

/// Backing store able to apply a batch of staged changes atomically.
#[async_trait]
pub trait CommitStore<T>: Send + Sync {
    /// Apply all `changes` or none of them; returns the number applied.
    async fn commit(&self, changes: &[Change<T>]) -> AppResult<u64>;
}

/// Unit of work over one change tracker and one commit store.
pub struct TrackedUnitOfWork<T, S> {
    tracker: Arc<ChangeTracker<T>>,
    store: S,
    publisher: EventPublisher,
}

impl<T, S> TrackedUnitOfWork<T, S> {
    pub fn new(tracker: Arc<ChangeTracker<T>>, store: S, publisher: EventPublisher) -> Self {
        Self {
            tracker,
            store,
            publisher,
        }
    }
}

#[async_trait]
impl<T, S> UnitOfWork for TrackedUnitOfWork<T, S>
where
    T: Send + Sync + 'static,
    S: CommitStore<T>,
{
    async fn save_changes(&self) -> AppResult<u64> {
        let changes = self.tracker.take();
        let events: Vec<DomainEvent> = changes
            .iter()
            .flat_map(|change| change.events.iter().cloned())
            .collect();

        let persisted = self.store.commit(&changes).await?;
        debug!(persisted, events = events.len(), "Changes committed");

        for event in &events {
            if let Err(e) = self.publisher.publish(event).await {
                warn!(event = event.name(), error = %e, "Committed change was not fully published");
            }
        }

        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::events::EventSubscriber;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Uuid>>,
        fail: bool,
    }

    #[async_trait]
    impl CommitStore<Uuid> for MemoryStore {
        async fn commit(&self, changes: &[Change<Uuid>]) -> AppResult<u64> {
            if self.fail {
                return Err(AppError::internal("constraint violation"));
            }
            let mut rows = self.rows.lock().unwrap();
            rows.extend(changes.iter().map(|c| c.entity));
            Ok(changes.len() as u64)
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<DomainEvent>>);

    #[async_trait]
    impl EventSubscriber for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn handle(&self, event: &DomainEvent) -> AppResult<()> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl EventSubscriber for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn handle(&self, _event: &DomainEvent) -> AppResult<()> {
            Err(AppError::internal("subscriber down"))
        }
    }

    fn stage_two(tracker: &ChangeTracker<Uuid>) -> Vec<DomainEvent> {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let first = DomainEvent::ProductCreated {
            product_id: a,
            user_id: Uuid::new_v4(),
        };
        let second = DomainEvent::ProductUpdated { product_id: b };
        tracker.stage(ChangeKind::Added, a, vec![first.clone()]);
        tracker.stage(ChangeKind::Updated, b, vec![second.clone()]);
        vec![first, second]
    }

    #[tokio::test]
    async fn test_commit_then_publish_in_staging_order() {
        let tracker = Arc::new(ChangeTracker::new());
        let recorder = Arc::new(Recorder::default());
        let uow = TrackedUnitOfWork::new(
            tracker.clone(),
            MemoryStore::default(),
            EventPublisher::new(vec![recorder.clone()]),
        );
        let expected = stage_two(&tracker);

        let persisted = uow.save_changes().await.unwrap();

        assert_eq!(persisted, 2);
        assert!(tracker.is_empty());
        assert_eq!(uow.store.rows.lock().unwrap().len(), 2);
        assert_eq!(*recorder.0.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_failed_commit_publishes_nothing() {
        let tracker = Arc::new(ChangeTracker::new());
        let recorder = Arc::new(Recorder::default());
        let store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let uow = TrackedUnitOfWork::new(
            tracker.clone(),
            store,
            EventPublisher::new(vec![recorder.clone()]),
        );
        stage_two(&tracker);

        let result = uow.save_changes().await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(uow.store.rows.lock().unwrap().is_empty());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_failure_keeps_commit() {
        let tracker = Arc::new(ChangeTracker::new());
        let uow = TrackedUnitOfWork::new(
            tracker.clone(),
            MemoryStore::default(),
            EventPublisher::new(vec![Arc::new(Broken)]),
        );
        stage_two(&tracker);

        assert_eq!(uow.save_changes().await.unwrap(), 2);
        assert_eq!(uow.store.rows.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_staged_commits_nothing() {
        let uow = TrackedUnitOfWork::new(
            Arc::new(ChangeTracker::<Uuid>::new()),
            MemoryStore::default(),
            EventPublisher::default(),
        );
        assert_eq!(uow.save_changes().await.unwrap(), 0);
    }
}
