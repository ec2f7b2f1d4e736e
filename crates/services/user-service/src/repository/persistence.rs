//! Request-scoped persistence for users.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use common::{AppResult, ChangeTracker, EventPublisher, TrackedUnitOfWork, UnitOfWork};

use super::user_repository::{UserCommitStore, UserRepository, UserStore};

/// Repository and unit of work for one request, sharing one change tracker.
#[derive(Clone)]
pub struct UserScope {
    pub users: Arc<dyn UserRepository>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
}

/// Source of request scopes.
#[async_trait]
pub trait UserPersistence: Send + Sync {
    fn scope(&self) -> UserScope;

    async fn ping(&self) -> AppResult<()>;
}

/// Postgres-backed persistence.
pub struct SeaUserPersistence {
    db: DatabaseConnection,
    publisher: EventPublisher,
}

impl SeaUserPersistence {
    pub fn new(db: DatabaseConnection, publisher: EventPublisher) -> Self {
        Self { db, publisher }
    }
}

#[async_trait]
impl UserPersistence for SeaUserPersistence {
    fn scope(&self) -> UserScope {
        let tracker = Arc::new(ChangeTracker::new());
        UserScope {
            users: Arc::new(UserStore::new(self.db.clone(), tracker.clone())),
            unit_of_work: Arc::new(TrackedUnitOfWork::new(
                tracker,
                UserCommitStore::new(self.db.clone()),
                self.publisher.clone(),
            )),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        common::db::ping(&self.db).await?;
        Ok(())
    }
}
