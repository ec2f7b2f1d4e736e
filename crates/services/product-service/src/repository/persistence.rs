//! Request-scoped persistence.
//!
//! Every request gets its own change tracker, so staged writes of concurrent
//! requests never mix. [`ProductPersistence::scope`] hands out the repository
//! and unit of work sharing that tracker.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use common::{AppResult, ChangeTracker, EventPublisher, TrackedUnitOfWork, UnitOfWork};

use super::product_repository::{ProductCommitStore, ProductRepository, ProductStore};

/// Repository and unit of work for one request.
#[derive(Clone)]
pub struct ProductScope {
    pub products: Arc<dyn ProductRepository>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
}

/// Source of request scopes.
#[async_trait]
pub trait ProductPersistence: Send + Sync {
    fn scope(&self) -> ProductScope;

    /// Check the backing store is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Postgres-backed persistence.
pub struct SeaProductPersistence {
    db: DatabaseConnection,
    publisher: EventPublisher,
}

impl SeaProductPersistence {
    pub fn new(db: DatabaseConnection, publisher: EventPublisher) -> Self {
        Self { db, publisher }
    }
}

#[async_trait]
impl ProductPersistence for SeaProductPersistence {
    fn scope(&self) -> ProductScope {
        let tracker = Arc::new(ChangeTracker::new());
        ProductScope {
            products: Arc::new(ProductStore::new(self.db.clone(), tracker.clone())),
            unit_of_work: Arc::new(TrackedUnitOfWork::new(
                tracker,
                ProductCommitStore::new(self.db.clone()),
                self.publisher.clone(),
            )),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        common::db::ping(&self.db).await?;
        Ok(())
    }
}
