//! User repository.
//!
//! Same split as products: staged writes through the request's change
//! tracker, reads straight from the store.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
    TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult, Change, ChangeKind, ChangeTracker, CommitStore};
use domain::{DomainEvent, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stage a new user together with the events its creation raised.
    fn add(&self, user: User, events: Vec<DomainEvent>);

    /// Stage a full replacement of the user with the same id.
    fn update(&self, user: User, events: Vec<DomainEvent>);

    /// Stage deletion.
    fn remove(&self, user: User, events: Vec<DomainEvent>);

    /// Find a user by id. Fails with `AmbiguousIdentity` on duplicate ids.
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by exact email address.
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// SeaORM-backed repository bound to one request's change tracker.
pub struct UserStore {
    db: DatabaseConnection,
    tracker: Arc<ChangeTracker<User>>,
}

impl UserStore {
    pub fn new(db: DatabaseConnection, tracker: Arc<ChangeTracker<User>>) -> Self {
        Self { db, tracker }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    fn add(&self, user: User, events: Vec<DomainEvent>) {
        self.tracker.stage(ChangeKind::Added, user, events);
    }

    fn update(&self, user: User, events: Vec<DomainEvent>) {
        self.tracker.stage(ChangeKind::Updated, user, events);
    }

    fn remove(&self, user: User, events: Vec<DomainEvent>) {
        self.tracker.stage(ChangeKind::Removed, user, events);
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut models = UserEntity::find_by_id(id).limit(2).all(&self.db).await?;

        if models.len() > 1 {
            return Err(AppError::AmbiguousIdentity(format!(
                "more than one user with id {}",
                id
            )));
        }

        Ok(models.pop().map(User::from))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }
}

/// Applies staged user changes inside a single transaction.
pub struct UserCommitStore {
    db: DatabaseConnection,
}

impl UserCommitStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommitStore<User> for UserCommitStore {
    async fn commit(&self, changes: &[Change<User>]) -> AppResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        let mut persisted = 0;

        for change in changes {
            persisted += match change.kind {
                ChangeKind::Added => {
                    ActiveModel::from(&change.entity).insert(&txn).await?;
                    1
                }
                ChangeKind::Updated => {
                    ActiveModel::from(&change.entity).update(&txn).await?;
                    1
                }
                ChangeKind::Removed => {
                    UserEntity::delete_by_id(change.entity.id)
                        .exec(&txn)
                        .await?
                        .rows_affected
                }
            };
        }

        txn.commit().await?;
        Ok(persisted)
    }
}
