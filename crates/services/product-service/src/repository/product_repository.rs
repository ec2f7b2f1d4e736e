//! Product repository.
//!
//! Writes are staged into the request's change tracker and only reach the
//! store through [`ProductCommitStore`] when the unit of work commits. Reads
//! go straight to the store.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use common::{AppError, AppResult, Change, ChangeKind, ChangeTracker, CommitStore};
use domain::{DomainEvent, Product, ProductFilter};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stage a new product together with the events its creation raised.
    fn add(&self, product: Product, events: Vec<DomainEvent>);

    /// Stage a full replacement of the product with the same id.
    fn update(&self, product: Product, events: Vec<DomainEvent>);

    /// Stage deletion.
    fn remove(&self, product: Product, events: Vec<DomainEvent>);

    /// Find a product by id. Fails with `AmbiguousIdentity` on duplicate ids.
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// All products, possibly none.
    async fn get_all(&self) -> AppResult<Vec<Product>>;

    /// Products matching every present criterion of `filter`.
    async fn search(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;
}

/// SeaORM-backed repository bound to one request's change tracker.
pub struct ProductStore {
    db: DatabaseConnection,
    tracker: Arc<ChangeTracker<Product>>,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection, tracker: Arc<ChangeTracker<Product>>) -> Self {
        Self { db, tracker }
    }
}

const LIKE_ESCAPE: char = '!';

/// `LIKE` pattern that matches `needle` as a literal substring.
fn substring_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// SQL form of [`ProductFilter::matches`]; the two must accept the same rows.
fn search_condition(filter: &ProductFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(name) = filter.name.as_deref() {
        condition = condition.add(
            Expr::col((ProductEntity, product::Column::Name))
                .like(LikeExpr::new(substring_pattern(name)).escape(LIKE_ESCAPE)),
        );
    }
    if let Some(min) = filter.min_price {
        condition = condition.add(product::Column::Price.gte(min));
    }
    if let Some(max) = filter.price_cap() {
        condition = condition.add(product::Column::Price.lte(max));
    }
    if let Some(min) = filter.min_quantity {
        condition = condition.add(product::Column::Quantity.gte(min));
    }
    if let Some(max) = filter.quantity_cap() {
        condition = condition.add(product::Column::Quantity.lte(max));
    }
    condition
}

#[async_trait]
impl ProductRepository for ProductStore {
    fn add(&self, product: Product, events: Vec<DomainEvent>) {
        self.tracker.stage(ChangeKind::Added, product, events);
    }

    fn update(&self, product: Product, events: Vec<DomainEvent>) {
        self.tracker.stage(ChangeKind::Updated, product, events);
    }

    fn remove(&self, product: Product, events: Vec<DomainEvent>) {
        self.tracker.stage(ChangeKind::Removed, product, events);
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let mut models = ProductEntity::find_by_id(id)
            .limit(2)
            .all(&self.db)
            .await?;

        if models.len() > 1 {
            return Err(AppError::AmbiguousIdentity(format!(
                "more than one product with id {}",
                id
            )));
        }

        Ok(models.pop().map(Product::from))
    }

    async fn get_all(&self) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn search(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(search_condition(filter))
            .order_by_asc(product::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Product::from).collect())
    }
}

/// Applies staged product changes inside a single transaction.
pub struct ProductCommitStore {
    db: DatabaseConnection,
}

impl ProductCommitStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommitStore<Product> for ProductCommitStore {
    async fn commit(&self, changes: &[Change<Product>]) -> AppResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        // Dropped without commit() on any early return, which rolls back
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
                // A row already gone (concurrent delete) persists nothing
                ChangeKind::Removed => {
                    ProductEntity::delete_by_id(change.entity.id)
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
