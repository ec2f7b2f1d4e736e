//! Product commands.
//!
//! Write handlers load the target, check existence first and ownership
//! second, mutate, stage, then commit through the unit of work. The existence
//! check runs before the ownership check, so a non-owner can still learn that
//! an id exists.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, Request, RequestHandler, UnitOfWork};
use domain::{Product, ProductDetails};

use crate::repository::ProductRepository;

/// Create a product owned by `user_id`. Responds with the new id.
#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub user_id: Uuid,
    pub details: ProductDetails,
}

impl Request for CreateProductCommand {
    type Response = Uuid;
}

/// Replace all mutable fields of product `id`, on behalf of `user_id`.
#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub id: Uuid,
    pub user_id: Uuid,
    pub details: ProductDetails,
}

impl Request for UpdateProductCommand {
    type Response = ();
}

/// Delete product `id`, on behalf of `user_id`.
#[derive(Debug, Clone)]
pub struct DeleteProductCommand {
    pub id: Uuid,
    pub user_id: Uuid,
}

impl Request for DeleteProductCommand {
    type Response = ();
}

/// Load `id` and make sure `user_id` owns it.
async fn load_owned(
    products: &dyn ProductRepository,
    id: Uuid,
    user_id: Uuid,
) -> AppResult<Product> {
    let product = products
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    if !product.is_owned_by(user_id) {
        return Err(AppError::OwnershipDenied);
    }
    Ok(product)
}

pub struct CreateProductHandler {
    products: Arc<dyn ProductRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl CreateProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            products,
            unit_of_work,
        }
    }
}

#[async_trait]
impl RequestHandler<CreateProductCommand> for CreateProductHandler {
    async fn handle(&self, command: CreateProductCommand) -> AppResult<Uuid> {
        let (product, event) = Product::create(command.details, command.user_id);
        let id = product.id;

        self.products.add(product, vec![event]);
        self.unit_of_work.save_changes().await?;

        info!(product_id = %id, user_id = %command.user_id, "Product created");
        Ok(id)
    }
}

pub struct UpdateProductHandler {
    products: Arc<dyn ProductRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl UpdateProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            products,
            unit_of_work,
        }
    }
}

#[async_trait]
impl RequestHandler<UpdateProductCommand> for UpdateProductHandler {
    async fn handle(&self, command: UpdateProductCommand) -> AppResult<()> {
        let mut product = load_owned(self.products.as_ref(), command.id, command.user_id).await?;

        let event = product.update(command.details);
        self.products.update(product, vec![event]);
        self.unit_of_work.save_changes().await?;

        info!(product_id = %command.id, "Product updated");
        Ok(())
    }
}

pub struct DeleteProductHandler {
    products: Arc<dyn ProductRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl DeleteProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            products,
            unit_of_work,
        }
    }
}

#[async_trait]
impl RequestHandler<DeleteProductCommand> for DeleteProductHandler {
    async fn handle(&self, command: DeleteProductCommand) -> AppResult<()> {
        let product = load_owned(self.products.as_ref(), command.id, command.user_id).await?;

        let event = product.removed();
        self.products.remove(product, vec![event]);
        self.unit_of_work.save_changes().await?;

        info!(product_id = %command.id, "Product deleted");
        Ok(())
    }
}
