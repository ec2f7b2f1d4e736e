//! Commands, queries and the handler table the mediator dispatches to.

mod commands;
mod queries;

use std::sync::Arc;

use common::{handler_table, Mediator};

use crate::clients::UserDirectory;
use crate::repository::ProductScope;

pub use commands::{
    CreateProductCommand, CreateProductHandler, DeleteProductCommand, DeleteProductHandler,
    UpdateProductCommand, UpdateProductHandler,
};
pub use queries::{
    GetAllProductsHandler, GetAllProductsQuery, GetProductHandler, GetProductQuery,
    GetProductWithUserHandler, GetProductWithUserQuery, SearchProductsHandler,
    SearchProductsQuery, NO_PRODUCTS_MESSAGE,
};

/// One handler per product request type.
pub struct ProductHandlers {
    create: CreateProductHandler,
    update: UpdateProductHandler,
    delete: DeleteProductHandler,
    get: GetProductHandler,
    get_all: GetAllProductsHandler,
    search: SearchProductsHandler,
    get_with_user: GetProductWithUserHandler,
}

impl ProductHandlers {
    /// Wire every handler to the same request scope.
    pub fn new(scope: ProductScope, users: Arc<dyn UserDirectory>) -> Self {
        let ProductScope {
            products,
            unit_of_work,
        } = scope;

        Self {
            create: CreateProductHandler::new(products.clone(), unit_of_work.clone()),
            update: UpdateProductHandler::new(products.clone(), unit_of_work.clone()),
            delete: DeleteProductHandler::new(products.clone(), unit_of_work),
            get: GetProductHandler::new(products.clone()),
            get_all: GetAllProductsHandler::new(products.clone()),
            search: SearchProductsHandler::new(products.clone()),
            get_with_user: GetProductWithUserHandler::new(products, users),
        }
    }
}

handler_table!(ProductHandlers {
    CreateProductCommand => create,
    UpdateProductCommand => update,
    DeleteProductCommand => delete,
    GetProductQuery => get,
    GetAllProductsQuery => get_all,
    SearchProductsQuery => search,
    GetProductWithUserQuery => get_with_user,
});

/// Mediator over the product handler table.
pub type ProductMediator = Mediator<ProductHandlers>;
