//! Product queries. Reads never check the caller's identity.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppError, AppResult, Request, RequestHandler};
use domain::{ProductFilter, ProductResponse, ProductWithUserResponse};

use crate::clients::UserDirectory;
use crate::repository::ProductRepository;

/// Message carried by `EmptyResult` when a listing matched nothing.
pub const NO_PRODUCTS_MESSAGE: &str = "No products listed.";

#[derive(Debug, Clone, Copy)]
pub struct GetProductQuery {
    pub id: Uuid,
}

impl Request for GetProductQuery {
    type Response = ProductResponse;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetAllProductsQuery;

impl Request for GetAllProductsQuery {
    type Response = Vec<ProductResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct SearchProductsQuery {
    pub filter: ProductFilter,
}

impl Request for SearchProductsQuery {
    type Response = Vec<ProductResponse>;
}

/// Product enriched with its owner from the user service.
#[derive(Debug, Clone, Copy)]
pub struct GetProductWithUserQuery {
    pub id: Uuid,
}

impl Request for GetProductWithUserQuery {
    type Response = ProductWithUserResponse;
}

fn non_empty(products: Vec<domain::Product>) -> AppResult<Vec<ProductResponse>> {
    if products.is_empty() {
        return Err(AppError::empty_result(NO_PRODUCTS_MESSAGE));
    }
    Ok(products.into_iter().map(ProductResponse::from).collect())
}

pub struct GetProductHandler {
    products: Arc<dyn ProductRepository>,
}

impl GetProductHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl RequestHandler<GetProductQuery> for GetProductHandler {
    async fn handle(&self, query: GetProductQuery) -> AppResult<ProductResponse> {
        self.products
            .get_by_id(query.id)
            .await?
            .map(ProductResponse::from)
            .ok_or_else(|| AppError::not_found("Product", query.id))
    }
}

pub struct GetAllProductsHandler {
    products: Arc<dyn ProductRepository>,
}

impl GetAllProductsHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl RequestHandler<GetAllProductsQuery> for GetAllProductsHandler {
    async fn handle(&self, _query: GetAllProductsQuery) -> AppResult<Vec<ProductResponse>> {
        non_empty(self.products.get_all().await?)
    }
}

pub struct SearchProductsHandler {
    products: Arc<dyn ProductRepository>,
}

impl SearchProductsHandler {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl RequestHandler<SearchProductsQuery> for SearchProductsHandler {
    async fn handle(&self, query: SearchProductsQuery) -> AppResult<Vec<ProductResponse>> {
        non_empty(self.products.search(&query.filter).await?)
    }
}

/// Local read followed by one call to the user service.
///
/// A user service outage makes this endpoint fail even though the product
/// itself could be served. Remote failures are not caught here.
pub struct GetProductWithUserHandler {
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserDirectory>,
}

impl GetProductWithUserHandler {
    pub fn new(products: Arc<dyn ProductRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { products, users }
    }
}

#[async_trait]
impl RequestHandler<GetProductWithUserQuery> for GetProductWithUserHandler {
    async fn handle(&self, query: GetProductWithUserQuery) -> AppResult<ProductWithUserResponse> {
        let product = self
            .products
            .get_by_id(query.id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", query.id))?;

        let owner = self.users.get_user(product.user_id).await?;
        Ok(ProductWithUserResponse::compose(product, owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockUserDirectory;
    use crate::repository::MockProductRepository;
    use domain::{Product, ProductDetails, UserResponse};
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn product(name: &str, owner: Uuid) -> Product {
        Product::create(
            ProductDetails {
                name: name.to_string(),
                description: "desc".to_string(),
                price: 9.99,
                quantity: 3,
            },
            owner,
        )
        .0
    }

    fn owner(id: Uuid) -> UserResponse {
        UserResponse {
            id,
            name: "Jane".to_string(),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_returns_projection() {
        let item = product("Widget", Uuid::new_v4());
        let expected = ProductResponse::from(&item);
        let id = item.id;
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(item.clone())));

        let handler = GetProductHandler::new(Arc::new(repo));
        let response = assert_ok!(handler.handle(GetProductQuery { id }).await);
        assert_eq!(response, expected);
    }

    #[tokio::test]
    async fn test_get_all_empty_is_empty_result() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_all().returning(|| Ok(vec![]));

        let handler = GetAllProductsHandler::new(Arc::new(repo));
        let err = assert_err!(handler.handle(GetAllProductsQuery).await);
        assert!(matches!(err, AppError::EmptyResult(msg) if msg == NO_PRODUCTS_MESSAGE));
    }

    #[tokio::test]
    async fn test_search_passes_filter_and_projects() {
        let owner_id = Uuid::new_v4();
        let found = vec![product("Widget", owner_id), product("Widgetino", owner_id)];
        let filter = ProductFilter {
            name: Some("Widget".to_string()),
            max_price: Some(0.0),
            ..Default::default()
        };
        let expected_filter = filter.clone();
        let mut repo = MockProductRepository::new();
        repo.expect_search()
            .withf(move |f| *f == expected_filter)
            .times(1)
            .returning(move |_| Ok(found.clone()));

        let handler = SearchProductsHandler::new(Arc::new(repo));
        let response = assert_ok!(handler.handle(SearchProductsQuery { filter }).await);
        assert_eq!(response.len(), 2);
        assert!(response.iter().all(|p| p.user_id == owner_id));
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty_result() {
        let mut repo = MockProductRepository::new();
        repo.expect_search().returning(|_| Ok(vec![]));

        let handler = SearchProductsHandler::new(Arc::new(repo));
        let err = assert_err!(handler.handle(SearchProductsQuery::default()).await);
        assert!(matches!(err, AppError::EmptyResult(_)));
    }

    #[tokio::test]
    async fn test_with_user_composes_owner() {
        let owner_id = Uuid::new_v4();
        let item = product("Widget", owner_id);
        let id = item.id;
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        let mut users = MockUserDirectory::new();
        users
            .expect_get_user()
            .with(eq(owner_id))
            .times(1)
            .returning(|id| Ok(owner(id)));

        let handler = GetProductWithUserHandler::new(Arc::new(repo), Arc::new(users));
        let response = assert_ok!(handler.handle(GetProductWithUserQuery { id }).await);
        assert_eq!(response.id, id);
        assert_eq!(response.user, owner(owner_id));
    }

    #[tokio::test]
    async fn test_with_user_missing_product_skips_remote_call() {
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        let mut users = MockUserDirectory::new();
        users.expect_get_user().never();

        let handler = GetProductWithUserHandler::new(Arc::new(repo), Arc::new(users));
        let err = assert_err!(
            handler
                .handle(GetProductWithUserQuery { id: Uuid::new_v4() })
                .await
        );
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_with_user_remote_failure_propagates() {
        let item = product("Widget", Uuid::new_v4());
        let id = item.id;
        let mut repo = MockProductRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(item.clone())));
        let mut users = MockUserDirectory::new();
        users
            .expect_get_user()
            .returning(|_| Err(AppError::remote("503 Service Unavailable")));

        let handler = GetProductWithUserHandler::new(Arc::new(repo), Arc::new(users));
        let err = assert_err!(handler.handle(GetProductWithUserQuery { id }).await);
        assert!(matches!(err, AppError::RemoteAggregation(_)));
    }
}
