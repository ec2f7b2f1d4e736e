//! Product handlers.
//!
//! Each handler turns the HTTP request into one command or query and sends it
//! through a mediator bound to a fresh request scope.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::auth::{auth_middleware, CurrentUser};
use common::{AppResult, UuidPath, ValidatedJson};
use domain::{ProductDetails, ProductFilter, ProductResponse, ProductWithUserResponse};

use crate::application::{
    CreateProductCommand, DeleteProductCommand, GetAllProductsQuery, GetProductQuery,
    GetProductWithUserQuery, SearchProductsQuery, UpdateProductCommand,
};
use crate::state::AppState;

/// Product create/update request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    #[schema(example = "Widget")]
    pub name: String,
    #[validate(length(max = 1023, message = "Description must be at most 1023 characters"))]
    #[serde(default)]
    #[schema(example = "A very useful widget")]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    #[schema(example = 9.99)]
    pub price: f64,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    #[schema(example = 3)]
    pub quantity: i32,
}

impl From<ProductRequest> for ProductDetails {
    fn from(request: ProductRequest) -> Self {
        ProductDetails {
            name: request.name,
            description: request.description,
            price: request.price,
            quantity: request.quantity,
        }
    }
}

/// Identity of a newly created product
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Create product routes. Writes require a bearer token, reads do not.
pub fn product_routes(state: &AppState) -> Router<AppState> {
    let auth = middleware::from_fn_with_state(state.tokens.clone(), auth_middleware);

    Router::new()
        .route("/create", post(create_product).route_layer(auth.clone()))
        .route("/search", post(search_products))
        .route("/getall", get(get_all_products))
        .route(
            "/:id",
            get(get_product).merge(
                put(update_product)
                    .delete(delete_product)
                    .route_layer(auth),
            ),
        )
        .route("/:id/with-user", get(get_product_with_user))
}

/// Create a product owned by the caller
#[utoipa::path(
    post,
    path = "/products/create",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product created", body = CreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<Json<CreatedResponse>> {
    let id = state
        .mediator()
        .send(CreateProductCommand {
            user_id: user.id,
            details: payload.into(),
        })
        .await?;
    Ok(Json(CreatedResponse { id }))
}

/// Search products
///
/// A `maxPrice` or `maxQuantity` of 0 leaves that upper bound unset.
#[utoipa::path(
    post,
    path = "/products/search",
    tag = "Products",
    request_body = ProductFilter,
    responses(
        (status = 200, description = "Matching products", body = Vec<ProductResponse>),
        (status = 404, description = "No products matched")
    )
)]
pub async fn search_products(
    State(state): State<AppState>,
    Json(filter): Json<ProductFilter>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state.mediator().send(SearchProductsQuery { filter }).await?;
    Ok(Json(products))
}

/// List all products
#[utoipa::path(
    get,
    path = "/products/getall",
    tag = "Products",
    responses(
        (status = 200, description = "All products", body = Vec<ProductResponse>),
        (status = 404, description = "No products listed")
    )
)]
pub async fn get_all_products(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state.mediator().send(GetAllProductsQuery).await?;
    Ok(Json(products))
}

/// Get product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> AppResult<Json<ProductResponse>> {
    let product = state.mediator().send(GetProductQuery { id }).await?;
    Ok(Json(product))
}

/// Get product by ID together with its owner
#[utoipa::path(
    get,
    path = "/products/{id}/with-user",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with owner", body = ProductWithUserResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "User service unavailable")
    )
)]
pub async fn get_product_with_user(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> AppResult<Json<ProductWithUserResponse>> {
    let product = state.mediator().send(GetProductWithUserQuery { id }).await?;
    Ok(Json(product))
}

/// Replace a product (owner only)
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ProductRequest,
    responses(
        (status = 204, description = "Product updated"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the product"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<StatusCode> {
    state
        .mediator()
        .send(UpdateProductCommand {
            id,
            user_id: user.id,
            details: payload.into(),
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a product (owner only)
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller does not own the product"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> AppResult<StatusCode> {
    state
        .mediator()
        .send(DeleteProductCommand {
            id,
            user_id: user.id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
