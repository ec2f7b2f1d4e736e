//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::health_handler::HealthResponse;
use crate::handlers::product_handler::{CreatedResponse, ProductRequest};
use domain::{ProductFilter, ProductResponse, ProductWithUserResponse, UserResponse};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::product_handler::create_product,
        crate::handlers::product_handler::search_products,
        crate::handlers::product_handler::get_all_products,
        crate::handlers::product_handler::get_product,
        crate::handlers::product_handler::get_product_with_user,
        crate::handlers::product_handler::update_product,
        crate::handlers::product_handler::delete_product,
        crate::handlers::health_handler::health_check,
    ),
    components(
        schemas(
            ProductRequest,
            CreatedResponse,
            ProductFilter,
            ProductResponse,
            ProductWithUserResponse,
            UserResponse,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Products", description = "Product catalogue endpoints"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
