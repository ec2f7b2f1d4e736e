//! Product Service Library
//!
//! HTTP API for the product catalogue. Products are owned by users of the
//! user service, which is called over HTTP to enrich a product with its owner.
//! It can be run as a standalone service or embedded in the combined binary.

pub mod application;
pub mod clients;
pub mod config;
pub mod handlers;
pub mod infra;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use common::auth::TokenProvider;
use common::db::run_migration_action;
use common::{EventPublisher, LoggingSubscriber};

use crate::clients::HttpUserClient;
use crate::config::ProductServiceConfig;
use crate::infra::{Database, Migrator};
use crate::repository::SeaProductPersistence;
use crate::state::AppState;

pub use common::db::MigrateAction;
pub use routes::build_app;

/// Run the product service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = ProductServiceConfig::from_env();
    run_server_with_config(host, port, config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = ProductServiceConfig::from_env();
    run_migration_action::<Migrator>(&config.database_url, action).await?;
    Ok(())
}

/// Run the HTTP server with the given configuration.
pub async fn run_server_with_config(
    host: &str,
    port: u16,
    config: ProductServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    config.jwt.validate()?;

    let db = Database::connect(&config.database_url).await?;
    let publisher = EventPublisher::new(vec![Arc::new(LoggingSubscriber)]);
    info!(subscribers = publisher.subscriber_count(), "Domain event publisher ready");

    let state = AppState::new(
        Arc::new(SeaProductPersistence::new(db.get_connection(), publisher)),
        Arc::new(HttpUserClient::new(&config.user_service_url)),
        Arc::new(TokenProvider::new(config.jwt.clone())),
    );
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(user_service = %config.user_service_url, "Product service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
