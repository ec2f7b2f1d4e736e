//! User Service Library
//!
//! HTTP API for user registration, profiles and login. Issues the access
//! tokens the product service validates.
//! It can be run as a standalone service or embedded in the combined binary.

pub mod application;
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

use crate::config::UserServiceConfig;
use crate::infra::{Database, Migrator};
use crate::repository::SeaUserPersistence;
use crate::state::AppState;

pub use common::db::MigrateAction;
pub use routes::build_app;

/// Run the user service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    run_server_with_config(host, port, config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    run_migration_action::<Migrator>(&config.database_url, action).await?;
    Ok(())
}

/// Run the HTTP server with the given configuration.
pub async fn run_server_with_config(
    host: &str,
    port: u16,
    config: UserServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    config.jwt.validate()?;

    let db = Database::connect(&config.database_url).await?;
    let publisher = EventPublisher::new(vec![Arc::new(LoggingSubscriber)]);
    info!(subscribers = publisher.subscriber_count(), "Domain event publisher ready");

    let state = AppState::new(
        Arc::new(SeaUserPersistence::new(db.get_connection(), publisher)),
        Arc::new(TokenProvider::new(config.jwt.clone())),
    );
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("User service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
