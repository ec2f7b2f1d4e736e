//! Combined binary for development - runs both services in one process.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use product_service_lib::config::ProductServiceConfig;
use user_service_lib::config::UserServiceConfig;
use user_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "innoshop")]
#[command(about = "Combined product and user services for development")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both services in a single process (development mode)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value = "5000")]
        user_port: u16,
        #[arg(long, default_value = "8080")]
        product_port: u16,
    },
    /// Run database migrations for both services
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

impl From<MigrateCommands> for MigrateAction {
    fn from(command: MigrateCommands) -> Self {
        match command {
            MigrateCommands::Up => MigrateAction::Up,
            MigrateCommands::Down => MigrateAction::Down,
            MigrateCommands::Status => MigrateAction::Status,
            MigrateCommands::Fresh => MigrateAction::Fresh,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            user_port,
            product_port,
        } => {
            // Products enrich against the in-process user service unless pointed elsewhere
            let mut product_config = ProductServiceConfig::from_env();
            if std::env::var("USER_SERVICE_URL").is_err() {
                product_config.user_service_url = format!("http://127.0.0.1:{}", user_port);
            }

            info!("Starting combined services in development mode");
            info!("  User service:    http://{}:{}", host, user_port);
            info!("  Product service: http://{}:{}", host, product_port);
            info!("  Products resolve owners via {}", product_config.user_service_url);

            let user_host = host.clone();
            let user_handle = tokio::spawn(async move {
                let config = UserServiceConfig::from_env();
                if let Err(e) =
                    user_service_lib::run_server_with_config(&user_host, user_port, config).await
                {
                    error!("User service failed: {}", e);
                }
            });

            let product_host = host.clone();
            let product_handle = tokio::spawn(async move {
                if let Err(e) = product_service_lib::run_server_with_config(
                    &product_host,
                    product_port,
                    product_config,
                )
                .await
                {
                    error!("Product service failed: {}", e);
                }
            });

            // Either service exiting means something went wrong
            tokio::select! {
                _ = user_handle => {
                    error!("User service exited unexpectedly");
                }
                _ = product_handle => {
                    error!("Product service exited unexpectedly");
                }
            }
        }
        Commands::Migrate { action } => {
            user_service_lib::run_migrations(action.into()).await?;
            product_service_lib::run_migrations(action.into()).await?;
        }
    }

    Ok(())
}
