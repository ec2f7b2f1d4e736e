//! Common building blocks shared by the product and user services.
//!
//! This crate provides:
//! - Unified error handling and its HTTP mapping
//! - Request extractors (validated JSON, UUID path)
//! - Configuration helpers
//! - The request dispatcher (mediator)
//! - Change tracking, unit of work and post-commit event publication
//! - The database connection wrapper and migration runner (feature `database`)
//! - JWT token handling and the authentication middleware (feature `jwt`)

#[cfg(feature = "jwt")]
pub mod auth;
pub mod config;
#[cfg(feature = "database")]
pub mod db;
pub mod error;
pub mod events;
pub mod extract;
pub mod mediator;
pub mod unit_of_work;

pub use config::*;
pub use error::{panic_response, AppError, AppResult};
pub use events::{EventPublisher, EventSubscriber, LoggingSubscriber};
pub use extract::{UuidPath, ValidatedJson};
pub use mediator::{Mediator, Request, RequestHandler};
pub use unit_of_work::{
    Change, ChangeKind, ChangeTracker, CommitStore, TrackedUnitOfWork, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
