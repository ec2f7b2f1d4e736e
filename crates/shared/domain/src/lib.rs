//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Both the product and the user service share these types; the user projection
//! doubles as the wire contract of the cross-service aggregation call.

pub mod constants;
pub mod error;
pub mod events;
pub mod password;
pub mod product;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use events::DomainEvent;
pub use password::Password;
pub use product::{Product, ProductDetails, ProductFilter, ProductResponse, ProductWithUserResponse};
pub use user::{User, UserResponse};
