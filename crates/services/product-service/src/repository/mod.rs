//! Repository layer for data access.

pub mod entities;
mod persistence;
mod product_repository;

pub use persistence::{ProductPersistence, ProductScope, SeaProductPersistence};
pub use product_repository::{ProductCommitStore, ProductRepository, ProductStore};

#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
