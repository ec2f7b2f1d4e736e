//! Repository layer for data access.

pub mod entities;
mod persistence;
mod user_repository;

pub use persistence::{SeaUserPersistence, UserPersistence, UserScope};
pub use user_repository::{UserCommitStore, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
