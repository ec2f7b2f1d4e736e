//! Clients for other services.

mod user_client;

pub use user_client::{HttpUserClient, UserDirectory};

#[cfg(any(test, feature = "test-utils"))]
pub use user_client::MockUserDirectory;
