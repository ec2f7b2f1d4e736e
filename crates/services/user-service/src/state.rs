//! Application state for dependency injection.

use std::sync::Arc;

use common::auth::TokenProvider;
use common::Mediator;

use crate::application::{UserHandlers, UserMediator};
use crate::repository::UserPersistence;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<dyn UserPersistence>,
    pub tokens: Arc<TokenProvider>,
}

impl AppState {
    pub fn new(persistence: Arc<dyn UserPersistence>, tokens: Arc<TokenProvider>) -> Self {
        Self {
            persistence,
            tokens,
        }
    }

    /// Mediator over handlers bound to a fresh request scope.
    ///
    /// Which handler serves which request is fixed at compile time by the
    /// handler table. Only the handler instances are built per call, so each
    /// request stages its writes in its own change tracker and concurrent
    /// requests never see each other's uncommitted users.
    pub fn mediator(&self) -> UserMediator {
        Mediator::new(UserHandlers::new(
            self.persistence.scope(),
            self.tokens.clone(),
        ))
    }
}
