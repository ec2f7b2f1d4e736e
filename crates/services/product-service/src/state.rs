//! Application state for dependency injection.

use std::sync::Arc;

use common::auth::TokenProvider;
use common::Mediator;

use crate::application::{ProductHandlers, ProductMediator};
use crate::clients::UserDirectory;
use crate::repository::ProductPersistence;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<dyn ProductPersistence>,
    pub users: Arc<dyn UserDirectory>,
    pub tokens: Arc<TokenProvider>,
}

impl AppState {
    pub fn new(
        persistence: Arc<dyn ProductPersistence>,
        users: Arc<dyn UserDirectory>,
        tokens: Arc<TokenProvider>,
    ) -> Self {
        Self {
            persistence,
            users,
            tokens,
        }
    }

    /// Mediator over handlers bound to a fresh request scope.
    ///
    /// Which handler serves which request is fixed at compile time by the
    /// handler table. Only the handler instances are built per call, so each
    /// request stages its writes in its own change tracker and concurrent
    /// requests never see each other's uncommitted products.
    pub fn mediator(&self) -> ProductMediator {
        Mediator::new(ProductHandlers::new(
            self.persistence.scope(),
            self.users.clone(),
        ))
    }
}
