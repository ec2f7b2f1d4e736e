//! Request dispatcher.
//!
//! Every command and query is its own type implementing [`Request`]. A service
//! declares one handler table (a plain struct holding one handler per request
//! type) and wires it with [`handler_table!`](crate::handler_table). Routing is
//! resolved by trait selection, so sending a request type without a registered
//! handler does not compile.
//!
//! Dispatch is a direct call: handler failures propagate unchanged and there
//! are no retries or timeouts at this layer.

use std::any::type_name;
use std::sync::Arc;

use tracing::Instrument;

pub use async_trait::async_trait;

use crate::error::AppResult;

/// A command or query with its response type.
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

/// Business logic for exactly one request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R) -> AppResult<R::Response>;
}

/// Routes typed requests to the handler table `T`.
pub struct Mediator<T> {
    handlers: Arc<T>,
}

impl<T> Clone for Mediator<T> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<T: Send + Sync> Mediator<T> {
    pub fn new(handlers: T) -> Self {
        Self {
            handlers: Arc::new(handlers),
        }
    }

    /// Dispatch `request` to its handler and return the handler's result as is.
    pub async fn send<R>(&self, request: R) -> AppResult<R::Response>
    where
        R: Request,
        T: RequestHandler<R>,
    {
        let span = tracing::debug_span!("dispatch", request = request_name::<R>());
        self.handlers.handle(request).instrument(span).await
    }
}

fn request_name<R>() -> &'static str {
    type_name::<R>().rsplit("::").next().unwrap_or_default()
}

/// Implement [`RequestHandler`] on a handler table by delegating each request
/// type to the field holding its handler.
///
/// ```ignore
/// handler_table!(ProductHandlers {
///     CreateProductCommand => create,
///     GetProductQuery => get,
/// });
/// ```
#[macro_export]
macro_rules! handler_table {
    ($table:ty { $($request:ty => $field:ident),+ $(,)? }) => {
        $(
            #[$crate::mediator::async_trait]
            impl $crate::mediator::RequestHandler<$request> for $table {
                async fn handle(
                    &self,
                    request: $request,
                ) -> $crate::AppResult<<$request as $crate::mediator::Request>::Response> {
                    $crate::mediator::RequestHandler::<$request>::handle(&self.$field, request).await
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tokio_test::{assert_err, assert_ok};

    struct Ping(u32);
    impl Request for Ping {
        type Response = u32;
    }

    struct Fail;
    impl Request for Fail {
        type Response = ();
    }

    struct PingHandler;

    #[async_trait]
    impl RequestHandler<Ping> for PingHandler {
        async fn handle(&self, request: Ping) -> AppResult<u32> {
            Ok(request.0 + 1)
        }
    }

    struct FailHandler;

    #[async_trait]
    impl RequestHandler<Fail> for FailHandler {
        async fn handle(&self, _request: Fail) -> AppResult<()> {
            Err(AppError::not_found("Thing", uuid::Uuid::nil()))
        }
    }

    struct Handlers {
        ping: PingHandler,
        fail: FailHandler,
    }

    crate::handler_table!(Handlers {
        Ping => ping,
        Fail => fail,
    });

    fn mediator() -> Mediator<Handlers> {
        Mediator::new(Handlers {
            ping: PingHandler,
            fail: FailHandler,
        })
    }

    #[tokio::test]
    async fn test_routes_to_registered_handler() {
        let result = assert_ok!(mediator().send(Ping(41)).await);
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn test_handler_failure_propagates_unchanged() {
        let err = assert_err!(mediator().send(Fail).await);
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains("Thing")));
    }

    #[test]
    fn test_request_name_is_short() {
        assert_eq!(request_name::<Ping>(), "Ping");
    }
}
