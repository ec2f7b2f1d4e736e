//! Post-commit domain event publication.
//!
//! The subscriber list is fixed when the publisher is built. Delivery is
//! in-process and sequential: every subscriber sees every event, in the order
//! the unit of work hands them over. A failing subscriber does not stop the
//! others, and nothing here can undo the commit that produced the event.

use std::sync::Arc;

use async_trait::async_trait;
use domain::DomainEvent;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Something interested in committed domain events.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &DomainEvent) -> AppResult<()>;
}

/// Fans events out to the registered subscribers.
#[derive(Clone, Default)]
pub struct EventPublisher {
    subscribers: Arc<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventPublisher {
    pub fn new(subscribers: Vec<Arc<dyn EventSubscriber>>) -> Self {
        Self {
            subscribers: Arc::new(subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every subscriber.
    ///
    /// Returns the first failure after all subscribers have been tried.
    pub async fn publish(&self, event: &DomainEvent) -> AppResult<()> {
        let mut first_failure: Option<AppError> = None;

        for subscriber in self.subscribers.iter() {
            if let Err(e) = subscriber.handle(event).await {
                warn!(
                    subscriber = subscriber.name(),
                    event = event.name(),
                    error = %e,
                    "Event subscriber failed"
                );
                first_failure.get_or_insert(e);
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Records every published event in the service log.
pub struct LoggingSubscriber;

#[async_trait]
impl EventSubscriber for LoggingSubscriber {
    fn name(&self) -> &'static str {
        "logging"
    }

    async fn handle(&self, event: &DomainEvent) -> AppResult<()> {
        info!(event = event.name(), entity_id = %event.entity_id(), "Domain event published");
        Ok(())
    }
}
