//! Domain events raised by entity mutations.
//!
//! Mutating operations return the events they raise instead of stashing them
//! on the entity, so the unit of work receives them alongside the staged change.

use serde::Serialize;
use uuid::Uuid;

/// A fact recorded during a mutation, published only after a durable commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    ProductCreated { product_id: Uuid, user_id: Uuid },
    ProductUpdated { product_id: Uuid },
    ProductRemoved { product_id: Uuid },
    UserCreated { user_id: Uuid, email: String },
    UserUpdated { user_id: Uuid },
    UserRemoved { user_id: Uuid },
}

impl DomainEvent {
    /// Stable event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ProductCreated { .. } => "product_created",
            DomainEvent::ProductUpdated { .. } => "product_updated",
            DomainEvent::ProductRemoved { .. } => "product_removed",
            DomainEvent::UserCreated { .. } => "user_created",
            DomainEvent::UserUpdated { .. } => "user_updated",
            DomainEvent::UserRemoved { .. } => "user_removed",
        }
    }

    /// Identity of the entity the event is about.
    pub fn entity_id(&self) -> Uuid {
        match self {
            DomainEvent::ProductCreated { product_id, .. }
            | DomainEvent::ProductUpdated { product_id }
            | DomainEvent::ProductRemoved { product_id } => *product_id,
            DomainEvent::UserCreated { user_id, .. }
            | DomainEvent::UserUpdated { user_id }
            | DomainEvent::UserRemoved { user_id } => *user_id,
        }
    }
}
