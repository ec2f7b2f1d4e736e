//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::DomainEvent;

/// User domain entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl User {
    /// Create a user with a freshly generated identity.
    pub fn create(
        name: String,
        username: String,
        email: String,
        password_hash: String,
    ) -> (Self, DomainEvent) {
        let user = Self {
            id: Uuid::new_v4(),
            name,
            username,
            email,
            password_hash,
        };
        let event = DomainEvent::UserCreated {
            user_id: user.id,
            email: user.email.clone(),
        };
        (user, event)
    }

    /// Replace all mutable fields.
    ///
    /// `password_hash` of `None` keeps the current hash.
    pub fn update(
        &mut self,
        name: String,
        username: String,
        email: String,
        password_hash: Option<String>,
    ) -> DomainEvent {
        self.name = name;
        self.username = username;
        self.email = email;
        if let Some(hash) = password_hash {
            self.password_hash = hash;
        }
        DomainEvent::UserUpdated { user_id: self.id }
    }

    /// Event raised when the user is staged for removal.
    pub fn removed(&self) -> DomainEvent {
        DomainEvent::UserRemoved { user_id: self.id }
    }
}

/// User response (safe to return to client, never carries the hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Login handle
    pub username: String,
    /// Email address
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::create(
            "Jane Doe".to_string(),
            "jane".to_string(),
            "jane@example.com".to_string(),
            "old-hash".to_string(),
        )
        .0
    }

    #[test]
    fn test_update_without_password_keeps_hash() {
        let mut user = user();
        let id = user.id;

        let event = user.update(
            "Janet".to_string(),
            "janet".to_string(),
            "janet@example.com".to_string(),
            None,
        );

        assert_eq!(user.id, id);
        assert_eq!(user.name, "Janet");
        assert_eq!(user.username, "janet");
        assert_eq!(user.email, "janet@example.com");
        assert_eq!(user.password_hash, "old-hash");
        assert_eq!(event, DomainEvent::UserUpdated { user_id: id });
    }

    #[test]
    fn test_update_with_password_replaces_hash() {
        let mut user = user();
        user.update(
            "Jane".to_string(),
            "jane".to_string(),
            "jane@example.com".to_string(),
            Some("new-hash".to_string()),
        );
        assert_eq!(user.password_hash, "new-hash");
    }

    #[test]
    fn test_response_omits_password_hash() {
        let json = serde_json::to_value(UserResponse::from(user())).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["username"], "jane");
    }
}
