//! User queries.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppError, AppResult, Request, RequestHandler};
use domain::UserResponse;

use crate::repository::UserRepository;

#[derive(Debug, Clone, Copy)]
pub struct GetUserQuery {
    pub id: Uuid,
}

impl Request for GetUserQuery {
    type Response = UserResponse;
}

#[derive(Debug, Clone)]
pub struct GetUserByEmailQuery {
    pub email: String,
}

impl Request for GetUserByEmailQuery {
    type Response = UserResponse;
}

pub struct GetUserHandler {
    users: Arc<dyn UserRepository>,
}

impl GetUserHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl RequestHandler<GetUserQuery> for GetUserHandler {
    async fn handle(&self, query: GetUserQuery) -> AppResult<UserResponse> {
        self.users
            .get_by_id(query.id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User", query.id))
    }
}

pub struct GetUserByEmailHandler {
    users: Arc<dyn UserRepository>,
}

impl GetUserByEmailHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl RequestHandler<GetUserByEmailQuery> for GetUserByEmailHandler {
    async fn handle(&self, query: GetUserByEmailQuery) -> AppResult<UserResponse> {
        self.users
            .get_by_email(&query.email)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::email_not_found(&query.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use domain::User;

    #[tokio::test]
    async fn test_get_by_email_projects_without_hash() {
        let (user, _) = User::create(
            "Jane Doe".to_string(),
            "jane".to_string(),
            "jane@example.com".to_string(),
            "hash".to_string(),
        );
        let expected = UserResponse::from(&user);
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let handler = GetUserByEmailHandler::new(Arc::new(repo));
        let response = handler
            .handle(GetUserByEmailQuery {
                email: "jane@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response, expected);
    }

    #[tokio::test]
    async fn test_missing_user_messages() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_get_by_email().returning(|_| Ok(None));
        let repo: Arc<dyn UserRepository> = Arc::new(repo);
        let id = Uuid::new_v4();

        let by_id = GetUserHandler::new(repo.clone())
            .handle(GetUserQuery { id })
            .await
            .unwrap_err();
        let by_email = GetUserByEmailHandler::new(repo)
            .handle(GetUserByEmailQuery {
                email: "ghost@example.com".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(by_id.to_string(), format!("User with id {} was not found.", id));
        assert_eq!(by_email.to_string(), "User with email ghost@example.com was not found.");
    }
}
