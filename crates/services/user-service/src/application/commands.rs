//! User commands.
//!
//! Hashing and verification are CPU-bound Argon2 work and run on the blocking
//! pool so they never stall a runtime worker.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use common::auth::TokenProvider;
use common::{AppError, AppResult, Request, RequestHandler, UnitOfWork};
use domain::{Password, User};

use crate::repository::UserRepository;

/// Register a user. Responds with the new id.
#[derive(Clone)]
pub struct CreateUserCommand {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Request for CreateUserCommand {
    type Response = Uuid;
}

/// Replace the profile of user `id`.
///
/// An empty or absent `password` keeps the current hash.
#[derive(Clone)]
pub struct UpdateUserCommand {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: Option<String>,
}

impl Request for UpdateUserCommand {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteUserCommand {
    pub id: Uuid,
}

impl Request for DeleteUserCommand {
    type Response = ();
}

/// Exchange credentials for a signed access token.
#[derive(Clone)]
pub struct LoginUserCommand {
    pub email: String,
    pub password: String,
}

impl Request for LoginUserCommand {
    type Response = String;
}

async fn hash_password(plain_text: String) -> AppResult<String> {
    let password = tokio::task::spawn_blocking(move || Password::new(&plain_text))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {}", e)))??;
    Ok(password.into_string())
}

async fn verify_password(plain_text: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || Password::from_hash(hash).verify(&plain_text))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {}", e)))
}

async fn load(users: &dyn UserRepository, id: Uuid) -> AppResult<User> {
    users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))
}

pub struct CreateUserHandler {
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl CreateUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            users,
            unit_of_work,
        }
    }
}

#[async_trait]
impl RequestHandler<CreateUserCommand> for CreateUserHandler {
    async fn handle(&self, command: CreateUserCommand) -> AppResult<Uuid> {
        if self.users.get_by_email(&command.email).await?.is_some() {
            return Err(AppError::validation(format!(
                "User with email {} already exists.",
                command.email
            )));
        }

        let hash = hash_password(command.password).await?;
        let (user, event) = User::create(command.name, command.username, command.email, hash);
        let id = user.id;

        self.users.add(user, vec![event]);
        self.unit_of_work.save_changes().await?;

        info!(user_id = %id, "User created");
        Ok(id)
    }
}

pub struct UpdateUserHandler {
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl UpdateUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            users,
            unit_of_work,
        }
    }
}

#[async_trait]
impl RequestHandler<UpdateUserCommand> for UpdateUserHandler {
    async fn handle(&self, command: UpdateUserCommand) -> AppResult<()> {
        let mut user = load(self.users.as_ref(), command.id).await?;

        let new_hash = match command.password.filter(|p| !p.is_empty()) {
            Some(plain_text) => Some(hash_password(plain_text).await?),
            None => None,
        };

        let event = user.update(command.name, command.username, command.email, new_hash);
        self.users.update(user, vec![event]);
        self.unit_of_work.save_changes().await?;

        info!(user_id = %command.id, "User updated");
        Ok(())
    }
}

pub struct DeleteUserHandler {
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl DeleteUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, unit_of_work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            users,
            unit_of_work,
        }
    }
}

#[async_trait]
impl RequestHandler<DeleteUserCommand> for DeleteUserHandler {
    async fn handle(&self, command: DeleteUserCommand) -> AppResult<()> {
        let user = load(self.users.as_ref(), command.id).await?;

        let event = user.removed();
        self.users.remove(user, vec![event]);
        self.unit_of_work.save_changes().await?;

        info!(user_id = %command.id, "User deleted");
        Ok(())
    }
}

/// Unknown email and wrong password fail identically.
pub struct LoginUserHandler {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenProvider>,
}

impl LoginUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenProvider>) -> Self {
        Self { users, tokens }
    }
}

#[async_trait]
impl RequestHandler<LoginUserCommand> for LoginUserHandler {
    async fn handle(&self, command: LoginUserCommand) -> AppResult<String> {
        let LoginUserCommand { email, password } = command;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Err(AppError::InvalidCredentials(email));
        };

        if !verify_password(password, user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials(email));
        }

        self.tokens.issue(user.id, &user.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use common::{JwtConfig, MockUnitOfWork};
    use domain::DomainEvent;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    fn stored_user(password: &str) -> User {
        let hash = Password::new(password).unwrap().into_string();
        User::create(
            "Jane Doe".to_string(),
            "jane".to_string(),
            "jane@example.com".to_string(),
            hash,
        )
        .0
    }

    fn tokens() -> Arc<TokenProvider> {
        Arc::new(TokenProvider::new(JwtConfig {
            secret: "test-secret-key-for-testing-only-32chars".to_string(),
            ..Default::default()
        }))
    }

    fn update_command(id: Uuid, password: Option<&str>) -> UpdateUserCommand {
        UpdateUserCommand {
            id,
            name: "Janet".to_string(),
            username: "janet".to_string(),
            email: "janet@example.com".to_string(),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_commits() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email().returning(|_| Ok(None));
        repo.expect_add()
            .withf(|user, events| {
                user.email == "jane@example.com"
                    && user.password_hash != "secret-password"
                    && Password::from_hash(user.password_hash.clone()).verify("secret-password")
                    && matches!(events.as_slice(), [DomainEvent::UserCreated { .. }])
            })
            .times(1)
            .return_const(());
        let mut uow = MockUnitOfWork::new();
        uow.expect_save_changes().times(1).returning(|| Ok(1));

        let handler = CreateUserHandler::new(Arc::new(repo), Arc::new(uow));
        assert_ok!(
            handler
                .handle(CreateUserCommand {
                    name: "Jane Doe".to_string(),
                    username: "jane".to_string(),
                    email: "jane@example.com".to_string(),
                    password: "secret-password".to_string(),
                })
                .await
        );
    }

    #[tokio::test]
    async fn test_create_rejects_taken_email() {
        let existing = stored_user("secret-password");
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_add().never();

        let handler = CreateUserHandler::new(Arc::new(repo), Arc::new(MockUnitOfWork::new()));
        let err = assert_err!(
            handler
                .handle(CreateUserCommand {
                    name: "Jane Doe".to_string(),
                    username: "jane".to_string(),
                    email: "jane@example.com".to_string(),
                    password: "secret-password".to_string(),
                })
                .await
        );
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_with_empty_password_keeps_hash() {
        let user = stored_user("secret-password");
        let (id, old_hash) = (user.id, user.password_hash.clone());
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update()
            .withf(move |u, _| {
                u.id == id
                    && u.name == "Janet"
                    && u.username == "janet"
                    && u.email == "janet@example.com"
                    && u.password_hash == old_hash
            })
            .times(1)
            .return_const(());
        let mut uow = MockUnitOfWork::new();
        uow.expect_save_changes().times(1).returning(|| Ok(1));

        let handler = UpdateUserHandler::new(Arc::new(repo), Arc::new(uow));
        assert_ok!(handler.handle(update_command(id, Some(""))).await);
    }

    #[tokio::test]
    async fn test_update_with_password_rehashes() {
        let user = stored_user("secret-password");
        let (id, old_hash) = (user.id, user.password_hash.clone());
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_update()
            .withf(move |u, _| {
                u.password_hash != old_hash
                    && Password::from_hash(u.password_hash.clone()).verify("another-password")
            })
            .times(1)
            .return_const(());
        let mut uow = MockUnitOfWork::new();
        uow.expect_save_changes().returning(|| Ok(1));

        let handler = UpdateUserHandler::new(Arc::new(repo), Arc::new(uow));
        assert_ok!(
            handler
                .handle(update_command(id, Some("another-password")))
                .await
        );
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let handler = UpdateUserHandler::new(Arc::new(repo), Arc::new(MockUnitOfWork::new()));
        let err = assert_err!(handler.handle(update_command(Uuid::new_v4(), None)).await);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_stages_removal() {
        let user = stored_user("secret-password");
        let id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_remove()
            .withf(move |u, events| {
                u.id == id && events == &vec![DomainEvent::UserRemoved { user_id: id }]
            })
            .times(1)
            .return_const(());
        let mut uow = MockUnitOfWork::new();
        uow.expect_save_changes().times(1).returning(|| Ok(1));

        let handler = DeleteUserHandler::new(Arc::new(repo), Arc::new(uow));
        assert_ok!(handler.handle(DeleteUserCommand { id }).await);
    }

    #[tokio::test]
    async fn test_login_issues_token_for_owner() {
        let user = stored_user("secret-password");
        let id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .with(eq("jane@example.com"))
            .returning(move |_| Ok(Some(user.clone())));
        let tokens = tokens();

        let handler = LoginUserHandler::new(Arc::new(repo), tokens.clone());
        let token = assert_ok!(
            handler
                .handle(LoginUserCommand {
                    email: "jane@example.com".to_string(),
                    password: "secret-password".to_string(),
                })
                .await
        );
        assert_eq!(tokens.verify(&token).unwrap().sub, id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let user = stored_user("secret-password");
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_email()
            .with(eq("jane@example.com"))
            .returning(move |_| Ok(Some(user.clone())));
        repo.expect_get_by_email()
            .with(eq("ghost@example.com"))
            .returning(|_| Ok(None));

        let handler = LoginUserHandler::new(Arc::new(repo), tokens());
        let wrong_password = assert_err!(
            handler
                .handle(LoginUserCommand {
                    email: "jane@example.com".to_string(),
                    password: "not-the-password".to_string(),
                })
                .await
        );
        let unknown_email = assert_err!(
            handler
                .handle(LoginUserCommand {
                    email: "ghost@example.com".to_string(),
                    password: "secret-password".to_string(),
                })
                .await
        );

        assert!(matches!(wrong_password, AppError::InvalidCredentials(_)));
        assert!(matches!(unknown_email, AppError::InvalidCredentials(_)));
        assert_eq!(wrong_password.status(), unknown_email.status());
        assert_eq!(
            wrong_password.user_message(),
            "User with email jane@example.com was not found."
        );
    }
}
