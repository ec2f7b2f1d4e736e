//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::auth::{auth_middleware, CurrentUser};
use common::{AppResult, UuidPath, ValidatedJson};
use domain::UserResponse;

use crate::application::{
    CreateUserCommand, DeleteUserCommand, GetUserByEmailQuery, GetUserQuery, LoginUserCommand,
    UpdateUserCommand,
};
use crate::state::AppState;

/// User registration request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 characters"))]
    #[schema(example = "jane")]
    pub username: String,
    #[validate(email(message = "Invalid email format"), length(max = 255))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "secure-password")]
    pub password: String,
}

/// Profile update request; an empty or missing password keeps the current one
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    #[schema(example = "Janet Doe")]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 characters"))]
    #[schema(example = "janet")]
    pub username: String,
    #[validate(email(message = "Invalid email format"), length(max = 255))]
    #[schema(example = "janet@example.com")]
    pub email: String,
    #[schema(example = "")]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "secure-password")]
    pub password: String,
}

/// Identity of a newly created user
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Create user routes. Only profile updates need a bearer token.
pub fn user_routes(state: &AppState) -> Router<AppState> {
    let auth = middleware::from_fn_with_state(state.tokens.clone(), auth_middleware);

    Router::new()
        .route("/", post(create_user))
        .route("/login", post(login))
        .route(
            "/me",
            get(get_user_me).merge(put(update_current_user).route_layer(auth)),
        )
        .route("/:key", get(get_user).delete(delete_user))
}

/// Register a user
///
/// Emails are unique: registering an email that already belongs to a user
/// fails with 400 and the message "User with email X already exists.".
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = CreatedResponse),
        (status = 400, description = "Invalid body, or the email is already registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<Json<CreatedResponse>> {
    let id = state
        .mediator()
        .send(CreateUserCommand {
            name: payload.name,
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;
    Ok(Json(CreatedResponse { id }))
}

/// Get user by ID or by email
///
/// A key that parses as a UUID is looked up by id, anything else by email.
#[utoipa::path(
    get,
    path = "/users/{key}",
    tag = "Users",
    params(
        ("key" = String, Path, description = "User ID or email address")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<UserResponse>> {
    find_user(&state, key).await.map(Json)
}

/// `/me` is claimed by the update route, so GET on it is the email lookup
/// every other non-UUID key gets.
async fn get_user_me(State(state): State<AppState>) -> AppResult<Json<UserResponse>> {
    find_user(&state, "me".to_string()).await.map(Json)
}

async fn find_user(state: &AppState, key: String) -> AppResult<UserResponse> {
    let mediator = state.mediator();
    match key.parse::<Uuid>() {
        Ok(id) => mediator.send(GetUserQuery { id }).await,
        Err(_) => mediator.send(GetUserByEmailQuery { email: key }).await,
    }
}

/// Update the caller's own profile
#[utoipa::path(
    put,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = UpdateUserRequest,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<StatusCode> {
    state
        .mediator()
        .send(UpdateUserCommand {
            id: user.id,
            name: payload.name,
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    UuidPath(id): UuidPath,
) -> AppResult<StatusCode> {
    state.mediator().send(DeleteUserCommand { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exchange credentials for an access token
///
/// Unknown email and wrong password both answer 404 with the same message.
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed JWT", body = String),
        (status = 404, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<String>> {
    let token = state
        .mediator()
        .send(LoginUserCommand {
            email: payload.email,
            password: payload.password,
        })
        .await?;
    Ok(Json(token))
}
