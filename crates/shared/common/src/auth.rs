//! JWT issuing, validation and the authentication middleware.
//!
//! The user service issues tokens on login; both services validate them with
//! the same secret, issuer and audience.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use domain::BEARER_TOKEN_PREFIX;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signs and verifies access tokens.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    config: JwtConfig,
}

impl TokenProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Issue a signed token for `user_id`.
    pub fn issue(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: (now + Duration::hours(self.config.expiration_hours)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret_bytes()),
        )?;
        Ok(token)
    }

    /// Verify signature, expiry, issuer and audience.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.secret_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}

/// Authenticated caller, placed in request extensions by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Authentication middleware that validates bearer tokens.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenProvider>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .ok_or(AppError::Unauthorized)?;

    let claims = tokens.verify(token)?;

    request
        .extensions_mut()
        .insert(CurrentUser { id: claims.sub });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn provider() -> TokenProvider {
        TokenProvider::new(JwtConfig {
            secret: "test-secret-key-for-testing-only-32chars".to_string(),
            ..Default::default()
        })
    }

    fn app(tokens: Arc<TokenProvider>) -> Router {
        Router::new()
            .route("/me", get(|user: CurrentUser| async move { user.id.to_string() }))
            .route_layer(middleware::from_fn_with_state(tokens, auth_middleware))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = provider();
        let id = Uuid::new_v4();
        let claims = tokens
            .verify(&tokens.issue(id, "a@b.c").unwrap())
            .unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.email, "a@b.c");
    }

    #[test]
    fn test_foreign_audience_is_rejected() {
        let issuer = provider();
        let token = issuer.issue(Uuid::new_v4(), "a@b.c").unwrap();
        let other = TokenProvider::new(JwtConfig {
            secret: "test-secret-key-for-testing-only-32chars".to_string(),
            audience: "someone-else".to_string(),
            ..Default::default()
        });
        assert!(matches!(other.verify(&token), Err(AppError::Jwt(_))));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let response = app(Arc::new(provider()))
            .oneshot(HttpRequest::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_exposes_caller_id() {
        let tokens = Arc::new(provider());
        let id = Uuid::new_v4();
        let token = tokens.issue(id, "a@b.c").unwrap();

        let response = app(tokens)
            .oneshot(
                HttpRequest::get("/me")
                    .header(AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, id.to_string());
    }
}
