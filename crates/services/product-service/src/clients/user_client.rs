//! HTTP client for the user service.
//!
//! One attempt per call: no retry, no timeout override, no fallback. Any
//! transport failure, non-2xx status or malformed body becomes
//! [`AppError::RemoteAggregation`], which the HTTP layer renders as a plain 500.

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::UserResponse;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read access to users owned by the user service.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse>;
}

/// `GET {base_url}/users/{id}` over reqwest.
#[derive(Debug, Clone)]
pub struct HttpUserClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUserClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn user_url(&self, id: Uuid) -> String {
        format!("{}/users/{}", self.base_url, id)
    }
}

#[async_trait]
impl UserDirectory for HttpUserClient {
    async fn get_user(&self, id: Uuid) -> AppResult<UserResponse> {
        let url = self.user_url(id);
        debug!(%url, "Fetching product owner");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::remote(format!("GET {}: {}", url, e)))?;

        response
            .json::<UserResponse>()
            .await
            .map_err(|e| AppError::remote(format!("GET {}: malformed body: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_template_tolerates_trailing_slash() {
        let id = Uuid::nil();
        let client = HttpUserClient::new("http://users.local:5000/");
        assert_eq!(
            client.user_url(id),
            "http://users.local:5000/users/00000000-0000-0000-0000-000000000000"
        );
    }
}
