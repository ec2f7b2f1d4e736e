//! Shared configuration structures.

use std::env;

use serde::{Deserialize, Serialize};

use domain::{DEFAULT_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH};

use crate::error::{AppError, AppResult};

/// JWT configuration shared by the issuing (user) and validating (product) services.
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_hours: i64,
}

// Don't expose the secret in debug output
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

impl JwtConfig {
    /// Load JWT settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").unwrap_or_default(),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "innoshop-users".to_string()),
            audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "innoshop".to_string()),
            expiration_hours: env_parse("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
        }
    }

    /// Reject secrets shorter than [`MIN_JWT_SECRET_LENGTH`].
    pub fn validate(&self) -> AppResult<()> {
        if self.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::validation(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }
        Ok(())
    }

    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "innoshop-users".to_string(),
            audience: "innoshop".to_string(),
            expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
        }
    }
}

/// Read the first set variable among `keys`, or `default`.
pub fn env_or(keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| env::var(key).ok())
        .unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset or malformed.
pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_is_rejected() {
        let config = JwtConfig {
            secret: "too-short".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = JwtConfig {
            secret: "a-very-long-secret-that-must-not-leak".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("must-not-leak"));
    }

    #[test]
    fn test_env_or_falls_back_to_default() {
        assert_eq!(
            env_or(&["COMMON_TEST_SURELY_UNSET_A", "COMMON_TEST_SURELY_UNSET_B"], "x"),
            "x"
        );
    }
}
