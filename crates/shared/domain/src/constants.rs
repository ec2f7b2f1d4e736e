//! Domain-level constants.
//!
//! These constants mirror the storage limits and validation rules of both services.

// =============================================================================
// Products
// =============================================================================

/// Maximum product name length
pub const MAX_PRODUCT_NAME_LENGTH: u64 = 255;

/// Maximum product description length
pub const MAX_PRODUCT_DESCRIPTION_LENGTH: u64 = 1023;

// =============================================================================
// Users
// =============================================================================

/// Maximum length of a user's display name and username
pub const MAX_USER_NAME_LENGTH: u64 = 100;

/// Maximum email length
pub const MAX_EMAIL_LENGTH: u64 = 255;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";
