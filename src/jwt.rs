//! JWT token issuance and validation.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::secret::SigningSecret;

/// Access token duration: 2 hours
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 2 * 60 * 60;

/// Refresh token duration: 2 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 2 * 24 * 60 * 60;

/// Claims carried by both token kinds. Access and refresh tokens share
/// this shape and differ only in the `refresh` flag and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id
    pub id: i64,
    /// Privilege snapshot at issuance time
    pub admin: bool,
    /// Refresh tokens are never accepted by access-gated endpoints
    pub refresh: bool,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Configuration for JWT operations. Built once from the signing secret
/// and shared read-only across request handlers.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    pub fn new(secret: &SigningSecret) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign an access token for a user. Expires in exactly 2 hours.
    /// The caller is responsible for having authenticated the subject.
    pub fn issue_access_token(&self, id: i64, admin: bool) -> Result<String, JwtError> {
        self.issue(id, admin, false, ACCESS_TOKEN_DURATION_SECS)
    }

    /// Sign a refresh token for a user. Expires in exactly 2 days.
    pub fn issue_refresh_token(&self, id: i64, admin: bool) -> Result<String, JwtError> {
        self.issue(id, admin, true, REFRESH_TOKEN_DURATION_SECS)
    }

    fn issue(
        &self,
        id: i64,
        admin: bool,
        refresh: bool,
        duration: u64,
    ) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = Claims {
            id,
            admin,
            refresh,
            iat: now,
            exp: now + duration,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Verify signature and expiry, returning the decoded claims.
    /// Tampered and expired tokens fail identically.
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::Decoding)?;

        Ok(token_data.claims)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token (bad signature, expired, malformed)
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
